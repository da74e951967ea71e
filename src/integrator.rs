//! Fixed-step drag integrator.
//!
//! Horizontal flight is integrated with forward Euler over a single
//! speed/distance pair to find when the projectile reaches the target. The
//! vertical fall is not part of the loop: drop is closed-form free fall over
//! the resulting flight time.

use crate::atmosphere::density_ratio;
use crate::calibration::{DragCalibration, MAX_INTEGRATION_STEPS};
use crate::constants::G_ACCEL_MPS2;
use crate::error::InvalidCoefficientError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Why the integration loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Traveled distance reached the target
    TargetReached,
    /// Velocity fell to the calibration floor (or became NaN)
    VelocityFloor,
    /// Simulated time hit the calibration ceiling
    TimeLimit,
    /// Target at or inside the zero distance, nothing to integrate
    NoTravel,
}

/// Outcome of one horizontal integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTime {
    /// Elapsed simulated time (s)
    pub time_of_flight: f64,
    /// Distance covered when the loop exited (m)
    pub traveled: f64,
    /// Velocity when the loop exited (m/s)
    pub remaining_velocity: f64,
    pub termination: Termination,
}

/// Reject coefficients the drag term cannot divide by.
pub fn check_coefficient(drag_coefficient: f64) -> Result<(), InvalidCoefficientError> {
    if drag_coefficient.is_nan() || drag_coefficient <= 0.0 {
        return Err(InvalidCoefficientError { value: drag_coefficient });
    }
    Ok(())
}

/// Integrate horizontal flight until the target, the velocity floor or the
/// time ceiling is reached.
///
/// The loop never runs more than [`MAX_INTEGRATION_STEPS`] steps, so a
/// calibration that skipped [`DragCalibration::validate`] still returns
/// (as [`Termination::TimeLimit`]).
///
/// # Arguments
/// * `initial_velocity_mps` - Muzzle velocity in m/s
/// * `travel_distance_m` - Distance past the zero point in meters
/// * `drag_coefficient` - Ballistic coefficient, must be positive
/// * `elevation_m` - Elevation above sea level in meters
/// * `calibration` - Drag factor, floor, step and ceiling
pub fn integrate_flight_time(
    initial_velocity_mps: f64,
    travel_distance_m: f64,
    drag_coefficient: f64,
    elevation_m: f64,
    calibration: &DragCalibration,
) -> Result<FlightTime, InvalidCoefficientError> {
    check_coefficient(drag_coefficient)?;

    // NaN distance is treated like a target inside the zero
    if travel_distance_m.is_nan() || travel_distance_m <= 0.0 {
        return Ok(FlightTime {
            time_of_flight: 0.0,
            traveled: 0.0,
            remaining_velocity: initial_velocity_mps,
            termination: Termination::NoTravel,
        });
    }

    let dt = calibration.time_step_s;
    let drag_scale = calibration.drag_factor * density_ratio(elevation_m) / drag_coefficient;

    let mut time = 0.0;
    let mut traveled = 0.0;
    let mut velocity = initial_velocity_mps;
    let mut termination = Termination::TargetReached;
    let mut steps: u32 = 0;

    while traveled < travel_distance_m {
        if time >= calibration.max_time_s || steps >= MAX_INTEGRATION_STEPS {
            termination = Termination::TimeLimit;
            break;
        }

        let deceleration = drag_scale * velocity * velocity;
        velocity -= deceleration * dt;

        if velocity.is_nan() || velocity <= calibration.min_velocity_mps {
            termination = Termination::VelocityFloor;
            break;
        }

        traveled += velocity * dt;
        time += dt;
        steps += 1;
    }

    debug!(
        "flight integration stopped ({:?}) at t={:.3}s, x={:.1}m, v={:.1}m/s",
        termination, time, traveled, velocity
    );

    Ok(FlightTime {
        time_of_flight: time,
        traveled,
        remaining_velocity: velocity,
        termination,
    })
}

/// Free-fall drop over the given flight time (m).
#[inline]
pub fn free_fall_drop(time_of_flight: f64) -> f64 {
    0.5 * G_ACCEL_MPS2 * time_of_flight * time_of_flight
}
