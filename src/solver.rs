//! Drop solver: the engine entry point.
//!
//! Converts user units to SI, runs the drag integrator from the zero distance
//! to the target, and derives the linear and angular drop.

use crate::calibration::DragCalibration;
use crate::correction::drop_to_mils;
use crate::error::{CalibrationError, InvalidCoefficientError};
use crate::integrator::{free_fall_drop, integrate_flight_time, Termination};
use crate::profiles::BulletProfile;
use crate::units::{fps_to_mps, meters_to_inches, yards_to_meters};
use log::debug;
use serde::{Deserialize, Serialize};

// Simulation input parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub muzzle_velocity: f64,   // ft/s
    pub drag_coefficient: f64,  // ballistic coefficient (G1)
    pub target_distance: f64,   // yards from the muzzle
    pub zero_distance: f64,     // yards
    pub elevation: f64,         // meters above sea level
}

impl SimulationInput {
    /// Build an input from a bullet profile and the shot conditions.
    pub fn from_profile(
        profile: &BulletProfile,
        target_distance: f64,
        zero_distance: f64,
        elevation: f64,
    ) -> Self {
        Self {
            muzzle_velocity: profile.muzzle_velocity,
            drag_coefficient: profile.drag_coefficient,
            target_distance,
            zero_distance,
            elevation,
        }
    }

    /// Distance past the zero point, in yards. Negative when the target is
    /// inside the zero.
    pub fn travel_distance_yards(&self) -> f64 {
        self.target_distance - self.zero_distance
    }

    /// Same shot at a different target distance.
    pub fn at_distance(&self, target_distance: f64) -> Self {
        Self { target_distance, ..*self }
    }
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self {
            muzzle_velocity: 2700.0,
            drag_coefficient: 0.5,
            target_distance: 800.0,
            zero_distance: 100.0,
            elevation: 1500.0,
        }
    }
}

// Simulation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time_of_flight: f64,      // seconds
    pub drop_linear: f64,         // meters
    pub drop_inches: f64,         // inches
    pub drop_angular: f64,        // mils
    pub remaining_velocity: f64,  // m/s when the integrator stopped
    pub termination: Termination,
}

/// One row of a drop table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropTableRow {
    pub target_distance: f64,  // yards
    #[serde(flatten)]
    pub result: SimulationResult,
}

/// Drop solver. Only ever holds a calibration that passed
/// [`DragCalibration::validate`].
#[derive(Debug, Clone, Default)]
pub struct DropSolver {
    calibration: DragCalibration,
}

impl DropSolver {
    pub fn new(calibration: DragCalibration) -> Result<Self, CalibrationError> {
        calibration.validate()?;
        Ok(Self { calibration })
    }

    pub fn calibration(&self) -> &DragCalibration {
        &self.calibration
    }

    /// Replace the calibration. On error the current one is kept.
    pub fn set_calibration(&mut self, calibration: DragCalibration) -> Result<(), CalibrationError> {
        calibration.validate()?;
        self.calibration = calibration;
        Ok(())
    }

    pub fn set_time_step(&mut self, time_step_s: f64) -> Result<(), CalibrationError> {
        self.set_calibration(self.calibration.with_time_step(time_step_s))
    }

    pub fn set_max_time(&mut self, max_time_s: f64) -> Result<(), CalibrationError> {
        self.set_calibration(self.calibration.with_max_time(max_time_s))
    }

    /// Estimate drop at the target for one shot.
    pub fn simulate_drop(&self, input: &SimulationInput) -> Result<SimulationResult, InvalidCoefficientError> {
        let travel_yards = input.travel_distance_yards();

        let flight = integrate_flight_time(
            fps_to_mps(input.muzzle_velocity),
            yards_to_meters(travel_yards),
            input.drag_coefficient,
            input.elevation,
            &self.calibration,
        )?;

        let drop_linear = free_fall_drop(flight.time_of_flight);
        let drop_angular = drop_to_mils(drop_linear, travel_yards);

        debug!(
            "{:.0} yd (zero {:.0} yd): t={:.3}s drop={:.2}m {:.2}mil",
            input.target_distance, input.zero_distance, flight.time_of_flight, drop_linear, drop_angular
        );

        Ok(SimulationResult {
            time_of_flight: flight.time_of_flight,
            drop_linear,
            drop_inches: meters_to_inches(drop_linear),
            drop_angular,
            remaining_velocity: flight.remaining_velocity,
            termination: flight.termination,
        })
    }

    /// Drop for the same shot at each of the given target distances.
    pub fn drop_table(
        &self,
        input: &SimulationInput,
        distances: &[f64],
    ) -> Result<Vec<DropTableRow>, InvalidCoefficientError> {
        distances
            .iter()
            .map(|&target_distance| {
                let result = self.simulate_drop(&input.at_distance(target_distance))?;
                Ok(DropTableRow { target_distance, result })
            })
            .collect()
    }
}

/// Estimate drop with the standard calibration.
pub fn simulate_drop(input: &SimulationInput) -> Result<SimulationResult, InvalidCoefficientError> {
    DropSolver::default().simulate_drop(input)
}

/// Most rows [`distance_steps`] will produce.
pub const MAX_TABLE_ROWS: usize = 10_000;

// Slack for steps like 0.1 that are not exact in binary
const STEP_TOLERANCE: f64 = 1e-9;

/// Target distances from `start` to `end` inclusive, every `step` yards.
///
/// Empty when the range is reversed or not finite, when the step is not
/// positive, or when the range would need more than [`MAX_TABLE_ROWS`] rows.
pub fn distance_steps(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || !start.is_finite() || !end.is_finite() || end < start {
        return Vec::new();
    }

    let intervals = ((end - start) / step + STEP_TOLERANCE).floor();
    if !intervals.is_finite() || intervals >= MAX_TABLE_ROWS as f64 {
        return Vec::new();
    }

    let count = intervals as usize;
    (0..=count).map(|i| (start + i as f64 * step).min(end)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario() -> SimulationInput {
        SimulationInput {
            muzzle_velocity: 2650.0,
            drag_coefficient: 0.505,
            target_distance: 800.0,
            zero_distance: 100.0,
            elevation: 1500.0,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let result = simulate_drop(&scenario()).unwrap();

        assert_eq!(result.termination, Termination::TargetReached);
        assert!(result.drop_linear > 1.0 && result.drop_linear < 10.0,
                "drop {}", result.drop_linear);
        assert!(result.drop_angular > 1.0 && result.drop_angular < 20.0,
                "mils {}", result.drop_angular);

        // Angular and linear drop agree through the converter formula
        let expected_mils = result.drop_linear / 0.0254 / (700.0 * 36.0) * 1000.0;
        assert_relative_eq!(result.drop_angular, expected_mils, epsilon = 1e-9);
        assert_relative_eq!(result.drop_inches, result.drop_linear / 0.0254, epsilon = 1e-9);
    }

    #[test]
    fn test_target_at_zero() {
        let input = SimulationInput { target_distance: 100.0, ..scenario() };
        let result = simulate_drop(&input).unwrap();
        assert_eq!(result.time_of_flight, 0.0);
        assert_eq!(result.drop_linear, 0.0);
        assert_eq!(result.drop_angular, 0.0);
        assert_eq!(result.termination, Termination::NoTravel);
    }

    #[test]
    fn test_target_inside_zero() {
        let input = SimulationInput { target_distance: 50.0, ..scenario() };
        let result = simulate_drop(&input).unwrap();
        assert_eq!(result.time_of_flight, 0.0);
        assert_eq!(result.drop_linear, 0.0);
        assert_eq!(result.drop_angular, 0.0);
    }

    #[test]
    fn test_invalid_coefficient() {
        for bc in [0.0, -0.1, f64::NAN] {
            let input = SimulationInput { drag_coefficient: bc, ..scenario() };
            assert!(simulate_drop(&input).is_err());
        }
    }

    #[test]
    fn test_solver_uses_calibration() {
        let standard = DropSolver::default().simulate_drop(&scenario()).unwrap();
        let extended = DropSolver::new(DragCalibration::extended())
            .unwrap()
            .simulate_drop(&scenario())
            .unwrap();

        // Lighter drag factor means a faster flight and less drop
        assert!(extended.time_of_flight < standard.time_of_flight);
        assert!(extended.drop_linear < standard.drop_linear);
    }

    #[test]
    fn test_solver_setters() {
        let mut solver = DropSolver::default();
        solver.set_time_step(0.0005).unwrap();
        solver.set_max_time(0.25).unwrap();
        assert_eq!(solver.calibration().time_step_s, 0.0005);

        let result = solver.simulate_drop(&scenario()).unwrap();
        assert_eq!(result.termination, Termination::TimeLimit);
        assert!(result.time_of_flight < 0.26);

        solver.set_calibration(DragCalibration::standard()).unwrap();
        assert_eq!(solver.calibration(), &DragCalibration::standard());
    }

    #[test]
    fn test_solver_rejects_degenerate_step() {
        for dt in [0.0, -0.001, f64::NAN, 1e-300] {
            let calibration = DragCalibration::standard().with_time_step(dt);
            assert!(
                matches!(DropSolver::new(calibration), Err(CalibrationError::Invalid { field: "time_step_s", .. })),
                "dt {dt}"
            );

            let mut solver = DropSolver::default();
            assert!(solver.set_time_step(dt).is_err(), "dt {dt}");
            assert_eq!(solver.calibration(), &DragCalibration::standard());
        }
    }

    #[test]
    fn test_solver_rejects_bad_ceiling() {
        let mut solver = DropSolver::default();
        assert!(solver.set_max_time(0.0).is_err());
        assert!(solver.set_max_time(f64::INFINITY).is_err());
        assert_eq!(solver.calibration().max_time_s, 2.0);

        // Still usable after the rejected updates
        let result = solver.simulate_drop(&scenario()).unwrap();
        assert_eq!(result.termination, Termination::TargetReached);
    }

    #[test]
    fn test_drop_table_is_monotonic() {
        let solver = DropSolver::default();
        let distances = distance_steps(100.0, 1000.0, 100.0);
        let table = solver.drop_table(&scenario(), &distances).unwrap();

        assert_eq!(table.len(), 10);
        assert_eq!(table[0].target_distance, 100.0);
        assert_eq!(table[0].result.drop_linear, 0.0);

        for pair in table.windows(2) {
            assert!(pair[1].result.drop_linear >= pair[0].result.drop_linear);
        }
    }

    #[test]
    fn test_drop_table_rejects_bad_coefficient() {
        let input = SimulationInput { drag_coefficient: 0.0, ..scenario() };
        let result = DropSolver::default().drop_table(&input, &[200.0, 300.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_distance_steps() {
        assert_eq!(distance_steps(100.0, 300.0, 100.0), vec![100.0, 200.0, 300.0]);
        assert_eq!(distance_steps(100.0, 350.0, 100.0), vec![100.0, 200.0, 300.0]);
        assert!(distance_steps(300.0, 100.0, 100.0).is_empty());
        assert!(distance_steps(100.0, 300.0, 0.0).is_empty());
        assert!(distance_steps(100.0, 300.0, f64::NAN).is_empty());
    }

    #[test]
    fn test_distance_steps_keeps_inexact_end() {
        let steps = distance_steps(0.1, 0.3, 0.1);
        assert_eq!(steps.len(), 3);
        assert_relative_eq!(steps[1], 0.2, epsilon = 1e-12);
        assert_eq!(steps[2], 0.3);

        let steps = distance_steps(0.0, 1.0, 0.1);
        assert_eq!(steps.len(), 11);
        assert_eq!(*steps.last().unwrap(), 1.0);
    }

    #[test]
    fn test_distance_steps_row_cap() {
        assert!(distance_steps(100.0, 1000.0, 1e-300).is_empty());
        assert!(distance_steps(0.0, MAX_TABLE_ROWS as f64, 1.0).is_empty());
        assert_eq!(distance_steps(0.0, (MAX_TABLE_ROWS - 1) as f64, 1.0).len(), MAX_TABLE_ROWS);
    }

    #[test]
    fn test_from_profile() {
        let profile = BulletProfile::new("6.5CM - 140gr ELD-M", 2700.0, 0.610);
        let input = SimulationInput::from_profile(&profile, 600.0, 100.0, 0.0);
        assert_eq!(input.muzzle_velocity, 2700.0);
        assert_eq!(input.drag_coefficient, 0.610);
        assert_eq!(input.travel_distance_yards(), 500.0);
    }

    #[test]
    fn test_result_serializes() {
        let result = simulate_drop(&scenario()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"drop_angular\""));
        assert!(json.contains("\"termination\":\"target_reached\""));
    }
}
