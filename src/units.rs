//! Scalar unit conversions.
//!
//! Every conversion is total: negative values and NaN pass through the
//! arithmetic unchanged. Judging physical plausibility is left to callers.

use crate::constants::{FPS_TO_MPS, METERS_PER_INCH, YARDS_TO_METERS};

/// Feet per second to meters per second.
#[inline]
pub fn fps_to_mps(fps: f64) -> f64 {
    fps * FPS_TO_MPS
}

/// Meters per second to feet per second.
#[inline]
pub fn mps_to_fps(mps: f64) -> f64 {
    mps / FPS_TO_MPS
}

/// Yards to meters.
#[inline]
pub fn yards_to_meters(yards: f64) -> f64 {
    yards * YARDS_TO_METERS
}

/// Meters to yards.
#[inline]
pub fn meters_to_yards(meters: f64) -> f64 {
    meters / YARDS_TO_METERS
}

/// Meters to inches.
#[inline]
pub fn meters_to_inches(meters: f64) -> f64 {
    meters / METERS_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_velocity_conversion() {
        assert_relative_eq!(fps_to_mps(1000.0), 304.8, epsilon = 1e-9);
        assert_relative_eq!(fps_to_mps(2650.0), 807.72, epsilon = 1e-9);
        assert_relative_eq!(mps_to_fps(fps_to_mps(2800.0)), 2800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_conversion() {
        assert_relative_eq!(yards_to_meters(100.0), 91.44, epsilon = 1e-9);
        assert_relative_eq!(yards_to_meters(1000.0), 914.4, epsilon = 1e-9);
        assert_relative_eq!(meters_to_yards(914.4), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inch_conversion() {
        assert_relative_eq!(meters_to_inches(0.0254), 1.0, epsilon = 1e-12);
        assert_relative_eq!(meters_to_inches(1.0), 39.37007874015748, epsilon = 1e-9);
    }

    #[test]
    fn test_conversions_are_total() {
        // Negative values map through arithmetically
        assert_relative_eq!(yards_to_meters(-100.0), -91.44, epsilon = 1e-9);
        assert_relative_eq!(fps_to_mps(-10.0), -3.048, epsilon = 1e-9);

        // NaN stays NaN rather than panicking
        assert!(fps_to_mps(f64::NAN).is_nan());
        assert!(yards_to_meters(f64::NAN).is_nan());
        assert!(meters_to_inches(f64::NAN).is_nan());
    }
}
