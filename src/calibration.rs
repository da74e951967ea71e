//! Calibration constants for the simplified drag model.
//!
//! The drag factor, velocity floor, step size and flight-time ceiling are not
//! physical constants. They are tuning knobs fitted against reference tables,
//! so they live here as named, validated configuration instead of literals in
//! the integrator.

use crate::error::CalibrationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most integration steps a calibration may ask for (`max_time_s / time_step_s`).
pub const MAX_INTEGRATION_STEPS: u32 = 10_000_000;

/// Tuning constants for the fixed-step drag integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragCalibration {
    /// Empirical scale applied to `density_ratio * v² / bc` (1/m)
    pub drag_factor: f64,
    /// Velocity at or below which the projectile is treated as stopped (m/s)
    pub min_velocity_mps: f64,
    /// Integration step (s)
    pub time_step_s: f64,
    /// Ceiling on simulated flight time (s)
    pub max_time_s: f64,
}

/// Named calibration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPreset {
    /// Strong drag, 90 m/s floor, 2 s ceiling. Tuned for centerfire rifle loads.
    Standard,
    /// Light drag, 30 m/s floor, 4 s ceiling. Keeps slow rounds in flight longer.
    Extended,
}

impl CalibrationPreset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(CalibrationPreset::Standard),
            "extended" => Some(CalibrationPreset::Extended),
            _ => None,
        }
    }

    pub fn calibration(self) -> DragCalibration {
        match self {
            CalibrationPreset::Standard => DragCalibration::standard(),
            CalibrationPreset::Extended => DragCalibration::extended(),
        }
    }
}

impl std::fmt::Display for CalibrationPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationPreset::Standard => write!(f, "standard"),
            CalibrationPreset::Extended => write!(f, "extended"),
        }
    }
}

impl DragCalibration {
    pub const fn standard() -> Self {
        Self {
            drag_factor: 0.00044,
            min_velocity_mps: 90.0,
            time_step_s: 0.001,
            max_time_s: 2.0,
        }
    }

    pub const fn extended() -> Self {
        Self {
            drag_factor: 0.000110,
            min_velocity_mps: 30.0,
            time_step_s: 0.001,
            max_time_s: 4.0,
        }
    }

    /// Same calibration with a different integration step.
    pub fn with_time_step(mut self, time_step_s: f64) -> Self {
        self.time_step_s = time_step_s;
        self
    }

    /// Same calibration with a different flight-time ceiling.
    pub fn with_max_time(mut self, max_time_s: f64) -> Self {
        self.max_time_s = max_time_s;
        self
    }

    /// Check that the constants describe a loop that advances and terminates.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let checks: [(&'static str, f64, bool); 4] = [
            ("drag_factor", self.drag_factor, self.drag_factor >= 0.0),
            ("min_velocity_mps", self.min_velocity_mps, self.min_velocity_mps >= 0.0),
            ("time_step_s", self.time_step_s, self.time_step_s > 0.0),
            ("max_time_s", self.max_time_s, self.max_time_s > self.time_step_s),
        ];

        for (field, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(CalibrationError::Invalid { field, value });
            }
        }

        if self.max_time_s / self.time_step_s > f64::from(MAX_INTEGRATION_STEPS) {
            return Err(CalibrationError::Invalid { field: "time_step_s", value: self.time_step_s });
        }
        Ok(())
    }

    /// Load and validate a calibration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let text = std::fs::read_to_string(path)?;
        let calibration: DragCalibration = serde_json::from_str(&text)?;
        calibration.validate()?;
        Ok(calibration)
    }
}

impl Default for DragCalibration {
    fn default() -> Self {
        Self::standard()
    }
}
