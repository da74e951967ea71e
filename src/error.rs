//! Error types for the drop engine and the profile repository.

use thiserror::Error;

/// Drag coefficient that cannot drive the integrator (zero, negative or NaN).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid drag coefficient {value}: must be a positive number")]
pub struct InvalidCoefficientError {
    pub value: f64,
}

/// Rejected profile input. Raised before any state or storage is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("profile name must not be empty")]
    EmptyName,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a number, got {value:?}")]
    Unparseable { field: &'static str, value: String },
}

/// Failure talking to the durable profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile store encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure adding a profile to the repository.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Calibration constants that would make the integrator misbehave.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration field {field} has invalid value {value}")]
    Invalid { field: &'static str, value: f64 },

    #[error("failed to read calibration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse calibration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Umbrella error for front ends that drive every part of the crate.
#[derive(Debug, Error)]
pub enum BallisticsError {
    #[error(transparent)]
    InvalidCoefficient(#[from] InvalidCoefficientError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("unknown bullet profile: {0}")]
    UnknownProfile(String),
}
