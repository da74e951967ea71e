//! # Bullet Drop
//!
//! Fixed-step bullet drop estimation with angular (mil) corrections, and a
//! repository of named bullet profiles.
//!
//! ```no_run
//! use bullet_drop::{simulate_drop, SimulationInput};
//!
//! let input = SimulationInput {
//!     muzzle_velocity: 2650.0,
//!     drag_coefficient: 0.505,
//!     target_distance: 800.0,
//!     zero_distance: 100.0,
//!     elevation: 1500.0,
//! };
//! let result = simulate_drop(&input)?;
//! println!("{:.2} m / {:.2} mil", result.drop_linear, result.drop_angular);
//! # Ok::<(), bullet_drop::InvalidCoefficientError>(())
//! ```

// Re-export the main types and functions
pub use calibration::{CalibrationPreset, DragCalibration};
pub use error::{
    BallisticsError, CalibrationError, InvalidCoefficientError, ProfileError, StoreError,
    ValidationError,
};
pub use integrator::Termination;
pub use profiles::{
    builtin_profiles, BulletProfile, CatalogEntry, ProfileCatalog, ProfileRepository,
    ProfileSource, UserProfiles,
};
pub use solver::{
    distance_steps, simulate_drop, DropSolver, DropTableRow, SimulationInput, SimulationResult,
};
pub use store::{FileStore, MemoryStore, ProfileStore};

// Module declarations
pub mod atmosphere;
pub mod calibration;
pub mod constants;
pub mod correction;
mod error;
pub mod integrator;
pub mod profiles;
pub mod solver;
pub mod store;
pub mod units;
