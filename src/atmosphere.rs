//! Exponential air density model.
//!
//! Density decays from the sea-level standard with a single scale height. The
//! integrator only needs the ratio to sea level, which scales the drag term.

use crate::constants::{ATMOSPHERE_SCALE_HEIGHT_M, STANDARD_AIR_DENSITY};

/// Air density at the given elevation.
///
/// # Arguments
/// * `elevation_m` - Elevation above sea level in meters
///
/// # Returns
/// Air density in kg/m³. Exactly 1.225 at sea level, approaching zero as
/// elevation grows and rising above 1.225 below sea level.
pub fn air_density(elevation_m: f64) -> f64 {
    STANDARD_AIR_DENSITY * (-elevation_m / ATMOSPHERE_SCALE_HEIGHT_M).exp()
}

/// Ratio of local air density to sea-level standard density.
#[inline]
pub fn density_ratio(elevation_m: f64) -> f64 {
    air_density(elevation_m) / STANDARD_AIR_DENSITY
}
