//! Angular correction from linear drop.

use crate::constants::{INCHES_PER_YARD, MILS_PER_UNIT_RATIO};
use crate::units::meters_to_inches;

/// Correction returned when the travel distance gives no angle to correct.
pub const NO_CORRECTION: f64 = 0.0;

/// Convert a linear drop into a sight correction in mils.
///
/// # Arguments
/// * `drop_m` - Vertical drop in meters
/// * `travel_distance_yards` - Distance past the zero point in yards
///
/// # Returns
/// Correction in mils. When the travel distance is zero, negative or not
/// finite the result is [`NO_CORRECTION`]; the engine never reports a drop for
/// such distances, so there is nothing to dial.
pub fn drop_to_mils(drop_m: f64, travel_distance_yards: f64) -> f64 {
    if !travel_distance_yards.is_finite() || travel_distance_yards <= 0.0 {
        return NO_CORRECTION;
    }

    let drop_inches = meters_to_inches(drop_m);
    drop_inches / (travel_distance_yards * INCHES_PER_YARD) * MILS_PER_UNIT_RATIO
}
