/// Physical constants and unit factors used by the drop engine

/// Gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Conversion factor: feet per second to meters per second
pub const FPS_TO_MPS: f64 = 0.3048;

/// Conversion factor: yards to meters
pub const YARDS_TO_METERS: f64 = 0.9144;

/// Length of one inch in meters
pub const METERS_PER_INCH: f64 = 0.0254;

/// Inches in one yard, used to express drop relative to range
pub const INCHES_PER_YARD: f64 = 36.0;

/// Mils per radian-equivalent ratio (drop / range * 1000)
pub const MILS_PER_UNIT_RATIO: f64 = 1000.0;

/// Standard air density at sea level (kg/m³)
pub const STANDARD_AIR_DENSITY: f64 = 1.225;

/// Scale height of the exponential density model (m)
///
/// Density falls by a factor of e every 8434.5 m of elevation. This is the
/// isothermal approximation of the lower troposphere, not the full ICAO
/// layered model, and it is the one the drop calibrations were tuned against.
pub const ATMOSPHERE_SCALE_HEIGHT_M: f64 = 8434.5;

/// Key under which user bullet profiles are persisted
pub const PROFILE_STORE_KEY: &str = "customBulletProfiles";
