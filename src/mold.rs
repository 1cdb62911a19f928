//! Temperature-dependent mold risk threshold.
//!
//! The curve is a common approximation of the relative humidity above which
//! mold growth becomes possible. It is only meant for ranking days against
//! each other, not as a growth model.

/// Temperature range the polynomial was fitted for.
const CURVE_MIN_C: f64 = 0.0;
const CURVE_MAX_C: f64 = 30.0;

/// Critical relative humidity (%) at the given temperature.
///
/// The temperature is clamped to the curve's validity range first, and the
/// result is clamped to 0..=100.
pub fn critical_humidity(temp_c: f64) -> f64 {
    let x = temp_c.clamp(CURVE_MIN_C, CURVE_MAX_C);
    let y = 5.0e-5 * x.powi(4) - 0.0045 * x.powi(3) + 0.1652 * x.powi(2) - 2.9381 * x + 97.0;
    y.clamp(0.0, 100.0)
}

/// Whether a sample sits in the risk zone.
pub fn is_mold_risk(temp_c: f64, humidity_pct: u8) -> bool {
    f64::from(humidity_pct) >= critical_humidity(temp_c)
}
