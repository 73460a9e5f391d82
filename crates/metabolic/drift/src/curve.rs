//! The ache → drift factor curve.

use metabolic_types::DriftConfig;

/// Absolute slack when comparing a delta against its allowed window.
pub const DRIFT_TOLERANCE: f64 = 1e-9;

/// Map an ache index onto a drift factor in `[0, 1]`.
///
/// Boundary-inclusive: `ache == floor` yields 0 and `ache == ceiling`
/// yields 1.
pub fn drift_curve(ache: f64, config: &DriftConfig) -> f64 {
    if ache.is_nan() || ache <= config.ache_floor {
        return 0.0;
    }
    let normalized = if ache >= config.ache_ceiling {
        1.0
    } else {
        (ache - config.ache_floor) / (config.ache_ceiling - config.ache_floor)
    };
    normalized.powf(config.kappa).clamp(0.0, 1.0)
}
