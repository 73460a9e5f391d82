//! Static safety bounds, independent of drift.
//!
//! Checked in a fixed order and stopping at the first failure:
//! `beta`, `w_heal`, `w_truth`, `w_rot`, `m_min`, `m_max`.

use metabolic_types::{GovernanceLimits, MetabolicParams, ParamKey, ParamMap, SafetyViolation};

/// Order in which keys are checked.
const CHECK_ORDER: [ParamKey; 6] = [
    ParamKey::Beta,
    ParamKey::WHeal,
    ParamKey::WTruth,
    ParamKey::WRot,
    ParamKey::MMin,
    ParamKey::MMax,
];

/// Validate a proposed assignment. On success returns the complete
/// parameter set to apply.
pub fn check_safety(
    params: &ParamMap,
    limits: &GovernanceLimits,
) -> Result<MetabolicParams, SafetyViolation> {
    let mut checked = MetabolicParams::default();

    for key in CHECK_ORDER {
        let value = params.get(&key).copied().ok_or_else(|| SafetyViolation {
            key,
            value: None,
            reason: format!("{key} missing"),
        })?;

        let within = match key {
            ParamKey::Beta => value > 0.0 && value <= limits.beta_max,
            ParamKey::WHeal | ParamKey::WTruth | ParamKey::WRot => {
                (0.0..=limits.weight_max).contains(&value)
            }
            ParamKey::MMin => value > 0.0 && value <= 1.0,
            ParamKey::MMax => value >= checked.m_min && value <= limits.m_factor_max,
        };

        if !within {
            let bounds = match key {
                ParamKey::Beta => format!("0 < {key} <= {}", limits.beta_max),
                ParamKey::WHeal | ParamKey::WTruth | ParamKey::WRot => {
                    format!("0 <= {key} <= {}", limits.weight_max)
                }
                ParamKey::MMin => format!("0 < {key} <= 1"),
                ParamKey::MMax => {
                    format!("m_min ({}) <= {key} <= {}", checked.m_min, limits.m_factor_max)
                }
            };
            return Err(SafetyViolation {
                key,
                value: Some(value),
                reason: format!("{value} out of bounds ({bounds})"),
            });
        }

        checked.set(key, value);
    }

    Ok(checked)
}
