//! Per-organ safety envelope.

use metabolic_types::{EnvelopeBound, OrganSpec};

/// The first organ parameter outside its declared bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvelopeBreach {
    pub param: String,
    pub value: f64,
    pub bound: EnvelopeBound,
}

/// Check every organ parameter against `min_<key>` then `max_<key>` in its
/// safety envelope. Keys without bounds are unconstrained.
pub fn check_envelope(organ: &OrganSpec) -> Result<(), EnvelopeBreach> {
    for (param, value) in &organ.params {
        let breach = |bound| EnvelopeBreach {
            param: param.clone(),
            value: *value,
            bound,
        };
        if let Some(min) = organ.safety_envelope.get(&format!("min_{param}")) {
            if *value < *min {
                return Err(breach(EnvelopeBound::Min(*min)));
            }
        }
        if let Some(max) = organ.safety_envelope.get(&format!("max_{param}")) {
            if *value > *max {
                return Err(breach(EnvelopeBound::Max(*max)));
            }
        }
    }
    Ok(())
}
