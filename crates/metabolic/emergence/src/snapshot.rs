//! Trigger snapshot, computed once at the start of each tick.

use metabolic_types::{AcheFrame, Epoch};
use serde::{Deserialize, Serialize};

/// Emergence triggers as observed at the start of a tick.
///
/// Activations during the tick do not update the snapshot, so cooldown
/// from an organ activated this epoch only applies from the next tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerSnapshot {
    pub epoch: Epoch,
    pub ache_trend: f64,
    pub uptime_epochs: u64,
    pub cooldown_remaining: u64,
    pub drift_factor: f64,
}

/// Difference between the two most recent frames at or before `epoch`.
/// Zero with fewer than two such frames. `frames` must be epoch-sorted.
pub fn ache_trend(frames: &[AcheFrame], epoch: Epoch) -> f64 {
    let mut recent = frames.iter().rev().filter(|f| f.epoch <= epoch);
    match (recent.next(), recent.next()) {
        (Some(latest), Some(previous)) => latest.ache_index - previous.ache_index,
        _ => 0.0,
    }
}

pub(crate) fn cooldown_remaining(last_emergence: Option<Epoch>, cooldown: u64, epoch: Epoch) -> u64 {
    last_emergence
        .map(|last| last.saturating_add(cooldown).saturating_sub(epoch))
        .unwrap_or(0)
}
