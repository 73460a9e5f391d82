//! Hologram entries and per-peer metabolic bookkeeping.

use chrono::{DateTime, Utc};
use metabolic_types::{Epoch, MetabolicParams};
use serde::{Deserialize, Serialize};

use crate::frames::{HealthFrame, NodeId};

// ── Metabolic Book ──────────────────────────────────────────────────────

/// Per-epoch metabolic bookkeeping for one peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetabolicBook {
    /// Last epoch this peer was metered (or first seen).
    pub last_epoch: Epoch,
    /// Strain score observed at `last_epoch`.
    pub last_score: f64,
    /// Authoritative confirmations since `last_epoch`.
    pub confirmations: u32,
    /// Reported violations since `last_epoch`.
    pub violations: u32,
    pub ache_score: f64,
    /// Always within `[m_min, m_max]` of the parameters last metered with.
    pub metabolic_factor: f64,
}

impl MetabolicBook {
    pub fn new(epoch: Epoch, score: f64) -> Self {
        Self {
            last_epoch: epoch,
            last_score: score,
            confirmations: 0,
            violations: 0,
            ache_score: 0.0,
            metabolic_factor: 1.0,
        }
    }

    /// No bookkeeping for the epoch before `epoch`.
    pub fn is_stale(&self, epoch: Epoch) -> bool {
        self.last_epoch.saturating_add(1) < epoch
    }

    /// Fold the counters since the last meter into a new factor. A stale book
    /// is reset to neutral instead. Returns `false` on reset.
    pub fn meter(&mut self, epoch: Epoch, score: f64, params: &MetabolicParams) -> bool {
        let fresh = !self.is_stale(epoch);
        if fresh {
            let delta = score - self.last_score;
            let heal = (-delta).max(0.0) * params.w_heal;
            let truth = f64::from(self.confirmations) * params.w_truth;
            let rot = (delta.max(0.0) + f64::from(self.violations)) * params.w_rot;
            let ache = heal + truth - rot;

            self.ache_score = ache;
            self.metabolic_factor = clamp_factor(1.0 + params.beta * ache, params);
        } else {
            self.ache_score = 0.0;
            self.metabolic_factor = 1.0;
        }

        self.last_score = score;
        self.last_epoch = epoch;
        self.confirmations = 0;
        self.violations = 0;
        fresh
    }
}

/// Clamp into `[m_min, m_max]`. NaN lands on `m_min`.
fn clamp_factor(factor: f64, params: &MetabolicParams) -> f64 {
    factor.max(params.m_min).min(params.m_max.max(params.m_min))
}

// ── Hologram Entry ──────────────────────────────────────────────────────

/// The router's view of one peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HologramEntry {
    pub node_id: NodeId,
    /// Most recent accepted snapshot.
    pub snapshot: HealthFrame,
    /// Local wall-clock receipt of `snapshot`. Informational only.
    pub received_at: DateTime<Utc>,
    pub trust: f64,
    pub book: MetabolicBook,
}

impl HologramEntry {
    /// First sighting at `epoch`; metering starts from the frame's scar index.
    pub fn new(frame: HealthFrame, epoch: Epoch) -> Self {
        let book = MetabolicBook::new(epoch, f64::from(frame.scar_index));
        Self {
            node_id: frame.node_id.clone(),
            snapshot: frame,
            received_at: Utc::now(),
            trust: 1.0,
            book,
        }
    }

    /// Replace the snapshot.
    pub fn accept(&mut self, frame: HealthFrame) {
        self.snapshot = frame;
        self.received_at = Utc::now();
    }

    pub fn effective_score(&self) -> f64 {
        self.snapshot.coherence * self.book.metabolic_factor
    }

    pub fn scar_index(&self) -> u32 {
        self.snapshot.scar_index
    }

    pub fn load_percent(&self) -> f64 {
        self.snapshot.load_percent
    }

    pub fn headroom_units(&self) -> u64 {
        self.snapshot.headroom_units
    }
}
