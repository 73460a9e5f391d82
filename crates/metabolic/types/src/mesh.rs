//! The parameter mesh: governed values plus every control-plane constant.
//!
//! Ownership is split by capability: exactly one [`MeshWriter`] exists per
//! mesh and it is handed to the metabolic governor. Everyone else holds a
//! cloneable [`MeshReader`]. Writes swap the whole governed block under one
//! lock, so a reader never observes a partially applied activation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::params::{MetabolicParams, ParamKey};

// ── Configuration Sections ──────────────────────────────────────────────

/// Static safety bounds and quorum for metabolic governance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceLimits {
    /// Distinct voters required before a proposal may activate.
    pub quorum: usize,
    /// `beta` must lie in `(0, beta_max]`.
    pub beta_max: f64,
    /// Each weight must lie in `[0, weight_max]`.
    pub weight_max: f64,
    /// `m_max` must lie in `[m_min, m_factor_max]`.
    pub m_factor_max: f64,
}

impl Default for GovernanceLimits {
    fn default() -> Self {
        Self {
            quorum: 3,
            beta_max: 1.0,
            weight_max: 10.0,
            m_factor_max: 3.0,
        }
    }
}

/// Per-epoch absolute drift caps, one per governed key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftCaps {
    pub w_heal: f64,
    pub w_truth: f64,
    pub w_rot: f64,
    pub beta: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl Default for DriftCaps {
    fn default() -> Self {
        Self {
            w_heal: 0.10,
            w_truth: 0.10,
            w_rot: 0.10,
            beta: 0.02,
            m_min: 0.10,
            m_max: 0.10,
        }
    }
}

impl DriftCaps {
    pub fn cap(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::WHeal => self.w_heal,
            ParamKey::WTruth => self.w_truth,
            ParamKey::WRot => self.w_rot,
            ParamKey::Beta => self.beta,
            ParamKey::MMin => self.m_min,
            ParamKey::MMax => self.m_max,
        }
    }

    /// The same cap for every key.
    pub fn uniform(cap: f64) -> Self {
        Self {
            w_heal: cap,
            w_truth: cap,
            w_rot: cap,
            beta: cap,
            m_min: cap,
            m_max: cap,
        }
    }
}

/// Ache-scaled drift envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub caps: DriftCaps,
    /// At or below this ache, drift is frozen.
    pub ache_floor: f64,
    /// At or above this ache, the full cap is available.
    pub ache_ceiling: f64,
    /// Curve exponent applied to normalized ache.
    pub kappa: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            caps: DriftCaps::default(),
            ache_floor: 0.10,
            ache_ceiling: 1.00,
            kappa: 1.50,
        }
    }
}

/// Organ emergence triggers and limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergenceConfig {
    pub quorum: usize,
    pub min_uptime_epochs: u64,
    pub ache_trend_threshold: f64,
    pub cooldown_epochs: u64,
    pub max_organs_per_epoch: usize,
}

impl Default for EmergenceConfig {
    fn default() -> Self {
        Self {
            quorum: 3,
            min_uptime_epochs: 2,
            ache_trend_threshold: 0.05,
            cooldown_epochs: 2,
            max_organs_per_epoch: 1,
        }
    }
}

/// Hologram trust and next-hop selection constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Peers at or below this trust are never selected.
    pub trust_threshold: f64,
    /// Effective scores closer than this are a tie.
    pub tie_epsilon: f64,
    /// Trust multiplier for malformed or overloaded frames.
    pub trust_penalty: f64,
    /// Trust multiplier per tick for peers with no recent snapshot.
    pub idle_trust_decay: f64,
    /// Canonical ledger reference every frame must carry.
    pub canonical_ref: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            trust_threshold: 0.2,
            tie_epsilon: 1e-6,
            trust_penalty: 0.8,
            idle_trust_decay: 0.98,
            canonical_ref: "0xGLS1REF_TEST_HARNESS".to_string(),
        }
    }
}

// ── Parameter Mesh ──────────────────────────────────────────────────────

/// Current governed values plus all control-plane constants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterMesh {
    pub metabolic: MetabolicParams,
    pub governance: GovernanceLimits,
    pub drift: DriftConfig,
    pub emergence: EmergenceConfig,
    pub routing: RoutingConfig,
}

impl ParameterMesh {
    /// Reject incoherent constants.
    pub fn validate(&self) -> Result<(), MeshError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), MeshError> {
            Err(MeshError::Invalid {
                field,
                reason: reason.into(),
            })
        }

        if self.governance.quorum == 0 {
            return invalid("governance.quorum", "must be at least 1");
        }
        if self.emergence.quorum == 0 {
            return invalid("emergence.quorum", "must be at least 1");
        }
        if self.drift.ache_ceiling <= self.drift.ache_floor {
            return invalid(
                "drift.ache_ceiling",
                format!(
                    "{} must exceed ache_floor {}",
                    self.drift.ache_ceiling, self.drift.ache_floor
                ),
            );
        }
        if self.drift.kappa <= 0.0 {
            return invalid("drift.kappa", "must be positive");
        }
        for key in ParamKey::ALL {
            if self.drift.caps.cap(key) < 0.0 {
                return invalid("drift.caps", format!("cap for {key} is negative"));
            }
        }
        if self.metabolic.m_min > self.metabolic.m_max {
            return invalid(
                "metabolic.m_min",
                format!(
                    "{} exceeds m_max {}",
                    self.metabolic.m_min, self.metabolic.m_max
                ),
            );
        }
        if !(0.0..=1.0).contains(&self.routing.trust_penalty) {
            return invalid("routing.trust_penalty", "must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.routing.idle_trust_decay) {
            return invalid("routing.idle_trust_decay", "must lie in [0, 1]");
        }
        Ok(())
    }

    /// Wrap this mesh for sharing: the single writer and a first reader.
    pub fn into_shared(self) -> (MeshWriter, MeshReader) {
        let writer = MeshWriter::new(self);
        let reader = writer.reader();
        (writer, reader)
    }
}

// ── Shared Handles ──────────────────────────────────────────────────────

/// The only handle that can change governed values. Not `Clone`.
#[derive(Debug)]
pub struct MeshWriter {
    inner: Arc<RwLock<ParameterMesh>>,
}

impl MeshWriter {
    pub fn new(mesh: ParameterMesh) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mesh)),
        }
    }

    pub fn reader(&self) -> MeshReader {
        MeshReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Replace every governed value in one step.
    pub fn apply(&self, params: MetabolicParams) {
        self.inner.write().metabolic = params;
    }

    pub fn read<R>(&self, f: impl FnOnce(&ParameterMesh) -> R) -> R {
        f(&self.inner.read())
    }
}

/// Read-only view of a shared mesh.
#[derive(Clone, Debug)]
pub struct MeshReader {
    inner: Arc<RwLock<ParameterMesh>>,
}

impl MeshReader {
    /// A reader over a mesh nobody can write. Handy for standalone components.
    pub fn fixed(mesh: ParameterMesh) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mesh)),
        }
    }

    pub fn snapshot(&self) -> ParameterMesh {
        self.inner.read().clone()
    }

    pub fn metabolic(&self) -> MetabolicParams {
        self.inner.read().metabolic
    }

    pub fn read<R>(&self, f: impl FnOnce(&ParameterMesh) -> R) -> R {
        f(&self.inner.read())
    }
}
