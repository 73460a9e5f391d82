//! Witness frames and identifiers delivered by external callers.
//!
//! `multisig`/`signatures` fields are carried as opaque lists; witness
//! identity is a trusted string.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;
use crate::params::{ParamKey, ParamMap};

// ── Identifiers ─────────────────────────────────────────────────────────

/// Globally unique proposal identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProposalId(pub String);

impl ProposalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProposalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of an attesting witness.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WitnessId(pub String);

impl WitnessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for WitnessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WitnessId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ── Ache ────────────────────────────────────────────────────────────────

/// A witness-attested ache reading for one epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcheFrame {
    pub epoch: Epoch,
    pub ache_index: f64,
    pub witness_id: WitnessId,
    #[serde(default)]
    pub signatures: Vec<String>,
}

impl AcheFrame {
    pub fn new(epoch: Epoch, ache_index: f64, witness_id: impl Into<WitnessId>) -> Self {
        Self {
            epoch,
            ache_index,
            witness_id: witness_id.into(),
            signatures: Vec::new(),
        }
    }

    /// The ache index clamped to `[0, 1]`. NaN reads as no ache.
    pub fn clamped_index(&self) -> f64 {
        if self.ache_index.is_nan() {
            0.0
        } else {
            self.ache_index.clamp(0.0, 1.0)
        }
    }
}

// ── Metabolic Votes ─────────────────────────────────────────────────────

/// A vote on a metabolic proposal. It must echo the proposal's parameters,
/// target epoch and rationale hash exactly to be counted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetabolicVoteFrame {
    pub proposal_id: ProposalId,
    pub params: ParamMap,
    pub target_epoch: Epoch,
    pub rationale_hash: String,
    pub witness_id: WitnessId,
    pub witness_epoch: Epoch,
    #[serde(default)]
    pub multisig: Vec<String>,
}

// ── Organ Emergence ─────────────────────────────────────────────────────

/// A proposed structural extension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganSpec {
    pub organ_id: String,
    pub organ_type: String,
    /// Organ parameters. Keys naming a governed parameter are drift-checked.
    pub params: BTreeMap<String, f64>,
    /// Optional `min_<key>` / `max_<key>` bounds over `params`.
    #[serde(default)]
    pub safety_envelope: BTreeMap<String, f64>,
    /// Provenance: the ache context that motivated the organ.
    #[serde(default)]
    pub ache_origin_context: BTreeMap<String, f64>,
    pub justification_hash: String,
}

impl OrganSpec {
    /// The subset of `params` that names governed metabolic parameters.
    pub fn governed_params(&self) -> ParamMap {
        self.params
            .iter()
            .filter_map(|(name, value)| {
                name.parse::<ParamKey>().ok().map(|key| (key, *value))
            })
            .collect()
    }
}

/// Submission of an organ-emergence proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergenceProposalFrame {
    pub proposal_id: ProposalId,
    pub target_epoch: Epoch,
    pub organ: OrganSpec,
    pub proposer_witness: WitnessId,
    pub witness_epoch: Epoch,
    #[serde(default)]
    pub multisig: Vec<String>,
}

/// A vote on an emergence proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergenceVoteFrame {
    pub proposal_id: ProposalId,
    pub witness_id: WitnessId,
    pub witness_epoch: Epoch,
    #[serde(default)]
    pub multisig: Vec<String>,
}

impl EmergenceVoteFrame {
    pub fn new(
        proposal_id: impl Into<ProposalId>,
        witness_id: impl Into<WitnessId>,
        witness_epoch: Epoch,
    ) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            witness_id: witness_id.into(),
            witness_epoch,
            multisig: Vec::new(),
        }
    }
}
