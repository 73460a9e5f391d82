//! Peer health frames and routing requests.

use std::fmt;

use metabolic_types::Epoch;
use serde::{Deserialize, Serialize};

/// Identity of a peer node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A self-reported health snapshot, signed by the reporting node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthFrame {
    pub node_id: NodeId,
    pub epoch: Epoch,
    /// Accumulated strain; lower is healthier.
    pub scar_index: u32,
    /// Fraction of capacity in use. Above 1.0 means overloaded.
    pub load_percent: f64,
    pub headroom_units: u64,
    pub latency_ms: i64,
    /// Coherence score the node advertises for routing.
    pub coherence: f64,
    pub ledger_ref: String,
    #[serde(default)]
    pub signature: String,
}

impl HealthFrame {
    /// The bytes covered by `signature`.
    pub fn signed_payload(&self) -> Vec<u8> {
        format!(
            "{}:{}:{}:{}:{}:{}:{}:{}",
            self.node_id,
            self.epoch,
            self.scar_index,
            self.load_percent,
            self.headroom_units,
            self.latency_ms,
            self.coherence,
            self.ledger_ref
        )
        .into_bytes()
    }
}

/// A witness-attested health snapshot. Authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TruthFrame {
    pub health: HealthFrame,
    #[serde(default)]
    pub witness_multisig: Vec<String>,
    pub witness_epoch: Epoch,
}

/// Anything a peer can gossip into the hologram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeerFrame {
    Health(HealthFrame),
    Truth(TruthFrame),
}

impl PeerFrame {
    pub fn health(&self) -> &HealthFrame {
        match self {
            PeerFrame::Health(frame) => frame,
            PeerFrame::Truth(truth) => &truth.health,
        }
    }
}

impl From<HealthFrame> for PeerFrame {
    fn from(frame: HealthFrame) -> Self {
        PeerFrame::Health(frame)
    }
}

impl From<TruthFrame> for PeerFrame {
    fn from(frame: TruthFrame) -> Self {
        PeerFrame::Truth(frame)
    }
}

/// A request for a next hop able to carry `required_units`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub transaction_id: String,
    pub required_units: u64,
}

impl RouteRequest {
    pub fn new(transaction_id: impl Into<String>, required_units: u64) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            required_units,
        }
    }
}

/// The chosen hop and what it was chosen on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub next_hop: NodeId,
    pub effective_score: f64,
    pub estimated_latency_ms: i64,
}
