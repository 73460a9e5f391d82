//! Per-peer strain scoring.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::frames::NodeId;

/// Supplies each peer's individually scored strain once per tick.
/// Lower is healthier; a falling score is healing, a rising one is rot.
pub trait ScoreOracle: Send + Sync {
    fn individual_score(&self, node: &NodeId) -> f64;
}

/// An in-memory score table. Unknown peers score 0.
#[derive(Debug, Default)]
pub struct ScoreTable {
    scores: RwLock<HashMap<NodeId, f64>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, node: NodeId, score: f64) {
        self.scores.write().insert(node, score);
    }

    pub fn get(&self, node: &NodeId) -> Option<f64> {
        self.scores.read().get(node).copied()
    }
}

impl ScoreOracle for ScoreTable {
    fn individual_score(&self, node: &NodeId) -> f64 {
        self.get(node).unwrap_or(0.0)
    }
}
