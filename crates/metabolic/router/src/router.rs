//! Holographic router: frame ingestion, per-epoch metering, and next-hop
//! selection.

use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap, HashSet};
use std::sync::Arc;

use metabolic_types::{Epoch, EpochSource, MeshReader, RoutingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::frames::{HealthFrame, NodeId, PeerFrame, RouteDecision, RouteRequest, TruthFrame};
use crate::hologram::HologramEntry;
use crate::oracle::ScoreOracle;
use crate::signature::SignatureVerifier;

// ── Ingestion Results ───────────────────────────────────────────────────

/// Why a frame was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    BadSignature,
    FromFuture,
    Replayed,
    LedgerMismatch,
    /// The sender was penalized.
    NegativeLatency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameDrop {
    pub node_id: NodeId,
    pub reason: DropReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub dropped: Vec<FrameDrop>,
}

impl IngestReport {
    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

/// What a metering tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeteringTick {
    AlreadyProcessed,
    Metered { peers: usize, reset: usize },
}

// ── Router ──────────────────────────────────────────────────────────────

pub struct HolographicRouter {
    node_id: NodeId,
    epochs: Arc<dyn EpochSource>,
    mesh: MeshReader,
    scores: Arc<dyn ScoreOracle>,
    verifier: Arc<dyn SignatureVerifier>,
    hologram: BTreeMap<NodeId, HologramEntry>,
    /// Signatures seen per epoch; only the current epoch is kept.
    seen_signatures: BTreeMap<Epoch, HashSet<String>>,
    last_tick: Option<Epoch>,
}

impl HolographicRouter {
    pub fn new(
        node_id: NodeId,
        epochs: Arc<dyn EpochSource>,
        mesh: MeshReader,
        scores: Arc<dyn ScoreOracle>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            node_id,
            epochs,
            mesh,
            scores,
            verifier,
            hologram: BTreeMap::new(),
            seen_signatures: BTreeMap::new(),
            last_tick: None,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn entry(&self, node: &NodeId) -> Option<&HologramEntry> {
        self.hologram.get(node)
    }

    /// All tracked peers in id order.
    pub fn peers(&self) -> impl Iterator<Item = &HologramEntry> {
        self.hologram.values()
    }

    pub fn peer_count(&self) -> usize {
        self.hologram.len()
    }

    pub fn last_tick(&self) -> Option<Epoch> {
        self.last_tick
    }

    fn routing(&self) -> RoutingConfig {
        self.mesh.read(|m| m.routing.clone())
    }

    /// Apply gossiped frames in order.
    pub fn ingest(&mut self, frames: impl IntoIterator<Item = PeerFrame>) -> IngestReport {
        let routing = self.routing();
        let current = self.epochs.current_epoch();
        let mut report = IngestReport::default();

        for frame in frames {
            let node_id = frame.health().node_id.clone();
            match self.ingest_one(frame, current, &routing) {
                Ok(()) => report.accepted += 1,
                Err(reason) => {
                    debug!(node_id = %node_id, ?reason, "Dropped peer frame");
                    report.dropped.push(FrameDrop { node_id, reason });
                }
            }
        }
        report
    }

    fn ingest_one(
        &mut self,
        frame: PeerFrame,
        current: Epoch,
        routing: &RoutingConfig,
    ) -> Result<(), DropReason> {
        let health = frame.health();

        if !self
            .verifier
            .verify(&health.node_id, &health.signed_payload(), &health.signature)
        {
            return Err(DropReason::BadSignature);
        }
        if health.epoch > current {
            return Err(DropReason::FromFuture);
        }
        if health.epoch == current {
            let seen = self.seen_signatures.entry(current).or_default();
            if !seen.insert(health.signature.clone()) {
                return Err(DropReason::Replayed);
            }
        }
        self.screen(health, routing)?;

        match frame {
            PeerFrame::Health(health) => self.apply_health(health, current, routing),
            PeerFrame::Truth(truth) => self.apply_truth(truth.health, current, routing),
        }
        Ok(())
    }

    /// Ledger reference and latency checks shared by every ingestion path.
    fn screen(&mut self, health: &HealthFrame, routing: &RoutingConfig) -> Result<(), DropReason> {
        if health.ledger_ref != routing.canonical_ref {
            return Err(DropReason::LedgerMismatch);
        }
        if health.latency_ms < 0 {
            if let Some(entry) = self.hologram.get_mut(&health.node_id) {
                entry.trust *= routing.trust_penalty;
                warn!(node_id = %health.node_id, trust = entry.trust, "Negative latency reported; trust penalized");
            }
            return Err(DropReason::NegativeLatency);
        }
        Ok(())
    }

    fn apply_health(&mut self, frame: HealthFrame, current: Epoch, routing: &RoutingConfig) {
        let overloaded = frame.load_percent > 1.0;
        let node_id = frame.node_id.clone();

        let entry = match self.hologram.entry(node_id.clone()) {
            btree_map::Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                if frame.epoch > entry.snapshot.epoch {
                    entry.accept(frame);
                }
                entry
            }
            btree_map::Entry::Vacant(vacant) => {
                info!(node_id = %node_id, epoch = current, "New peer in hologram");
                vacant.insert(HologramEntry::new(frame, current))
            }
        };

        if overloaded {
            entry.trust *= routing.trust_penalty;
            debug!(node_id = %node_id, trust = entry.trust, "Overloaded peer; trust penalized");
        }
    }

    fn apply_truth(&mut self, frame: HealthFrame, current: Epoch, routing: &RoutingConfig) {
        let overloaded = frame.load_percent > 1.0;
        let node_id = frame.node_id.clone();

        let entry = match self.hologram.entry(node_id.clone()) {
            btree_map::Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                if frame.epoch >= entry.snapshot.epoch {
                    entry.accept(frame);
                }
                entry.trust = 1.0;
                entry.book.confirmations += 1;
                entry
            }
            btree_map::Entry::Vacant(vacant) => {
                let mut entry = HologramEntry::new(frame, current);
                entry.book.confirmations = 1;
                vacant.insert(entry)
            }
        };

        if overloaded {
            entry.trust *= routing.trust_penalty;
            debug!(node_id = %node_id, trust = entry.trust, "Overloaded peer confirmed; trust penalized");
        }
    }

    /// Apply a witness-attested frame directly. Skips node-signature and
    /// replay checks; ledger reference, latency and freshness still apply.
    pub fn ingest_truth(&mut self, truth: TruthFrame) -> Result<(), DropReason> {
        let routing = self.routing();
        let current = self.epochs.current_epoch();
        if truth.health.epoch > current {
            return Err(DropReason::FromFuture);
        }
        self.screen(&truth.health, &routing)?;
        self.apply_truth(truth.health, current, &routing);
        Ok(())
    }

    /// Count a violation against a known peer for this epoch's metering.
    pub fn report_violation(&mut self, node: &NodeId, kind: &str, severity: u32) -> bool {
        match self.hologram.get_mut(node) {
            Some(entry) => {
                entry.book.violations += 1;
                warn!(node_id = %node, kind, severity, "Peer violation reported");
                true
            }
            None => false,
        }
    }

    /// Tick at the epoch reported by the epoch source.
    pub fn on_epoch_tick(&mut self) -> MeteringTick {
        let epoch = self.epochs.current_epoch();
        self.tick(epoch)
    }

    /// Meter every peer for `epoch` with the governed values currently in the
    /// mesh. Epochs at or before the last processed one are ignored.
    pub fn tick(&mut self, epoch: Epoch) -> MeteringTick {
        if self.last_tick.is_some_and(|last| epoch <= last) {
            return MeteringTick::AlreadyProcessed;
        }
        self.last_tick = Some(epoch);

        self.seen_signatures.retain(|e, _| *e >= epoch);

        let (params, idle_decay) = self.mesh.read(|m| (m.metabolic, m.routing.idle_trust_decay));
        let mut reset = 0;
        for (node_id, entry) in self.hologram.iter_mut() {
            let score = self.scores.individual_score(node_id);
            if !entry.book.meter(epoch, score, &params) {
                reset += 1;
            }
            if entry.snapshot.epoch.saturating_add(1) < epoch {
                entry.trust *= idle_decay;
            }
        }

        debug!(epoch, peers = self.hologram.len(), reset, "Hologram metered");
        MeteringTick::Metered {
            peers: self.hologram.len(),
            reset,
        }
    }

    /// Highest effective score wins. Within `tie_epsilon` of the best, the
    /// lowest `(scar_index, load_percent, node_id)` wins.
    pub fn select_next_hop(&self, request: &RouteRequest) -> Option<NodeId> {
        self.select(request).map(|entry| entry.node_id.clone())
    }

    pub fn route(&self, request: &RouteRequest) -> Option<RouteDecision> {
        self.select(request).map(|entry| RouteDecision {
            next_hop: entry.node_id.clone(),
            effective_score: entry.effective_score(),
            estimated_latency_ms: entry.snapshot.latency_ms,
        })
    }

    fn select(&self, request: &RouteRequest) -> Option<&HologramEntry> {
        let routing = self.routing();
        let candidates: Vec<(&HologramEntry, f64)> = self
            .hologram
            .values()
            .filter(|e| e.trust > routing.trust_threshold)
            .filter(|e| e.headroom_units() >= request.required_units)
            .map(|e| (e, e.effective_score()))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        let best = candidates
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);

        candidates
            .into_iter()
            .filter(|(_, score)| best - *score < routing.tie_epsilon)
            .map(|(entry, _)| entry)
            .min_by(|a, b| tie_break(a, b))
    }
}

fn tie_break(a: &HologramEntry, b: &HologramEntry) -> Ordering {
    a.scar_index()
        .cmp(&b.scar_index())
        .then_with(|| a.load_percent().total_cmp(&b.load_percent()))
        .then_with(|| a.node_id.cmp(&b.node_id))
}
