//! The control plane façade: one epoch clock, one mesh, four components.

use std::sync::Arc;

use holographic_router::{
    DropReason, HolographicRouter, IngestReport, MeteringTick, NodeId, PeerFrame, RouteDecision,
    RouteRequest, ScoreOracle, SignatureVerifier, TruthFrame,
};
use metabolic_drift::{DriftGate, DriftGovernor};
use metabolic_emergence::{EmergenceEngine, EmergenceTick};
use metabolic_governance::{GovernanceTick, MetabolicGovernor};
use metabolic_types::{
    AcheFrame, AuditRecord, AuditSink, EmergenceProposalFrame, EmergenceVoteFrame, Epoch,
    EpochClock, EpochSource, MemoryAuditSink, MeshReader, MetabolicParams, MetabolicVoteFrame,
    ParamMap, ProposalId, VoteOutcome, WitnessId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PlaneConfig;
use crate::error::PlaneResult;

/// Everything one epoch tick did, in fan-out order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneTick {
    pub epoch: Epoch,
    pub governance: GovernanceTick,
    pub emergence: EmergenceTick,
    pub metering: MeteringTick,
}

/// Point-in-time summary for operators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneStatus {
    pub node_id: NodeId,
    pub epoch: Epoch,
    pub params: MetabolicParams,
    pub pending_metabolic: usize,
    pub activated_organs: Vec<String>,
    pub peers: usize,
    pub audit_records: usize,
}

/// Single-writer owner of the governor, the emergence engine (with its
/// drift governor) and the router.
pub struct ControlPlane {
    clock: Arc<EpochClock>,
    mesh: MeshReader,
    governor: MetabolicGovernor,
    emergence: EmergenceEngine<DriftGovernor>,
    router: HolographicRouter,
    audit: Arc<MemoryAuditSink>,
}

impl ControlPlane {
    pub fn new(
        config: &PlaneConfig,
        scores: Arc<dyn ScoreOracle>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        let clock = Arc::new(EpochClock::new(config.start_epoch));
        let epochs: Arc<dyn EpochSource> = clock.clone();
        let audit = Arc::new(MemoryAuditSink::new());
        let sink: Arc<dyn AuditSink> = audit.clone();

        let (writer, mesh) = config.mesh.clone().into_shared();
        let governor =
            MetabolicGovernor::new(Arc::clone(&epochs), writer).with_audit_sink(Arc::clone(&sink));
        let drift = DriftGovernor::new(Arc::clone(&epochs), mesh.clone())
            .with_audit_sink(Arc::clone(&sink));
        let emergence = EmergenceEngine::new(Arc::clone(&epochs), mesh.clone(), drift)
            .with_audit_sink(sink);
        let router = HolographicRouter::new(
            NodeId::new(config.node_id.clone()),
            epochs,
            mesh.clone(),
            scores,
            verifier,
        );

        info!(node_id = %config.node_id, epoch = config.start_epoch, "Control plane ready");
        Self {
            clock,
            mesh,
            governor,
            emergence,
            router,
            audit,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.clock.current_epoch()
    }

    pub fn mesh(&self) -> &MeshReader {
        &self.mesh
    }

    pub fn params(&self) -> MetabolicParams {
        self.mesh.metabolic()
    }

    pub fn governor(&self) -> &MetabolicGovernor {
        &self.governor
    }

    pub fn emergence(&self) -> &EmergenceEngine<DriftGovernor> {
        &self.emergence
    }

    pub fn router(&self) -> &HolographicRouter {
        &self.router
    }

    // ── Governance ──────────────────────────────────────────────────────

    pub fn submit_metabolic(
        &mut self,
        id: ProposalId,
        target_epoch: Epoch,
        params: ParamMap,
        proposer: WitnessId,
        rationale_hash: impl Into<String>,
    ) -> PlaneResult<()> {
        self.governor
            .submit(id, target_epoch, params, proposer, rationale_hash)?;
        Ok(())
    }

    pub fn vote_metabolic(&mut self, frame: &MetabolicVoteFrame) -> VoteOutcome {
        self.governor.vote(frame)
    }

    /// Drop pending metabolic proposals that can no longer activate.
    pub fn prune_stale(&mut self, horizon: Epoch) -> Vec<ProposalId> {
        self.governor.prune_stale(horizon)
    }

    pub fn submit_emergence(&mut self, frame: EmergenceProposalFrame) -> PlaneResult<()> {
        self.emergence.submit(frame)?;
        Ok(())
    }

    pub fn vote_emergence(&mut self, frame: &EmergenceVoteFrame) -> VoteOutcome {
        self.emergence.vote(frame)
    }

    /// Feed an ache attestation to both the emergence engine and its drift
    /// governor. True if either kept it.
    pub fn ingest_ache(&mut self, frame: &AcheFrame) -> bool {
        let recorded = self.emergence.record_ache(frame);
        let gated = self.emergence.drift_mut().ingest_ache(frame);
        recorded || gated
    }

    // ── Routing ─────────────────────────────────────────────────────────

    pub fn ingest_frames(&mut self, frames: impl IntoIterator<Item = PeerFrame>) -> IngestReport {
        self.router.ingest(frames)
    }

    pub fn ingest_truth(&mut self, truth: TruthFrame) -> Result<(), DropReason> {
        self.router.ingest_truth(truth)
    }

    pub fn report_violation(&mut self, node: &NodeId, kind: &str, severity: u32) -> bool {
        self.router.report_violation(node, kind, severity)
    }

    pub fn route(&self, request: &RouteRequest) -> Option<RouteDecision> {
        self.router.route(request)
    }

    // ── Epochs ──────────────────────────────────────────────────────────

    /// Fan `epoch` out to governor, emergence and router, in that order, so
    /// routing meters with whatever was activated this epoch.
    pub fn tick(&mut self, epoch: Epoch) -> PlaneTick {
        let governance = self.governor.tick(epoch);
        let emergence = self.emergence.tick(epoch);
        let metering = self.router.tick(epoch);
        info!(epoch, ?governance, "Epoch processed");
        PlaneTick {
            epoch,
            governance,
            emergence,
            metering,
        }
    }

    /// Advance the clock by one epoch and tick.
    pub fn advance_epoch(&mut self) -> PlaneTick {
        let epoch = self.clock.advance();
        self.tick(epoch)
    }

    /// Jump the clock forward (never back) and tick at the resulting epoch.
    pub fn advance_to(&mut self, epoch: Epoch) -> PlaneTick {
        let epoch = self.clock.advance_to(epoch);
        self.tick(epoch)
    }

    /// Every audit record from every component, in append order, tagged with
    /// its source.
    pub fn audit_trail(&self) -> Vec<(String, AuditRecord)> {
        self.audit.records()
    }

    pub fn status(&self) -> PlaneStatus {
        PlaneStatus {
            node_id: self.router.node_id().clone(),
            epoch: self.epoch(),
            params: self.params(),
            pending_metabolic: self.governor.pending_count(),
            activated_organs: self
                .emergence
                .activated_organs()
                .iter()
                .map(|organ| organ.organ_id.clone())
                .collect(),
            peers: self.router.peer_count(),
            audit_records: self.audit.len(),
        }
    }
}
