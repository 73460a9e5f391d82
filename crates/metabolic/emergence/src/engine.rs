//! Emergence engine for organ proposals, votes and activation.

use std::collections::HashMap;
use std::sync::Arc;

use metabolic_drift::{DriftGate, DriftGovernor};
use metabolic_types::{
    ensure_future_target, AcheFrame, AuditEvent, AuditLog, AuditSink, EmergenceConfig,
    EmergenceProposalFrame, EmergenceVoteFrame, Epoch, EpochSource, GovernanceError,
    GovernanceResult, MeshReader, OrganSpec, ProposalId, ProposalStatus, VoteOutcome, VoterSet,
    WitnessId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::envelope::check_envelope;
use crate::snapshot::{ache_trend, cooldown_remaining, TriggerSnapshot};

// ── Proposal ────────────────────────────────────────────────────────────

/// A proposed organ and its lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergenceProposal {
    pub id: ProposalId,
    pub target_epoch: Epoch,
    pub organ: OrganSpec,
    pub proposer: WitnessId,
    pub created_at_epoch: Epoch,
    pub voters: VoterSet,
    pub status: ProposalStatus,
}

impl EmergenceProposal {
    pub fn votes(&self) -> usize {
        self.voters.len()
    }
}

/// What a tick did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergenceTick {
    /// This epoch (or a later one) was already processed.
    AlreadyProcessed,
    Processed {
        activated: Vec<ProposalId>,
        rejected: Vec<ProposalId>,
    },
}

impl EmergenceTick {
    pub fn activated(&self) -> &[ProposalId] {
        match self {
            Self::Processed { activated, .. } => activated,
            Self::AlreadyProcessed => &[],
        }
    }

    pub fn rejected(&self) -> &[ProposalId] {
        match self {
            Self::Processed { rejected, .. } => rejected,
            Self::AlreadyProcessed => &[],
        }
    }
}

// ── Engine ──────────────────────────────────────────────────────────────

/// Organ emergence state machine. Owns the drift gate it consults.
pub struct EmergenceEngine<D: DriftGate = DriftGovernor> {
    epochs: Arc<dyn EpochSource>,
    mesh: MeshReader,
    drift: D,
    /// Epoch-sorted, one frame per epoch, indices clamped.
    ache_frames: Vec<AcheFrame>,
    proposals: HashMap<ProposalId, EmergenceProposal>,
    activated_organs: Vec<OrganSpec>,
    boot_epoch: Epoch,
    last_emergence: Option<Epoch>,
    last_tick: Option<Epoch>,
    log: AuditLog,
}

impl EmergenceEngine<DriftGovernor> {
    /// An engine gated by a [`DriftGovernor`] over the same clock and mesh.
    pub fn with_drift_governor(epochs: Arc<dyn EpochSource>, mesh: MeshReader) -> Self {
        let drift = DriftGovernor::new(Arc::clone(&epochs), mesh.clone());
        Self::new(epochs, mesh, drift)
    }
}

impl<D: DriftGate> EmergenceEngine<D> {
    /// The boot epoch is the epoch current at construction.
    pub fn new(epochs: Arc<dyn EpochSource>, mesh: MeshReader, drift: D) -> Self {
        let boot_epoch = epochs.current_epoch();
        Self {
            epochs,
            mesh,
            drift,
            ache_frames: Vec::new(),
            proposals: HashMap::new(),
            activated_organs: Vec::new(),
            boot_epoch,
            last_emergence: None,
            last_tick: None,
            log: AuditLog::new("emergence"),
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.log.add_sink(sink);
        self
    }

    pub fn drift(&self) -> &D {
        &self.drift
    }

    pub fn drift_mut(&mut self) -> &mut D {
        &mut self.drift
    }

    pub fn boot_epoch(&self) -> Epoch {
        self.boot_epoch
    }

    pub fn last_emergence_epoch(&self) -> Option<Epoch> {
        self.last_emergence
    }

    /// Organs activated so far, in activation order.
    pub fn activated_organs(&self) -> &[OrganSpec] {
        &self.activated_organs
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&EmergenceProposal> {
        self.proposals.get(id)
    }

    pub fn ache_frames(&self) -> &[AcheFrame] {
        &self.ache_frames
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.log
    }

    /// Keep one ache frame per current-or-future epoch. Returns whether the
    /// frame was kept.
    pub fn record_ache(&mut self, frame: &AcheFrame) -> bool {
        let current = self.epochs.current_epoch();
        if frame.epoch < current {
            debug!(frame_epoch = frame.epoch, current, "Dropping stale emergence ache frame");
            return false;
        }

        let mut stored = frame.clone();
        stored.ache_index = frame.clamped_index();
        let ache_index = stored.ache_index;
        match self
            .ache_frames
            .binary_search_by_key(&frame.epoch, |f| f.epoch)
        {
            Ok(pos) => self.ache_frames[pos] = stored,
            Err(pos) => self.ache_frames.insert(pos, stored),
        }

        self.log.append(
            frame.epoch,
            AuditEvent::AcheRecorded {
                ache_index,
                witness_id: frame.witness_id.clone(),
            },
        );
        true
    }

    pub fn submit(&mut self, frame: EmergenceProposalFrame) -> GovernanceResult<()> {
        let current = self.epochs.current_epoch();
        ensure_future_target(frame.target_epoch, current)?;
        if self.proposals.contains_key(&frame.proposal_id) {
            return Err(GovernanceError::DuplicateProposal(frame.proposal_id));
        }

        info!(
            proposal_id = %frame.proposal_id,
            organ_id = %frame.organ.organ_id,
            target_epoch = frame.target_epoch,
            "Emergence proposal submitted"
        );
        self.log.append(
            current,
            AuditEvent::ProposalSubmitted {
                proposal_id: frame.proposal_id.clone(),
                target_epoch: frame.target_epoch,
                proposer: frame.proposer_witness.clone(),
            },
        );
        self.proposals.insert(
            frame.proposal_id.clone(),
            EmergenceProposal {
                id: frame.proposal_id,
                target_epoch: frame.target_epoch,
                organ: frame.organ,
                proposer: frame.proposer_witness,
                created_at_epoch: current,
                voters: VoterSet::new(),
                status: ProposalStatus::Pending,
            },
        );
        Ok(())
    }

    pub fn vote(&mut self, frame: &EmergenceVoteFrame) -> VoteOutcome {
        let Some(proposal) = self.proposals.get_mut(&frame.proposal_id) else {
            debug!(proposal_id = %frame.proposal_id, "Vote for unknown emergence proposal ignored");
            return VoteOutcome::UnknownProposal;
        };
        if proposal.status.is_terminal() {
            return VoteOutcome::Closed;
        }
        if !proposal.voters.insert(frame.witness_id.clone()) {
            return VoteOutcome::AlreadyCounted;
        }

        let votes = proposal.votes();
        self.log.append(
            self.epochs.current_epoch(),
            AuditEvent::VoteCounted {
                proposal_id: frame.proposal_id.clone(),
                witness_id: frame.witness_id.clone(),
                votes,
            },
        );
        VoteOutcome::Counted { votes }
    }

    /// Triggers as they stand for `epoch`.
    pub fn trigger_snapshot(&self, epoch: Epoch) -> TriggerSnapshot {
        let cooldown = self.mesh.read(|m| m.emergence.cooldown_epochs);
        TriggerSnapshot {
            epoch,
            ache_trend: ache_trend(&self.ache_frames, epoch),
            uptime_epochs: epoch.saturating_sub(self.boot_epoch),
            cooldown_remaining: cooldown_remaining(self.last_emergence, cooldown, epoch),
            drift_factor: self.drift.drift_factor(epoch),
        }
    }

    /// Tick at the epoch reported by the epoch source.
    pub fn on_epoch_tick(&mut self) -> EmergenceTick {
        let epoch = self.epochs.current_epoch();
        self.tick(epoch)
    }

    /// Evaluate every eligible proposal once. Epochs at or before the last
    /// processed one are ignored.
    pub fn tick(&mut self, epoch: Epoch) -> EmergenceTick {
        if self.last_tick.is_some_and(|last| epoch <= last) {
            return EmergenceTick::AlreadyProcessed;
        }
        self.last_tick = Some(epoch);

        let config = self.mesh.read(|m| m.emergence.clone());
        let snapshot = self.trigger_snapshot(epoch);
        debug!(
            epoch,
            ache_trend = snapshot.ache_trend,
            uptime = snapshot.uptime_epochs,
            cooldown_remaining = snapshot.cooldown_remaining,
            drift_factor = snapshot.drift_factor,
            "Emergence trigger snapshot"
        );

        let mut eligible: Vec<(Epoch, ProposalId)> = self
            .proposals
            .values()
            .filter(|p| {
                p.status.is_pending() && p.votes() >= config.quorum && p.target_epoch <= epoch
            })
            .map(|p| (p.created_at_epoch, p.id.clone()))
            .collect();
        eligible.sort();

        let mut activated = Vec::new();
        for (_, id) in &eligible {
            if activated.len() >= config.max_organs_per_epoch {
                break;
            }
            if self.admit(id, &snapshot, &config) {
                self.activate(id, epoch);
                activated.push(id.clone());
            }
        }

        let mut rejected = Vec::new();
        for (_, id) in eligible {
            let Some(proposal) = self.proposals.get_mut(&id) else {
                continue;
            };
            if proposal.status.settle(ProposalStatus::Rejected) {
                info!(proposal_id = %id, epoch, "Emergence proposal rejected");
                self.log.append(
                    epoch,
                    AuditEvent::ProposalRejected {
                        proposal_id: id.clone(),
                    },
                );
                rejected.push(id);
            }
        }

        self.prune_ache(epoch);
        EmergenceTick::Processed {
            activated,
            rejected,
        }
    }

    /// Run the admission checks in order, logging the first failure.
    fn admit(&mut self, id: &ProposalId, snapshot: &TriggerSnapshot, config: &EmergenceConfig) -> bool {
        let epoch = snapshot.epoch;

        if snapshot.uptime_epochs < config.min_uptime_epochs {
            debug!(proposal_id = %id, uptime = snapshot.uptime_epochs, "Emergence blocked by uptime");
            self.log.append(
                epoch,
                AuditEvent::BlockedUptime {
                    proposal_id: id.clone(),
                    uptime_epochs: snapshot.uptime_epochs,
                    required: config.min_uptime_epochs,
                },
            );
            return false;
        }

        if snapshot.cooldown_remaining > 0 {
            debug!(proposal_id = %id, remaining = snapshot.cooldown_remaining, "Emergence blocked by cooldown");
            self.log.append(
                epoch,
                AuditEvent::BlockedCooldown {
                    proposal_id: id.clone(),
                    cooldown_remaining: snapshot.cooldown_remaining,
                },
            );
            return false;
        }

        if snapshot.ache_trend < config.ache_trend_threshold {
            debug!(proposal_id = %id, ache_trend = snapshot.ache_trend, "Emergence blocked by ache trend");
            self.log.append(
                epoch,
                AuditEvent::BlockedAcheTrend {
                    proposal_id: id.clone(),
                    ache_trend: snapshot.ache_trend,
                    threshold: config.ache_trend_threshold,
                },
            );
            return false;
        }

        let Some(proposal) = self.proposals.get(id) else {
            return false;
        };
        if proposal.target_epoch > epoch {
            return false;
        }

        if let Err(breach) = check_envelope(&proposal.organ) {
            warn!(
                proposal_id = %id,
                param = %breach.param,
                value = breach.value,
                "Organ parameter outside its safety envelope"
            );
            self.log.append(
                epoch,
                AuditEvent::EnvelopeViolation {
                    proposal_id: id.clone(),
                    param: breach.param,
                    value: breach.value,
                    bound: breach.bound,
                },
            );
            return false;
        }

        let governed = proposal.organ.governed_params();
        if !self.drift.validate(&governed, epoch) {
            warn!(proposal_id = %id, epoch, "Organ parameters exceed drift envelope");
            self.log.append(
                epoch,
                AuditEvent::DriftEnvelopeRejected {
                    proposal_id: id.clone(),
                },
            );
            return false;
        }

        true
    }

    fn activate(&mut self, id: &ProposalId, epoch: Epoch) {
        let Some(proposal) = self.proposals.get_mut(id) else {
            return;
        };
        if !proposal.status.settle(ProposalStatus::Activated) {
            return;
        }

        let organ = proposal.organ.clone();
        info!(
            proposal_id = %id,
            organ_id = %organ.organ_id,
            organ_type = %organ.organ_type,
            epoch,
            "Organ activated"
        );
        self.log.append(
            epoch,
            AuditEvent::OrganActivated {
                proposal_id: id.clone(),
                organ_id: organ.organ_id.clone(),
                organ_type: organ.organ_type.clone(),
            },
        );
        self.activated_organs.push(organ);
        self.last_emergence = Some(epoch);
    }

    /// Drop frames older than the two that define the trend at `epoch`.
    fn prune_ache(&mut self, epoch: Epoch) {
        let keep_from = self
            .ache_frames
            .iter()
            .rev()
            .filter(|f| f.epoch <= epoch)
            .nth(1)
            .map(|f| f.epoch);
        if let Some(from) = keep_from {
            self.ache_frames.retain(|f| f.epoch >= from);
        }
    }
}
