//! Metabolic governor for proposals, votes and activation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use metabolic_types::{
    ensure_future_target, AuditEvent, AuditLog, AuditSink, Epoch, EpochSource, GovernanceError,
    GovernanceResult, MeshReader, MeshWriter, MetabolicVoteFrame, ParamMap, ProposalId,
    ProposalStatus, SupersedeReason, VoteOutcome, VoterSet, WitnessId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::safety::check_safety;

// ── Proposal ────────────────────────────────────────────────────────────

/// A proposed assignment of metabolic parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetabolicProposal {
    pub id: ProposalId,
    pub target_epoch: Epoch,
    pub params: ParamMap,
    pub proposer: WitnessId,
    pub created_at_epoch: Epoch,
    pub rationale_hash: String,
    pub voters: VoterSet,
    pub status: ProposalStatus,
}

impl MetabolicProposal {
    pub fn votes(&self) -> usize {
        self.voters.len()
    }

    fn echoes(&self, vote: &MetabolicVoteFrame) -> bool {
        vote.target_epoch == self.target_epoch
            && vote.rationale_hash == self.rationale_hash
            && vote.params == self.params
    }

    fn rank(&self) -> (Epoch, &ProposalId) {
        (self.created_at_epoch, &self.id)
    }
}

/// What a tick did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceTick {
    /// This epoch (or a later one) was already processed.
    AlreadyProcessed,
    /// No pending proposal with quorum targeted this epoch.
    NoCandidates,
    /// The winner passed the safety check and was applied.
    Activated(ProposalId),
    /// The winner failed the safety check; nothing was applied.
    SafetyRejected(ProposalId),
}

// ── Governor ────────────────────────────────────────────────────────────

/// Owns the single [`MeshWriter`] and applies winning proposals to it.
pub struct MetabolicGovernor {
    epochs: Arc<dyn EpochSource>,
    mesh: MeshWriter,
    proposals: HashMap<ProposalId, MetabolicProposal>,
    /// Ids of pruned proposals; never reusable.
    retired: HashSet<ProposalId>,
    last_tick: Option<Epoch>,
    log: AuditLog,
}

impl MetabolicGovernor {
    pub fn new(epochs: Arc<dyn EpochSource>, mesh: MeshWriter) -> Self {
        Self {
            epochs,
            mesh,
            proposals: HashMap::new(),
            retired: HashSet::new(),
            last_tick: None,
            log: AuditLog::new("governor"),
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.log.add_sink(sink);
        self
    }

    /// A read-only view of the mesh this governor writes.
    pub fn mesh_reader(&self) -> MeshReader {
        self.mesh.reader()
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&MetabolicProposal> {
        self.proposals.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.proposals
            .values()
            .filter(|p| p.status.is_pending())
            .count()
    }

    pub fn last_tick(&self) -> Option<Epoch> {
        self.last_tick
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.log
    }

    /// Register a new pending proposal.
    pub fn submit(
        &mut self,
        id: ProposalId,
        target_epoch: Epoch,
        params: ParamMap,
        proposer: WitnessId,
        rationale_hash: impl Into<String>,
    ) -> GovernanceResult<()> {
        let current = self.epochs.current_epoch();
        ensure_future_target(target_epoch, current)?;
        if self.proposals.contains_key(&id) || self.retired.contains(&id) {
            return Err(GovernanceError::DuplicateProposal(id));
        }

        info!(proposal_id = %id, target_epoch, proposer = %proposer, "Metabolic proposal submitted");
        self.log.append(
            current,
            AuditEvent::ProposalSubmitted {
                proposal_id: id.clone(),
                target_epoch,
                proposer: proposer.clone(),
            },
        );
        self.proposals.insert(
            id.clone(),
            MetabolicProposal {
                id,
                target_epoch,
                params,
                proposer,
                created_at_epoch: current,
                rationale_hash: rationale_hash.into(),
                voters: VoterSet::new(),
                status: ProposalStatus::Pending,
            },
        );
        Ok(())
    }

    /// Count a vote if it echoes the proposal exactly and the voter is new.
    pub fn vote(&mut self, frame: &MetabolicVoteFrame) -> VoteOutcome {
        let Some(proposal) = self.proposals.get_mut(&frame.proposal_id) else {
            debug!(proposal_id = %frame.proposal_id, "Vote for unknown proposal ignored");
            return VoteOutcome::UnknownProposal;
        };
        if proposal.status.is_terminal() {
            return VoteOutcome::Closed;
        }
        if !proposal.echoes(frame) {
            debug!(
                proposal_id = %frame.proposal_id,
                witness = %frame.witness_id,
                "Vote does not echo proposal content"
            );
            return VoteOutcome::ContentMismatch;
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

    /// Tick at the epoch reported by the epoch source.
    pub fn on_epoch_tick(&mut self) -> GovernanceTick {
        let epoch = self.epochs.current_epoch();
        self.tick(epoch)
    }

    /// Process the proposals targeting `epoch`. At most once per epoch; an
    /// epoch at or before the last processed one is ignored.
    pub fn tick(&mut self, epoch: Epoch) -> GovernanceTick {
        if self.last_tick.is_some_and(|last| epoch <= last) {
            return GovernanceTick::AlreadyProcessed;
        }
        self.last_tick = Some(epoch);

        let limits = self.mesh.read(|m| m.governance.clone());

        let mut candidates: Vec<&MetabolicProposal> = self
            .proposals
            .values()
            .filter(|p| {
                p.status.is_pending() && p.target_epoch == epoch && p.votes() >= limits.quorum
            })
            .collect();
        if candidates.is_empty() {
            return GovernanceTick::NoCandidates;
        }
        candidates.sort_by(|a, b| a.rank().cmp(&b.rank()));

        let winner_id = candidates[0].id.clone();
        let safety = check_safety(&candidates[0].params, &limits);
        let losers: Vec<ProposalId> = candidates[1..].iter().map(|p| p.id.clone()).collect();

        for loser in losers {
            self.settle(&loser, ProposalStatus::Superseded);
            info!(proposal_id = %loser, winner = %winner_id, epoch, "Metabolic proposal superseded");
            self.log.append(
                epoch,
                AuditEvent::ProposalSuperseded {
                    proposal_id: loser,
                    reason: SupersedeReason::OutrankedBy(winner_id.clone()),
                },
            );
        }

        match safety {
            Ok(applied) => {
                self.mesh.apply(applied);
                self.settle(&winner_id, ProposalStatus::Activated);
                info!(proposal_id = %winner_id, epoch, "Metabolic proposal activated");
                self.log.append(
                    epoch,
                    AuditEvent::ProposalActivated {
                        proposal_id: winner_id.clone(),
                        applied,
                    },
                );
                GovernanceTick::Activated(winner_id)
            }
            Err(violation) => {
                self.settle(&winner_id, ProposalStatus::Superseded);
                warn!(
                    proposal_id = %winner_id,
                    epoch,
                    violation = %violation,
                    "Metabolic proposal failed safety check"
                );
                self.log.append(
                    epoch,
                    AuditEvent::SafetyViolation {
                        proposal_id: winner_id.clone(),
                        violation,
                    },
                );
                self.log.append(
                    epoch,
                    AuditEvent::ProposalSuperseded {
                        proposal_id: winner_id.clone(),
                        reason: SupersedeReason::FailedSafety,
                    },
                );
                GovernanceTick::SafetyRejected(winner_id)
            }
        }
    }

    /// Drop pending proposals whose target lies more than `horizon` epochs in
    /// the past. Their ids stay reserved. Never called implicitly.
    pub fn prune_stale(&mut self, horizon: Epoch) -> Vec<ProposalId> {
        let current = self.epochs.current_epoch();
        let mut stale: Vec<ProposalId> = self
            .proposals
            .values()
            .filter(|p| p.status.is_pending() && p.target_epoch.saturating_add(horizon) < current)
            .map(|p| p.id.clone())
            .collect();
        stale.sort();

        for id in &stale {
            if let Some(proposal) = self.proposals.remove(id) {
                debug!(proposal_id = %id, target_epoch = proposal.target_epoch, "Pruned stale proposal");
                self.log.append(
                    current,
                    AuditEvent::ProposalPruned {
                        proposal_id: id.clone(),
                        target_epoch: proposal.target_epoch,
                    },
                );
            }
            self.retired.insert(id.clone());
        }
        stale
    }

    fn settle(&mut self, id: &ProposalId, next: ProposalStatus) {
        if let Some(proposal) = self.proposals.get_mut(id) {
            proposal.status.settle(next);
        }
    }
}
