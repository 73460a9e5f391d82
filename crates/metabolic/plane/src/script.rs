//! JSON command scripts replayed against a [`ControlPlane`].
//!
//! A script is a JSON array of commands, each tagged with `op`:
//!
//! ```json
//! [
//!   { "op": "submit", "id": "p1", "target_epoch": 1, "proposer": "w0",
//!     "params": { "w_heal": 0.6, "w_truth": 0.2, "w_rot": 1.0,
//!                 "beta": 0.05, "m_min": 0.5, "m_max": 1.5 } },
//!   { "op": "tick" },
//!   { "op": "route", "transaction_id": "tx-1", "required_units": 10 }
//! ]
//! ```

use std::sync::Arc;

use holographic_router::{
    DropReason, HealthFrame, IngestReport, NodeId, PeerFrame, RouteDecision, RouteRequest,
    ScoreTable, TruthFrame,
};
use metabolic_types::{
    AcheFrame, EmergenceProposalFrame, EmergenceVoteFrame, Epoch, MetabolicVoteFrame, ParamMap,
    ProposalId, VoteOutcome, WitnessId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plane::{ControlPlane, PlaneTick};

/// One scripted call into the plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// `id` defaults to a fresh random identifier.
    Submit {
        #[serde(default = "ProposalId::generate")]
        id: ProposalId,
        target_epoch: Epoch,
        params: ParamMap,
        proposer: WitnessId,
        #[serde(default)]
        rationale_hash: String,
    },
    Vote(MetabolicVoteFrame),
    ProposeOrgan(EmergenceProposalFrame),
    VoteOrgan(EmergenceVoteFrame),
    Ache(AcheFrame),
    Health(HealthFrame),
    Truth(TruthFrame),
    Violation {
        node_id: NodeId,
        kind: String,
        #[serde(default = "default_severity")]
        severity: u32,
    },
    Score {
        node_id: NodeId,
        score: f64,
    },
    /// Advance one epoch, or jump to `epoch` if given.
    Tick {
        #[serde(default)]
        epoch: Option<Epoch>,
    },
    Route(RouteRequest),
}

fn default_severity() -> u32 {
    1
}

/// What one command did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    Submitted { id: ProposalId },
    Refused { error: String },
    Vote { vote: VoteOutcome },
    Ache { kept: bool },
    Ingested { report: IngestReport },
    TruthDropped { reason: DropReason },
    Violation { known: bool },
    Scored,
    Ticked { tick: PlaneTick },
    Routed {
        transaction_id: String,
        decision: Option<RouteDecision>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Parse a script document.
pub fn parse_script(raw: &str) -> Result<Vec<Command>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Drives a plane from commands. Owns the score table the plane's router
/// reads, so `score` commands take effect at the next tick.
pub struct ScriptRunner {
    plane: ControlPlane,
    scores: Arc<ScoreTable>,
}

impl ScriptRunner {
    pub fn new(plane: ControlPlane, scores: Arc<ScoreTable>) -> Self {
        Self { plane, scores }
    }

    pub fn plane(&self) -> &ControlPlane {
        &self.plane
    }

    pub fn into_plane(self) -> ControlPlane {
        self.plane
    }

    pub fn run(&mut self, commands: impl IntoIterator<Item = Command>) -> Vec<Step> {
        commands
            .into_iter()
            .enumerate()
            .map(|(index, command)| Step {
                index,
                outcome: self.apply(command),
            })
            .collect()
    }

    pub fn apply(&mut self, command: Command) -> StepOutcome {
        debug!(?command, "Replaying command");
        match command {
            Command::Submit {
                id,
                target_epoch,
                params,
                proposer,
                rationale_hash,
            } => match self.plane.submit_metabolic(
                id.clone(),
                target_epoch,
                params,
                proposer,
                rationale_hash,
            ) {
                Ok(()) => StepOutcome::Submitted { id },
                Err(e) => StepOutcome::Refused {
                    error: e.to_string(),
                },
            },
            Command::Vote(frame) => StepOutcome::Vote {
                vote: self.plane.vote_metabolic(&frame),
            },
            Command::ProposeOrgan(frame) => {
                let id = frame.proposal_id.clone();
                match self.plane.submit_emergence(frame) {
                    Ok(()) => StepOutcome::Submitted { id },
                    Err(e) => StepOutcome::Refused {
                        error: e.to_string(),
                    },
                }
            }
            Command::VoteOrgan(frame) => StepOutcome::Vote {
                vote: self.plane.vote_emergence(&frame),
            },
            Command::Ache(frame) => StepOutcome::Ache {
                kept: self.plane.ingest_ache(&frame),
            },
            Command::Health(frame) => StepOutcome::Ingested {
                report: self.plane.ingest_frames([PeerFrame::Health(frame)]),
            },
            Command::Truth(truth) => match self.plane.ingest_truth(truth) {
                Ok(()) => StepOutcome::Ingested {
                    report: IngestReport {
                        accepted: 1,
                        dropped: Vec::new(),
                    },
                },
                Err(reason) => StepOutcome::TruthDropped { reason },
            },
            Command::Violation {
                node_id,
                kind,
                severity,
            } => StepOutcome::Violation {
                known: self.plane.report_violation(&node_id, &kind, severity),
            },
            Command::Score { node_id, score } => {
                self.scores.set(node_id, score);
                StepOutcome::Scored
            }
            Command::Tick { epoch } => StepOutcome::Ticked {
                tick: match epoch {
                    Some(epoch) => self.plane.advance_to(epoch),
                    None => self.plane.advance_epoch(),
                },
            },
            Command::Route(request) => StepOutcome::Routed {
                decision: self.plane.route(&request),
                transaction_id: request.transaction_id,
            },
        }
    }
}
