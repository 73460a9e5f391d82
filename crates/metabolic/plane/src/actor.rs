//! Actor wrapper serialising every call into a [`ControlPlane`].
//!
//! The plane is moved into a tokio task; [`PlaneHandle`] is a cheap, cloneable
//! mailbox. Each request carries a `oneshot` for its reply, so callers on any
//! task observe the same single-writer ordering.

use holographic_router::{IngestReport, NodeId, PeerFrame, RouteDecision, RouteRequest};
use metabolic_types::{
    AcheFrame, AuditRecord, EmergenceProposalFrame, EmergenceVoteFrame, Epoch, MetabolicVoteFrame,
    ParamMap, ProposalId, VoteOutcome, WitnessId,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{PlaneError, PlaneResult};
use crate::plane::{ControlPlane, PlaneStatus, PlaneTick};

const DEFAULT_MAILBOX: usize = 256;

enum Request {
    SubmitMetabolic {
        id: ProposalId,
        target_epoch: Epoch,
        params: ParamMap,
        proposer: WitnessId,
        rationale_hash: String,
        reply: oneshot::Sender<PlaneResult<()>>,
    },
    VoteMetabolic {
        frame: MetabolicVoteFrame,
        reply: oneshot::Sender<VoteOutcome>,
    },
    SubmitEmergence {
        frame: EmergenceProposalFrame,
        reply: oneshot::Sender<PlaneResult<()>>,
    },
    VoteEmergence {
        frame: EmergenceVoteFrame,
        reply: oneshot::Sender<VoteOutcome>,
    },
    Ache {
        frame: AcheFrame,
        reply: oneshot::Sender<bool>,
    },
    Ingest {
        frames: Vec<PeerFrame>,
        reply: oneshot::Sender<IngestReport>,
    },
    Violation {
        node: NodeId,
        kind: String,
        severity: u32,
        reply: oneshot::Sender<bool>,
    },
    Advance {
        reply: oneshot::Sender<PlaneTick>,
    },
    Route {
        request: RouteRequest,
        reply: oneshot::Sender<Option<RouteDecision>>,
    },
    Status {
        reply: oneshot::Sender<PlaneStatus>,
    },
    AuditTrail {
        reply: oneshot::Sender<Vec<(String, AuditRecord)>>,
    },
}

impl Request {
    fn handle(self, plane: &mut ControlPlane) {
        // A dropped reply receiver only means the caller stopped waiting.
        match self {
            Request::SubmitMetabolic {
                id,
                target_epoch,
                params,
                proposer,
                rationale_hash,
                reply,
            } => {
                let _ = reply.send(plane.submit_metabolic(
                    id,
                    target_epoch,
                    params,
                    proposer,
                    rationale_hash,
                ));
            }
            Request::VoteMetabolic { frame, reply } => {
                let _ = reply.send(plane.vote_metabolic(&frame));
            }
            Request::SubmitEmergence { frame, reply } => {
                let _ = reply.send(plane.submit_emergence(frame));
            }
            Request::VoteEmergence { frame, reply } => {
                let _ = reply.send(plane.vote_emergence(&frame));
            }
            Request::Ache { frame, reply } => {
                let _ = reply.send(plane.ingest_ache(&frame));
            }
            Request::Ingest { frames, reply } => {
                let _ = reply.send(plane.ingest_frames(frames));
            }
            Request::Violation {
                node,
                kind,
                severity,
                reply,
            } => {
                let _ = reply.send(plane.report_violation(&node, &kind, severity));
            }
            Request::Advance { reply } => {
                let _ = reply.send(plane.advance_epoch());
            }
            Request::Route { request, reply } => {
                let _ = reply.send(plane.route(&request));
            }
            Request::Status { reply } => {
                let _ = reply.send(plane.status());
            }
            Request::AuditTrail { reply } => {
                let _ = reply.send(plane.audit_trail());
            }
        }
    }
}

/// Cloneable handle to a running plane actor.
#[derive(Clone)]
pub struct PlaneHandle {
    sender: mpsc::Sender<Request>,
}

impl PlaneHandle {
    /// Move `plane` into a new task. The task ends, returning the plane, once
    /// every handle has been dropped.
    pub fn spawn(plane: ControlPlane) -> (Self, JoinHandle<ControlPlane>) {
        Self::spawn_with_capacity(plane, DEFAULT_MAILBOX)
    }

    pub fn spawn_with_capacity(
        mut plane: ControlPlane,
        capacity: usize,
    ) -> (Self, JoinHandle<ControlPlane>) {
        let (sender, mut receiver) = mpsc::channel::<Request>(capacity.max(1));
        let task = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                request.handle(&mut plane);
            }
            debug!("Control plane actor stopped");
            plane
        });
        (Self { sender }, task)
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> PlaneResult<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| PlaneError::ActorClosed)?;
        response.await.map_err(|_| PlaneError::ActorClosed)
    }

    pub async fn submit_metabolic(
        &self,
        id: ProposalId,
        target_epoch: Epoch,
        params: ParamMap,
        proposer: WitnessId,
        rationale_hash: impl Into<String>,
    ) -> PlaneResult<()> {
        let rationale_hash = rationale_hash.into();
        self.call(|reply| Request::SubmitMetabolic {
            id,
            target_epoch,
            params,
            proposer,
            rationale_hash,
            reply,
        })
        .await?
    }

    pub async fn vote_metabolic(&self, frame: MetabolicVoteFrame) -> PlaneResult<VoteOutcome> {
        self.call(|reply| Request::VoteMetabolic { frame, reply })
            .await
    }

    pub async fn submit_emergence(&self, frame: EmergenceProposalFrame) -> PlaneResult<()> {
        self.call(|reply| Request::SubmitEmergence { frame, reply })
            .await?
    }

    pub async fn vote_emergence(&self, frame: EmergenceVoteFrame) -> PlaneResult<VoteOutcome> {
        self.call(|reply| Request::VoteEmergence { frame, reply })
            .await
    }

    pub async fn ingest_ache(&self, frame: AcheFrame) -> PlaneResult<bool> {
        self.call(|reply| Request::Ache { frame, reply }).await
    }

    pub async fn ingest_frames(&self, frames: Vec<PeerFrame>) -> PlaneResult<IngestReport> {
        self.call(|reply| Request::Ingest { frames, reply }).await
    }

    pub async fn report_violation(
        &self,
        node: NodeId,
        kind: impl Into<String>,
        severity: u32,
    ) -> PlaneResult<bool> {
        let kind = kind.into();
        self.call(|reply| Request::Violation {
            node,
            kind,
            severity,
            reply,
        })
        .await
    }

    pub async fn advance_epoch(&self) -> PlaneResult<PlaneTick> {
        self.call(|reply| Request::Advance { reply }).await
    }

    pub async fn route(&self, request: RouteRequest) -> PlaneResult<Option<RouteDecision>> {
        self.call(|reply| Request::Route { request, reply }).await
    }

    pub async fn status(&self) -> PlaneResult<PlaneStatus> {
        self.call(|reply| Request::Status { reply }).await
    }

    pub async fn audit_trail(&self) -> PlaneResult<Vec<(String, AuditRecord)>> {
        self.call(|reply| Request::AuditTrail { reply }).await
    }
}
