//! Error types raised synchronously to callers.
//!
//! Only submission-time failures are errors. Everything that goes wrong
//! during an epoch tick is recovered internally and lands in the audit log.

use thiserror::Error;

use crate::epoch::Epoch;
use crate::frames::ProposalId;

/// Submission failures for metabolic and emergence proposals.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GovernanceError {
    /// The target epoch is not strictly after the current epoch.
    #[error("target epoch {target} must be strictly after current epoch {current}")]
    InvalidTarget { target: Epoch, current: Epoch },

    /// A proposal with this identifier already exists.
    #[error("proposal already exists: {0}")]
    DuplicateProposal(ProposalId),
}

pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// An incoherent parameter mesh configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MeshError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A string that does not name a governed parameter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown metabolic parameter: {0}")]
pub struct UnknownParamKey(pub String);
