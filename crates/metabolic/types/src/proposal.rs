//! Proposal lifecycle shared by the metabolic governor and the emergence engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;
use crate::error::{GovernanceError, GovernanceResult};
use crate::frames::WitnessId;

/// `Pending → {Activated | Superseded | Rejected}`. Terminal states are final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Activated,
    /// Lost a same-epoch contest or failed the static safety check.
    Superseded,
    /// Was eligible for emergence but not activated.
    Rejected,
}

impl ProposalStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// Move to `next` if still pending. Returns whether the transition happened.
    pub fn settle(&mut self, next: ProposalStatus) -> bool {
        if self.is_terminal() || next.is_pending() {
            return false;
        }
        *self = next;
        true
    }
}

/// Distinct voters on a proposal. Duplicates are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSet(BTreeSet<WitnessId>);

impl VoterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a voter. Returns `false` if they were already counted.
    pub fn insert(&mut self, voter: WitnessId) -> bool {
        self.0.insert(voter)
    }

    pub fn contains(&self, voter: &WitnessId) -> bool {
        self.0.contains(voter)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WitnessId> {
        self.0.iter()
    }
}

/// What happened to a vote. Ignored votes are not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoteOutcome {
    /// Counted; `votes` is the new distinct-voter total.
    Counted { votes: usize },
    /// No proposal with that id.
    UnknownProposal,
    /// The vote did not echo the proposal's content.
    ContentMismatch,
    /// This voter was already counted.
    AlreadyCounted,
    /// The proposal has reached a terminal state.
    Closed,
}

impl VoteOutcome {
    pub fn is_counted(&self) -> bool {
        matches!(self, Self::Counted { .. })
    }
}

/// Submission guard: the target must lie strictly in the future.
pub fn ensure_future_target(target: Epoch, current: Epoch) -> GovernanceResult<()> {
    if target <= current {
        return Err(GovernanceError::InvalidTarget { target, current });
    }
    Ok(())
}
