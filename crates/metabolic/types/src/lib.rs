#![deny(unsafe_code)]
//! # metabolic-types
//!
//! Shared vocabulary for the metabolic control plane.
//!
//! The control plane governs a handful of tunable "metabolic" parameters and
//! the emergence of new organs over discrete epochs. Every component speaks
//! the types defined here:
//!
//! - [`Epoch`], [`EpochSource`] and [`EpochClock`]: externally advanced time.
//! - [`ParamKey`] and [`MetabolicParams`]: the closed set of governed values.
//! - [`ParameterMesh`]: governed values plus every governance/drift/emergence/
//!   routing constant, shared through a single [`MeshWriter`] and any number of
//!   read-only [`MeshReader`]s.
//! - Witness frames ([`AcheFrame`], [`MetabolicVoteFrame`], ...).
//! - Proposal lifecycle ([`ProposalStatus`], [`VoterSet`], [`VoteOutcome`]).
//! - The typed, epoch-stamped [`AuditLog`].
//!
//! ```text
//!   EpochClock ──▶ MetabolicGovernor ──(MeshWriter)──▶ ParameterMesh
//!        │                                                │ (MeshReader)
//!        ├──────▶ EmergenceEngine ──▶ DriftGovernor ◀─────┤
//!        └──────▶ HolographicRouter ◀─────────────────────┘
//! ```

pub mod audit;
pub mod epoch;
pub mod error;
pub mod frames;
pub mod mesh;
pub mod params;
pub mod proposal;

pub use audit::{
    AuditEvent, AuditLog, AuditRecord, AuditSink, DriftBreach, EnvelopeBound, JsonLinesAuditSink,
    MemoryAuditSink, SafetyViolation, SupersedeReason,
};
pub use epoch::{Epoch, EpochClock, EpochSource};
pub use error::{GovernanceError, GovernanceResult, MeshError, UnknownParamKey};
pub use frames::{
    AcheFrame, EmergenceProposalFrame, EmergenceVoteFrame, MetabolicVoteFrame, OrganSpec,
    ProposalId, WitnessId,
};
pub use mesh::{
    DriftCaps, DriftConfig, EmergenceConfig, GovernanceLimits, MeshReader, MeshWriter,
    ParameterMesh, RoutingConfig,
};
pub use params::{MetabolicParams, ParamKey, ParamMap};
pub use proposal::{ensure_future_target, ProposalStatus, VoteOutcome, VoterSet};
