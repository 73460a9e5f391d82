//! # metabolic-governance
//!
//! Witness-voted governance over the six metabolic parameters.
//!
//! A proposal names a strictly-future target epoch and a full parameter
//! assignment. Witnesses vote by echoing the proposal's content. When the
//! target epoch ticks, every pending proposal for that epoch with quorum is a
//! candidate; exactly one may win.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Metabolic Governor                         │
//! ├───────────────────────────────────────────────────────────────┤
//! │  submit ──▶ Pending ◀── vote (echo + distinct voter)           │
//! │                │                                               │
//! │          tick(epoch) ── target == epoch && votes ≥ quorum      │
//! │                │                                               │
//! │        order by (created_at_epoch, id)                         │
//! │           │                     │                              │
//! │        winner                 others ──▶ Superseded            │
//! │           │                                                    │
//! │   ┌───────▼────────┐                                           │
//! │   │ Safety bounds  │── fail ──▶ Superseded (mesh untouched)    │
//! │   └───────┬────────┘                                           │
//! │           ▼                                                    │
//! │      Activated ──▶ MeshWriter::apply (all six, atomically)     │
//! └───────────────────────────────────────────────────────────────┘
//! ```

#![deny(unsafe_code)]

pub mod governor;
pub mod safety;

pub use governor::{GovernanceTick, MetabolicGovernor, MetabolicProposal};
pub use safety::check_safety;
