#![deny(unsafe_code)]
//! # metabolic-drift
//!
//! Bounds how far governed parameters may move in one epoch.
//!
//! Each governed key has a constitutional per-epoch cap. The cap is scaled by
//! a drift factor in `[0, 1]` derived from the witnessed ache for the epoch
//! being validated:
//!
//! ```text
//!   ache ≤ floor          → 0            (drift frozen)
//!   floor < ache < ceil   → ((ache − floor) / (ceil − floor)) ^ kappa
//!   ache ≥ ceil           → 1            (full cap)
//! ```
//!
//! Without an ache frame for exactly that epoch the factor is 0, so a stale
//! reading can never unlock drift.

pub mod curve;
pub mod governor;

pub use curve::{drift_curve, DRIFT_TOLERANCE};
pub use governor::{DriftGate, DriftGovernor};
