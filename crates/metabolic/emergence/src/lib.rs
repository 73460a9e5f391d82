//! # metabolic-emergence
//!
//! Governs when new organs may be added to the system.
//!
//! An emergence proposal carries a full [`OrganSpec`]. Once it has quorum and
//! its target epoch has arrived it becomes *eligible*, and on the next tick it
//! is either activated or rejected. Admission runs these checks in order,
//! stopping at the first failure:
//!
//! 1. uptime since boot ≥ `min_uptime_epochs`
//! 2. no emergence cooldown remaining
//! 3. ache trend ≥ `ache_trend_threshold`
//! 4. target epoch reached
//! 5. organ parameters inside their own `min_<key>` / `max_<key>` envelope
//! 6. governed parameters inside the ache-scaled drift envelope
//!
//! At most `max_organs_per_epoch` organs activate per tick. Every eligible
//! proposal not activated is rejected at the end of the tick.
//!
//! [`OrganSpec`]: metabolic_types::OrganSpec

#![deny(unsafe_code)]

pub mod engine;
pub mod envelope;
pub mod snapshot;

pub use engine::{EmergenceEngine, EmergenceProposal, EmergenceTick};
pub use envelope::{check_envelope, EnvelopeBreach};
pub use snapshot::{ache_trend, TriggerSnapshot};
