#![deny(unsafe_code)]
//! # metabolic-plane
//!
//! Wires the metabolic governor, the emergence engine (and its drift
//! governor) and the holographic router to one epoch clock and one parameter
//! mesh, and drives them as a single writer.
//!
//! ```text
//!                  advance_epoch()
//!                        │
//!   EpochClock ──────────┼──────────────────────────────┐
//!                        ▼                              │
//!              MetabolicGovernor.tick ──(MeshWriter)──▶ ParameterMesh
//!                        │                              │
//!                        ▼                              │
//!              EmergenceEngine.tick ──▶ DriftGovernor ◀─┤
//!                        │                              │
//!                        ▼                              │
//!              HolographicRouter.tick ◀─────────────────┘
//! ```
//!
//! [`PlaneHandle`] moves a [`ControlPlane`] into a tokio task so concurrent
//! callers share it through a mailbox. [`ScriptRunner`] replays JSON command
//! scripts, which is what the `metabolic-plane` binary does.

pub mod actor;
pub mod config;
pub mod error;
pub mod plane;
pub mod script;
pub mod telemetry;

pub use actor::PlaneHandle;
pub use config::{LogConfig, PlaneConfig};
pub use error::{ConfigError, PlaneError, PlaneResult};
pub use plane::{ControlPlane, PlaneStatus, PlaneTick};
pub use script::{parse_script, Command, ScriptRunner, Step, StepOutcome};
pub use telemetry::init_tracing;
