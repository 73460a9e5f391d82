//! # holographic-router
//!
//! Keeps a local, possibly stale view (the *hologram*) of peer health and
//! trust, meters each peer once per epoch, and picks next hops.
//!
//! ```text
//!   PeerFrame::Health ─┐  verify ─▶ fresh? ─▶ replay? ─▶ ledger ref? ─▶ latency ≥ 0?
//!   PeerFrame::Truth  ─┘                                                 │
//!                                                                        ▼
//!                                                                  HologramEntry
//!                                                                        │
//!   tick(epoch): ScoreOracle ─▶ delta ─▶ heal / truth / rot ─▶ ache ─▶ metabolic factor
//!                                                                        │
//!   select_next_hop: trust > threshold, coherence × factor > 0, headroom ─┘
//! ```
//!
//! The per-peer metabolic factor is
//! `clamp(1 + beta × (heal + truth − rot), m_min, m_max)` using the governed
//! values current in the mesh at tick time.

#![deny(unsafe_code)]

pub mod frames;
pub mod hologram;
pub mod oracle;
pub mod router;
pub mod signature;

pub use frames::{HealthFrame, NodeId, PeerFrame, RouteDecision, RouteRequest, TruthFrame};
pub use hologram::{HologramEntry, MetabolicBook};
pub use oracle::{ScoreOracle, ScoreTable};
pub use router::{DropReason, FrameDrop, HolographicRouter, IngestReport, MeteringTick};
pub use signature::{sign_frame, AcceptAllVerifier, DigestVerifier, SignatureVerifier};
