//! Append-only, epoch-stamped audit log.
//!
//! Every governance decision is recorded as a typed [`AuditEvent`] so tests
//! and operators can match on the variant. Records carry the epoch they were
//! decided in and a per-log sequence number; there are no wall-clock stamps.
//! Records may additionally be forwarded to [`AuditSink`]s.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::epoch::Epoch;
use crate::frames::{ProposalId, WitnessId};
use crate::params::{MetabolicParams, ParamKey, ParamMap};

// ── Event Payloads ──────────────────────────────────────────────────────

/// The first static bound a metabolic proposal broke.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafetyViolation {
    pub key: ParamKey,
    /// `None` when the key was missing from the proposal.
    pub value: Option<f64>,
    pub reason: String,
}

impl fmt::Display for SafetyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

/// Why a proposal was superseded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersedeReason {
    /// Another candidate for the same epoch ranked first.
    OutrankedBy(ProposalId),
    /// Won its epoch but failed the static safety check.
    FailedSafety,
}

/// One governed key that exceeded its ache-scaled drift window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftBreach {
    pub key: ParamKey,
    pub current: f64,
    pub proposed: f64,
    pub delta: f64,
    pub allowed: f64,
    pub cap: f64,
    pub drift_factor: f64,
}

/// Which side of an organ's safety envelope was crossed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeBound {
    Min(f64),
    Max(f64),
}

// ── Events ──────────────────────────────────────────────────────────────

/// A governance decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    ProposalSubmitted {
        proposal_id: ProposalId,
        target_epoch: Epoch,
        proposer: WitnessId,
    },
    VoteCounted {
        proposal_id: ProposalId,
        witness_id: WitnessId,
        votes: usize,
    },
    ProposalSuperseded {
        proposal_id: ProposalId,
        reason: SupersedeReason,
    },
    SafetyViolation {
        proposal_id: ProposalId,
        violation: SafetyViolation,
    },
    ProposalActivated {
        proposal_id: ProposalId,
        applied: MetabolicParams,
    },
    ProposalPruned {
        proposal_id: ProposalId,
        target_epoch: Epoch,
    },
    AcheRecorded {
        ache_index: f64,
        witness_id: WitnessId,
    },
    DriftAccepted {
        drift_factor: f64,
        changed: ParamMap,
    },
    DriftBlockedNoAche {
        key: ParamKey,
        current: f64,
        proposed: f64,
    },
    DriftViolation {
        breaches: Vec<DriftBreach>,
    },
    BlockedUptime {
        proposal_id: ProposalId,
        uptime_epochs: u64,
        required: u64,
    },
    BlockedCooldown {
        proposal_id: ProposalId,
        cooldown_remaining: u64,
    },
    BlockedAcheTrend {
        proposal_id: ProposalId,
        ache_trend: f64,
        threshold: f64,
    },
    EnvelopeViolation {
        proposal_id: ProposalId,
        param: String,
        value: f64,
        bound: EnvelopeBound,
    },
    DriftEnvelopeRejected {
        proposal_id: ProposalId,
    },
    OrganActivated {
        proposal_id: ProposalId,
        organ_id: String,
        organ_type: String,
    },
    ProposalRejected {
        proposal_id: ProposalId,
    },
}

impl AuditEvent {
    /// Stable snake_case name, identical to the serialized `event` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProposalSubmitted { .. } => "proposal_submitted",
            Self::VoteCounted { .. } => "vote_counted",
            Self::ProposalSuperseded { .. } => "proposal_superseded",
            Self::SafetyViolation { .. } => "safety_violation",
            Self::ProposalActivated { .. } => "proposal_activated",
            Self::ProposalPruned { .. } => "proposal_pruned",
            Self::AcheRecorded { .. } => "ache_recorded",
            Self::DriftAccepted { .. } => "drift_accepted",
            Self::DriftBlockedNoAche { .. } => "drift_blocked_no_ache",
            Self::DriftViolation { .. } => "drift_violation",
            Self::BlockedUptime { .. } => "blocked_uptime",
            Self::BlockedCooldown { .. } => "blocked_cooldown",
            Self::BlockedAcheTrend { .. } => "blocked_ache_trend",
            Self::EnvelopeViolation { .. } => "envelope_violation",
            Self::DriftEnvelopeRejected { .. } => "drift_envelope_rejected",
            Self::OrganActivated { .. } => "organ_activated",
            Self::ProposalRejected { .. } => "proposal_rejected",
        }
    }

    /// The proposal this event concerns, if any.
    pub fn proposal_id(&self) -> Option<&ProposalId> {
        match self {
            Self::ProposalSubmitted { proposal_id, .. }
            | Self::VoteCounted { proposal_id, .. }
            | Self::ProposalSuperseded { proposal_id, .. }
            | Self::SafetyViolation { proposal_id, .. }
            | Self::ProposalActivated { proposal_id, .. }
            | Self::ProposalPruned { proposal_id, .. }
            | Self::BlockedUptime { proposal_id, .. }
            | Self::BlockedCooldown { proposal_id, .. }
            | Self::BlockedAcheTrend { proposal_id, .. }
            | Self::EnvelopeViolation { proposal_id, .. }
            | Self::DriftEnvelopeRejected { proposal_id, .. }
            | Self::OrganActivated { proposal_id, .. }
            | Self::ProposalRejected { proposal_id, .. } => Some(proposal_id),
            Self::AcheRecorded { .. }
            | Self::DriftAccepted { .. }
            | Self::DriftBlockedNoAche { .. }
            | Self::DriftViolation { .. } => None,
        }
    }
}

/// An immutable log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the originating log, starting at 0.
    pub seq: u64,
    pub epoch: Epoch,
    #[serde(flatten)]
    pub event: AuditEvent,
}

// ── Sinks ───────────────────────────────────────────────────────────────

/// Receives a copy of every appended record.
pub trait AuditSink: Send + Sync {
    fn record(&self, source: &str, record: &AuditRecord);
}

/// Collects records in memory; mostly for tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<(String, AuditRecord)>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(String, AuditRecord)> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, source: &str, record: &AuditRecord) {
        self.records.write().push((source.to_string(), record.clone()));
    }
}

#[derive(Serialize)]
struct SourcedRecord<'a> {
    source: &'a str,
    #[serde(flatten)]
    record: &'a AuditRecord,
}

/// Writes one JSON object per record, newline-terminated.
pub struct JsonLinesAuditSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesAuditSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> AuditSink for JsonLinesAuditSink<W> {
    fn record(&self, source: &str, record: &AuditRecord) {
        let mut writer = self.writer.lock();
        let line = SourcedRecord { source, record };
        let result = serde_json::to_writer(&mut *writer, &line)
            .map_err(std::io::Error::from)
            .and_then(|_| writer.write_all(b"\n"));
        if let Err(e) = result {
            warn!(source, seq = record.seq, error = %e, "Failed to write audit record");
        }
    }
}

// ── Log ─────────────────────────────────────────────────────────────────

/// Append-only audit log owned by one component.
pub struct AuditLog {
    source: &'static str,
    records: Vec<AuditRecord>,
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl AuditLog {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            records: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Forward every future record to `sink`.
    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn append(&mut self, epoch: Epoch, event: AuditEvent) -> &AuditRecord {
        let record = AuditRecord {
            seq: self.records.len() as u64,
            epoch,
            event,
        };
        debug!(
            target: "metabolic::audit",
            source = self.source,
            seq = record.seq,
            epoch,
            event = record.event.kind(),
            "Audit record appended"
        );
        for sink in &self.sinks {
            sink.record(self.source, &record);
        }
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&AuditRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose event has the given [`AuditEvent::kind`].
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a AuditRecord> + 'a {
        self.records.iter().filter(move |r| r.event.kind() == kind)
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.records.iter().any(|r| r.event.kind() == kind)
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("source", &self.source)
            .field("records", &self.records.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
