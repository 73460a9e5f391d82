//! Drift governor: validates proposed parameter deltas against the
//! ache-scaled envelope.

use std::sync::Arc;

use metabolic_types::{
    AcheFrame, AuditEvent, AuditLog, AuditSink, DriftBreach, Epoch, EpochSource, MeshReader,
    ParamMap,
};
use tracing::{debug, warn};

use crate::curve::{drift_curve, DRIFT_TOLERANCE};

// ── Drift Gate ──────────────────────────────────────────────────────────

/// Admission check consulted by the emergence engine.
pub trait DriftGate: Send {
    /// Record a witnessed ache reading. Returns whether it was kept.
    fn ingest_ache(&mut self, frame: &AcheFrame) -> bool;

    /// Drift factor in `[0, 1]` for `epoch`.
    fn drift_factor(&self, epoch: Epoch) -> f64;

    /// Whether every governed key in `proposed` fits its window for `epoch`.
    fn validate(&mut self, proposed: &ParamMap, epoch: Epoch) -> bool;
}

// ── Drift Governor ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
struct AcheReading {
    epoch: Epoch,
    index: f64,
}

/// Holds the most recent current-or-future ache reading and judges drift
/// against the governed values in the shared mesh.
pub struct DriftGovernor {
    epochs: Arc<dyn EpochSource>,
    mesh: MeshReader,
    ache: Option<AcheReading>,
    log: AuditLog,
}

impl DriftGovernor {
    pub fn new(epochs: Arc<dyn EpochSource>, mesh: MeshReader) -> Self {
        Self {
            epochs,
            mesh,
            ache: None,
            log: AuditLog::new("drift"),
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.log.add_sink(sink);
        self
    }

    /// The stored ache reading as `(epoch, clamped index)`.
    pub fn ache_reading(&self) -> Option<(Epoch, f64)> {
        self.ache.map(|r| (r.epoch, r.index))
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.log
    }
}

impl DriftGate for DriftGovernor {
    fn ingest_ache(&mut self, frame: &AcheFrame) -> bool {
        let current = self.epochs.current_epoch();
        if frame.epoch < current {
            debug!(
                frame_epoch = frame.epoch,
                current, "Dropping stale ache frame"
            );
            return false;
        }

        let index = frame.clamped_index();
        self.ache = Some(AcheReading {
            epoch: frame.epoch,
            index,
        });
        self.log.append(
            frame.epoch,
            AuditEvent::AcheRecorded {
                ache_index: index,
                witness_id: frame.witness_id.clone(),
            },
        );
        true
    }

    fn drift_factor(&self, epoch: Epoch) -> f64 {
        match self.ache {
            Some(reading) if reading.epoch == epoch => {
                self.mesh.read(|mesh| drift_curve(reading.index, &mesh.drift))
            }
            _ => 0.0,
        }
    }

    fn validate(&mut self, proposed: &ParamMap, epoch: Epoch) -> bool {
        let factor = self.drift_factor(epoch);
        let mesh = self.mesh.snapshot();

        if factor == 0.0 {
            let frozen = proposed.iter().find(|(key, proposed)| {
                (**proposed - mesh.metabolic.get(**key)).abs() > DRIFT_TOLERANCE
            });
            if let Some((key, value)) = frozen {
                let current = mesh.metabolic.get(*key);
                warn!(
                    epoch,
                    param = %key,
                    current,
                    proposed = *value,
                    "Drift frozen without ache for this epoch"
                );
                self.log.append(
                    epoch,
                    AuditEvent::DriftBlockedNoAche {
                        key: *key,
                        current,
                        proposed: *value,
                    },
                );
                return false;
            }
            self.log.append(
                epoch,
                AuditEvent::DriftAccepted {
                    drift_factor: 0.0,
                    changed: ParamMap::new(),
                },
            );
            return true;
        }

        let mut breaches = Vec::new();
        let mut changed = ParamMap::new();
        for (key, value) in proposed {
            let current = mesh.metabolic.get(*key);
            let delta = *value - current;
            let cap = mesh.drift.caps.cap(*key);
            let allowed = cap * factor;
            if delta.abs() > allowed + DRIFT_TOLERANCE {
                breaches.push(DriftBreach {
                    key: *key,
                    current,
                    proposed: *value,
                    delta,
                    allowed,
                    cap,
                    drift_factor: factor,
                });
            } else if delta.abs() > DRIFT_TOLERANCE {
                changed.insert(*key, *value);
            }
        }

        if !breaches.is_empty() {
            warn!(
                epoch,
                drift_factor = factor,
                breaches = breaches.len(),
                "Proposed drift exceeds ache-scaled caps"
            );
            self.log
                .append(epoch, AuditEvent::DriftViolation { breaches });
            return false;
        }

        self.log.append(
            epoch,
            AuditEvent::DriftAccepted {
                drift_factor: factor,
                changed,
            },
        );
        true
    }
}
