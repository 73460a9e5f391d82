//! Drift is frozen without a fresh ache attestation.

use std::sync::Arc;

use metabolic_drift::{DriftGate, DriftGovernor};
use metabolic_types::{
    AcheFrame, EpochClock, MeshReader, MetabolicParams, ParamKey, ParamMap, ParameterMesh,
};

fn governor(start: u64) -> (DriftGovernor, Arc<EpochClock>) {
    let clock = Arc::new(EpochClock::new(start));
    let governor = DriftGovernor::new(clock.clone(), MeshReader::fixed(ParameterMesh::default()));
    (governor, clock)
}

fn nudged(key: ParamKey, delta: f64) -> ParamMap {
    let params = MetabolicParams::default();
    params.with(key, params.get(key) + delta).to_map()
}

#[test]
fn no_ache_blocks_any_change() {
    let (mut drift, _) = governor(10);
    for key in ParamKey::ALL {
        assert!(!drift.validate(&nudged(key, 1e-4), 10));
    }
    assert!(drift.audit_log().contains_kind("drift_blocked_no_ache"));
    assert!(!drift.audit_log().contains_kind("drift_accepted"));
}

#[test]
fn stale_ache_does_not_unlock_drift() {
    let (mut drift, clock) = governor(10);
    assert!(drift.ingest_ache(&AcheFrame::new(10, 1.0, "w1")));
    assert!(drift.validate(&nudged(ParamKey::WHeal, 0.05), 10));

    clock.advance();
    assert_eq!(drift.drift_factor(11), 0.0);
    assert!(!drift.validate(&nudged(ParamKey::WHeal, 0.05), 11));

    // A frame for an epoch already passed is refused outright.
    assert!(!drift.ingest_ache(&AcheFrame::new(10, 1.0, "w1")));
}

#[test]
fn unchanged_values_pass_even_when_frozen() {
    let (mut drift, _) = governor(3);
    assert!(drift.validate(&MetabolicParams::default().to_map(), 3));
    assert!(drift.validate(&nudged(ParamKey::Beta, 5e-10), 3));
}

#[test]
fn caps_scale_with_ache() {
    let (mut drift, _) = governor(0);
    drift.ingest_ache(&AcheFrame::new(0, 0.55, "w1"));
    // normalized 0.5 → factor 0.5^1.5 ≈ 0.354 → beta may move ≈ 0.00707.
    assert!(drift.validate(&nudged(ParamKey::Beta, 0.007), 0));
    assert!(!drift.validate(&nudged(ParamKey::Beta, 0.0075), 0));
    assert!(drift.audit_log().contains_kind("drift_violation"));
}
