//! Near-tie routing, plus metering driven by governed values.

use holographic_router::{DropReason, HealthFrame, NodeId, RouteRequest, TruthFrame};
use metabolic_governance::GovernanceTick;
use metabolic_tests::*;
use metabolic_types::{ParamKey, ProposalId};

#[test]
fn near_tie_prefers_lower_scar() {
    let (mut plane, _) = plane();
    let report = plane.ingest_frames([
        health("scarred", 0, 12, 90.0).into(),
        health("clean", 0, 2, 90.0 + 5e-7).into(),
    ]);
    assert_eq!(report.accepted, 2);

    let decision = plane.route(&RouteRequest::new("tx-1", 100)).unwrap();
    assert_eq!(decision.next_hop, NodeId::new("clean"));

    // Outside epsilon the higher score wins regardless of scar.
    let (mut spread, _) = metabolic_tests::plane();
    spread.ingest_frames([
        health("scarred", 0, 12, 91.0).into(),
        health("clean", 0, 2, 90.0).into(),
    ]);
    let decision = spread.route(&RouteRequest::new("tx-2", 100)).unwrap();
    assert_eq!(decision.next_hop, NodeId::new("scarred"));
}

#[test]
fn governed_weights_change_routing() {
    let (mut plane, scores) = plane();
    plane.ingest_frames([
        health("healer", 0, 20, 100.0).into(),
        health("steady", 0, 5, 104.0).into(),
    ]);
    scores.set(NodeId::new("healer"), 20.0);
    scores.set(NodeId::new("steady"), 5.0);

    // Epoch 1: no healing yet, the higher coherence wins.
    plane.advance_epoch();
    assert_eq!(
        plane.route(&RouteRequest::new("tx", 1)).unwrap().next_hop,
        NodeId::new("steady")
    );

    // Double w_heal from epoch 2, then let "healer" heal by 2 points.
    let params = full_params(&[(ParamKey::WHeal, 1.0)]);
    propose_with_votes(&mut plane, "P1", 2, &params, 3);
    scores.set(NodeId::new("healer"), 18.0);
    let tick = plane.advance_epoch();
    assert_eq!(tick.governance, GovernanceTick::Activated(ProposalId::new("P1")));

    // heal 2 × 1.0 at beta 0.05 → factor 1.1 → 110 > 104.
    let entry = plane.router().entry(&NodeId::new("healer")).unwrap();
    assert!((entry.book.metabolic_factor - 1.1).abs() < 1e-12);
    assert_eq!(
        plane.route(&RouteRequest::new("tx", 1)).unwrap().next_hop,
        NodeId::new("healer")
    );
}

#[test]
fn hostile_frames_are_contained() {
    let (mut plane, _) = plane();
    plane.ingest_frames([health("peer", 0, 3, 50.0).into()]);

    let replay = health("peer", 0, 3, 50.0);
    let foreign = HealthFrame {
        ledger_ref: "0xFORK".into(),
        ..health("peer", 0, 1, 500.0)
    };
    let mut tampered = health("peer", 0, 0, 50.0);
    tampered.coherence = 5_000.0;

    let report = plane.ingest_frames([replay.into(), foreign.into(), tampered.into()]);
    assert_eq!(report.accepted, 0);
    assert_eq!(report.dropped_for(DropReason::Replayed), 1);
    assert_eq!(report.dropped_for(DropReason::BadSignature), 2);

    let entry = plane.router().entry(&NodeId::new("peer")).unwrap();
    assert_eq!(entry.snapshot.coherence, 50.0);
    assert_eq!(entry.trust, 1.0);
}

#[test]
fn truth_restores_trust() {
    let (mut plane, _) = plane();
    let hot = |n: u64| HealthFrame {
        load_percent: 1.4,
        headroom_units: 1_000 + n,
        ..health("peer", 0, 3, 50.0)
    };
    for n in 0..8 {
        let mut frame = hot(n);
        frame.signature = holographic_router::sign_frame(&frame);
        plane.ingest_frames([frame.into()]);
    }
    assert!(plane.route(&RouteRequest::new("tx", 1)).is_none());

    plane
        .ingest_truth(TruthFrame {
            health: health("peer", 0, 3, 50.0),
            witness_multisig: vec!["w1".into(), "w2".into()],
            witness_epoch: 0,
        })
        .unwrap();
    assert_eq!(
        plane.route(&RouteRequest::new("tx", 1)).unwrap().next_hop,
        NodeId::new("peer")
    );
}
