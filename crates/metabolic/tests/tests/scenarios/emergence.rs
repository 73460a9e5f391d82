//! Emergence cooldown, plus the other admission gates through the
//! full plane.

use metabolic_emergence::EmergenceTick;
use metabolic_tests::*;
use metabolic_types::{AcheFrame, ParameterMesh, ProposalId, ProposalStatus};

/// Rising ache at epochs 6, 7 and 8, attested up front.
fn rising_ache(plane: &mut metabolic_plane::ControlPlane) {
    for (epoch, ache) in [(6, 0.2), (7, 0.5), (8, 0.8)] {
        assert!(plane.ingest_ache(&AcheFrame::new(epoch, ache, "witness-0")));
    }
}

fn status(plane: &metabolic_plane::ControlPlane, id: &str) -> ProposalStatus {
    plane
        .emergence()
        .proposal(&ProposalId::new(id))
        .unwrap()
        .status
}

#[test]
fn cooldown_rejects_follow_up_organ() {
    let mut mesh = ParameterMesh::default();
    mesh.emergence.cooldown_epochs = 2;
    let (mut plane, _) = plane_with(mesh);

    rising_ache(&mut plane);
    propose_organ(&mut plane, "organ-1", 7, organ("organ-1"), 3);
    propose_organ(&mut plane, "organ-2", 8, organ("organ-2"), 3);

    let tick = plane.advance_to(7);
    assert_eq!(tick.emergence.activated(), &[ProposalId::new("organ-1")]);
    assert_eq!(status(&plane, "organ-1"), ProposalStatus::Activated);
    assert_eq!(plane.emergence().last_emergence_epoch(), Some(7));

    let tick = plane.advance_epoch();
    assert!(tick.emergence.activated().is_empty());
    assert_eq!(tick.emergence.rejected(), &[ProposalId::new("organ-2")]);
    assert_eq!(status(&plane, "organ-2"), ProposalStatus::Rejected);

    let blocked: Vec<_> = plane
        .emergence()
        .audit_log()
        .of_kind("blocked_cooldown")
        .collect();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].epoch, 8);
    assert_eq!(plane.status().activated_organs, vec!["organ-1".to_string()]);
}

#[test]
fn flat_ache_blocks_emergence() {
    let (mut plane, _) = plane();
    for epoch in [2, 3] {
        plane.ingest_ache(&AcheFrame::new(epoch, 0.4, "witness-0"));
    }
    propose_organ(&mut plane, "organ-1", 3, organ("organ-1"), 3);

    let tick = plane.advance_to(3);
    assert_eq!(tick.emergence.rejected(), &[ProposalId::new("organ-1")]);
    assert!(plane
        .emergence()
        .audit_log()
        .contains_kind("blocked_ache_trend"));
}

#[test]
fn young_node_blocks_emergence() {
    let (mut plane, _) = plane();
    plane.ingest_ache(&AcheFrame::new(0, 0.1, "witness-0"));
    plane.ingest_ache(&AcheFrame::new(1, 0.9, "witness-0"));
    propose_organ(&mut plane, "organ-1", 1, organ("organ-1"), 3);

    let tick = plane.advance_epoch();
    assert_eq!(tick.emergence.rejected(), &[ProposalId::new("organ-1")]);
    assert!(plane.emergence().audit_log().contains_kind("blocked_uptime"));
}

#[test]
fn organ_outside_its_envelope_is_rejected() {
    let (mut plane, _) = plane();
    rising_ache(&mut plane);
    let mut oversized = organ("organ-1");
    oversized.params.insert("capacity".into(), 250.0);
    propose_organ(&mut plane, "organ-1", 7, oversized, 3);

    plane.advance_to(7);
    assert_eq!(status(&plane, "organ-1"), ProposalStatus::Rejected);
    assert!(plane
        .emergence()
        .audit_log()
        .contains_kind("envelope_violation"));
}

#[test]
fn governed_organ_params_pass_through_drift() {
    let (mut plane, _) = plane();
    // The drift gate keeps only the latest attestation, so stop at epoch 7.
    plane.ingest_ache(&AcheFrame::new(6, 0.2, "witness-0"));
    plane.ingest_ache(&AcheFrame::new(7, 0.9, "witness-0"));

    // 0.5 → 0.55 is within the scaled w_heal cap at ache 0.9.
    let mut gentle = organ("gentle");
    gentle.params.insert("w_heal".into(), 0.55);
    propose_organ(&mut plane, "gentle", 7, gentle, 3);
    // 0.5 → 0.9 is far beyond any cap.
    let mut abrupt = organ("abrupt");
    abrupt.params.insert("w_heal".into(), 0.9);
    propose_organ(&mut plane, "abrupt", 7, abrupt, 3);

    let tick = plane.advance_to(7);
    let EmergenceTick::Processed { activated, rejected } = tick.emergence else {
        panic!("epoch 7 processed once");
    };
    // Both created at epoch 0: "abrupt" is evaluated first and fails drift.
    assert_eq!(activated, vec![ProposalId::new("gentle")]);
    assert_eq!(rejected, vec![ProposalId::new("abrupt")]);
    assert!(plane
        .emergence()
        .audit_log()
        .contains_kind("drift_envelope_rejected"));
    assert!(plane
        .emergence()
        .drift()
        .audit_log()
        .contains_kind("drift_violation"));
}
