//! Metabolic activation and the static safety envelope.

use metabolic_governance::GovernanceTick;
use metabolic_tests::*;
use metabolic_types::{MetabolicParams, ParamKey, ProposalId, ProposalStatus};

#[test]
fn quorum_activates_at_target() {
    let (mut plane, _) = plane();
    let params = full_params(&[(ParamKey::WHeal, 0.6)]);
    propose_with_votes(&mut plane, "P1", 3, &params, 3);

    for _ in 1..3 {
        assert_eq!(plane.advance_epoch().governance, GovernanceTick::NoCandidates);
        assert_eq!(plane.params().w_heal, 0.5);
    }

    let tick = plane.advance_epoch();
    assert_eq!(tick.epoch, 3);
    assert_eq!(tick.governance, GovernanceTick::Activated(ProposalId::new("P1")));
    assert_eq!(plane.params().w_heal, 0.6);
    assert_eq!(
        plane.governor().proposal(&ProposalId::new("P1")).unwrap().status,
        ProposalStatus::Activated
    );

    let trail = plane.audit_trail();
    assert!(trail
        .iter()
        .any(|(source, r)| source == "governor" && r.event.kind() == "proposal_activated"));
}

#[test]
fn unsafe_winner_is_superseded() {
    let (mut plane, _) = plane();
    let params = full_params(&[(ParamKey::Beta, 1.5)]);
    propose_with_votes(&mut plane, "P1", 3, &params, 3);

    let tick = plane.advance_to(3);
    assert_eq!(tick.governance, GovernanceTick::SafetyRejected(ProposalId::new("P1")));
    assert_eq!(plane.params(), MetabolicParams::default());
    assert_eq!(
        plane.governor().proposal(&ProposalId::new("P1")).unwrap().status,
        ProposalStatus::Superseded
    );
    assert!(plane
        .governor()
        .audit_log()
        .contains_kind("safety_violation"));
}

#[test]
fn below_quorum_never_activates() {
    let (mut plane, _) = plane();
    let params = full_params(&[(ParamKey::WRot, 2.0)]);
    propose_with_votes(&mut plane, "P1", 2, &params, 2);

    assert_eq!(plane.advance_to(2).governance, GovernanceTick::NoCandidates);
    assert_eq!(plane.params().w_rot, 1.0);
    assert!(plane
        .governor()
        .proposal(&ProposalId::new("P1"))
        .unwrap()
        .status
        .is_pending());

    // Late votes cannot resurrect a passed target epoch.
    let vote = metabolic_vote("P1", &params, 2, "witness-9");
    assert!(plane.vote_metabolic(&vote).is_counted());
    plane.advance_epoch();
    assert_eq!(plane.params().w_rot, 1.0);
    assert_eq!(plane.prune_stale(0), vec![ProposalId::new("P1")]);
}

#[test]
fn same_epoch_contest_is_deterministic() {
    let (mut plane, _) = plane();
    let loser = full_params(&[(ParamKey::WTruth, 0.4)]);
    let winner = full_params(&[(ParamKey::WTruth, 0.3)]);
    // Both created at epoch 0: the lower id wins.
    propose_with_votes(&mut plane, "b-proposal", 2, &loser, 3);
    propose_with_votes(&mut plane, "a-proposal", 2, &winner, 3);

    let tick = plane.advance_to(2);
    assert_eq!(
        tick.governance,
        GovernanceTick::Activated(ProposalId::new("a-proposal"))
    );
    assert_eq!(plane.params().w_truth, 0.3);
    assert_eq!(
        plane
            .governor()
            .proposal(&ProposalId::new("b-proposal"))
            .unwrap()
            .status,
        ProposalStatus::Superseded
    );
}

#[test]
fn mismatched_votes_do_not_count() {
    let (mut plane, _) = plane();
    let params = full_params(&[(ParamKey::MMax, 1.6)]);
    propose_with_votes(&mut plane, "P1", 1, &params, 2);

    let mut forged = metabolic_vote("P1", &params, 1, "witness-x");
    forged.rationale_hash = "other".into();
    assert!(!plane.vote_metabolic(&forged).is_counted());

    assert_eq!(plane.advance_epoch().governance, GovernanceTick::NoCandidates);
    assert_eq!(plane.params().m_max, 1.5);
}
