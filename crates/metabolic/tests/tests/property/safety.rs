//! A proposal failing the safety check never touches the mesh, however many
//! votes it gathers.

use metabolic_governance::GovernanceTick;
use metabolic_tests::*;
use metabolic_types::{MetabolicParams, ParamKey, ProposalId};
use proptest::prelude::*;

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

/// One governed value pushed outside its default bounds.
fn arb_violation() -> impl Strategy<Value = (ParamKey, f64)> {
    prop_oneof![
        (-1.0f64..=0.0).prop_map(|v| (ParamKey::Beta, v)),
        (1.0001f64..50.0).prop_map(|v| (ParamKey::Beta, v)),
        (10.0001f64..100.0).prop_map(|v| (ParamKey::WHeal, v)),
        (-10.0f64..-0.0001).prop_map(|v| (ParamKey::WTruth, v)),
        (10.0001f64..100.0).prop_map(|v| (ParamKey::WRot, v)),
        (1.0001f64..2.0).prop_map(|v| (ParamKey::MMin, v)),
        (3.0001f64..20.0).prop_map(|v| (ParamKey::MMax, v)),
    ]
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

proptest! {
    #[test]
    fn unsafe_winner_leaves_mesh_untouched(
        (key, value) in arb_violation(),
        voters in 3usize..8,
    ) {
        let (mut plane, _) = plane();
        let before = plane.params();
        propose_with_votes(&mut plane, "P1", 1, &full_params(&[(key, value)]), voters);

        let tick = plane.advance_epoch();
        prop_assert_eq!(tick.governance, GovernanceTick::SafetyRejected(ProposalId::new("P1")));
        prop_assert_eq!(plane.params(), before);
        prop_assert_eq!(plane.params(), MetabolicParams::default());
        prop_assert!(plane.governor().audit_log().contains_kind("safety_violation"));
    }

    #[test]
    fn unsafe_winner_blocks_safe_loser(
        (key, value) in arb_violation(),
        beta in 0.01f64..1.0,
    ) {
        let (mut plane, _) = plane();
        // Same epoch, "A" sorts first and outranks "B".
        propose_with_votes(&mut plane, "A", 1, &full_params(&[(key, value)]), 4);
        propose_with_votes(&mut plane, "B", 1, &full_params(&[(ParamKey::Beta, beta)]), 3);

        plane.advance_epoch();
        prop_assert_eq!(plane.params(), MetabolicParams::default());
    }
}
