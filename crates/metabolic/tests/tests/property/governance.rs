//! Competing proposals resolve the same way whatever order votes arrive in.

use metabolic_governance::GovernanceTick;
use metabolic_tests::*;
use metabolic_types::{ParamKey, ProposalId, WitnessId};
use proptest::prelude::*;

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

fn arb_ids() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,6}", "[a-z]{1,6}").prop_filter("distinct ids", |(a, b)| a != b)
}

/// Three votes each for two proposals, as (proposal index, witness) pairs
/// in a random arrival order.
fn arb_arrivals() -> impl Strategy<Value = Vec<(usize, usize)>> {
    let votes: Vec<(usize, usize)> = (0..2).flat_map(|p| (0..3).map(move |w| (p, w))).collect();
    Just(votes).prop_shuffle()
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

proptest! {
    #[test]
    fn lowest_id_wins_regardless_of_vote_order(
        (first, second) in arb_ids(),
        arrivals in arb_arrivals(),
        target in 1u64..5,
    ) {
        let (mut plane, _) = plane();
        let ids = [first, second];
        let params = [
            full_params(&[(ParamKey::WHeal, 0.7)]),
            full_params(&[(ParamKey::WHeal, 0.3)]),
        ];
        for (id, params) in ids.iter().zip(&params) {
            plane
                .submit_metabolic(
                    ProposalId::new(id.as_str()),
                    target,
                    params.clone(),
                    WitnessId::new("proposer"),
                    RATIONALE,
                )
                .unwrap();
        }
        for (p, w) in arrivals {
            let vote = metabolic_vote(&ids[p], &params[p], target, &format!("witness-{w}"));
            prop_assert!(plane.vote_metabolic(&vote).is_counted());
        }

        let tick = plane.advance_to(target);
        let winner = if ids[0] < ids[1] { 0 } else { 1 };
        prop_assert_eq!(
            tick.governance,
            GovernanceTick::Activated(ProposalId::new(ids[winner].as_str()))
        );
        prop_assert_eq!(plane.params().w_heal, params[winner][&ParamKey::WHeal]);
    }
}
