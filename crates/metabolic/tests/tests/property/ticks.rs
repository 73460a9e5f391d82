//! Ticking an already-processed epoch is a no-op across the whole plane.

use holographic_router::MeteringTick;
use metabolic_emergence::EmergenceTick;
use metabolic_governance::GovernanceTick;
use metabolic_tests::*;
use metabolic_types::{AcheFrame, ParamKey};
use proptest::prelude::*;

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

fn arb_beta() -> impl Strategy<Value = f64> {
    0.01f64..0.5
}

fn arb_ache() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1.0, 1..5)
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

proptest! {
    #[test]
    fn second_tick_changes_nothing(
        beta in arb_beta(),
        ache in arb_ache(),
        target in 1u64..4,
        peers in 1usize..4,
    ) {
        let (mut plane, _) = plane();
        for (epoch, value) in ache.iter().enumerate() {
            plane.ingest_ache(&AcheFrame::new(epoch as u64, *value, "witness-0"));
        }
        let frames = (0..peers).map(|n| health(&format!("peer-{n}"), 0, n as u32, 50.0).into());
        plane.ingest_frames(frames);
        propose_with_votes(&mut plane, "P1", target, &full_params(&[(ParamKey::Beta, beta)]), 3);
        propose_organ(&mut plane, "organ-1", target, organ("organ-1"), 3);

        plane.advance_to(target);
        let status = plane.status();
        let trail = plane.audit_trail().len();

        let again = plane.tick(target);
        prop_assert_eq!(again.governance, GovernanceTick::AlreadyProcessed);
        prop_assert_eq!(again.emergence, EmergenceTick::AlreadyProcessed);
        prop_assert_eq!(again.metering, MeteringTick::AlreadyProcessed);

        let earlier = plane.tick(target - 1);
        prop_assert_eq!(earlier.governance, GovernanceTick::AlreadyProcessed);

        prop_assert_eq!(plane.status(), status);
        prop_assert_eq!(plane.audit_trail().len(), trail);
    }
}
