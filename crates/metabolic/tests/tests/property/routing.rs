//! Next-hop selection depends only on hologram contents, and metering keeps
//! every factor inside the governed bounds.

use holographic_router::{HealthFrame, NodeId, RouteRequest};
use metabolic_tests::*;
use proptest::prelude::*;

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

fn arb_peer(n: usize) -> impl Strategy<Value = HealthFrame> {
    (0u32..20, 0.0f64..1.0, 1.0f64..100.0, prop::bool::ANY).prop_map(
        move |(scar, load, coherence, near)| {
            // Snap half the peers onto a shared coherence to provoke ties.
            let coherence = if near { 50.0 } else { coherence };
            let mut frame = HealthFrame {
                load_percent: load,
                ..health(&format!("peer-{n}"), 0, scar, coherence)
            };
            frame.signature = holographic_router::sign_frame(&frame);
            frame
        },
    )
}

fn arb_hologram() -> impl Strategy<Value = Vec<HealthFrame>> {
    (1usize..6).prop_flat_map(|count| {
        (0..count).map(arb_peer).collect::<Vec<_>>()
    })
}

fn arb_scores() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-50.0f64..50.0, 5), 1..6)
}

fn winner(frames: Vec<HealthFrame>) -> Option<NodeId> {
    let (mut plane, _) = plane();
    let report = plane.ingest_frames(frames.into_iter().map(Into::into));
    assert!(report.dropped.is_empty());
    plane.route(&RouteRequest::new("tx", 10)).map(|d| d.next_hop)
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

proptest! {
    #[test]
    fn winner_ignores_arrival_order(
        (frames, shuffled) in arb_hologram().prop_flat_map(|frames| {
            let shuffled = Just(frames.clone()).prop_shuffle();
            (Just(frames), shuffled)
        })
    ) {
        prop_assert_eq!(winner(frames), winner(shuffled));
    }

    #[test]
    fn factor_stays_within_governed_bounds(rounds in arb_scores(), violations in 0u32..4) {
        let (mut plane, scores) = plane();
        let frames = (0..5).map(|n| health(&format!("peer-{n}"), 0, n, 50.0).into());
        plane.ingest_frames(frames);

        for round in rounds {
            for (n, score) in round.iter().enumerate() {
                scores.set(NodeId::new(format!("peer-{n}")), *score);
            }
            plane.report_violation(&NodeId::new("peer-0"), "spam", violations);
            plane.advance_epoch();

            let params = plane.params();
            for entry in plane.router().peers() {
                let factor = entry.book.metabolic_factor;
                prop_assert!(factor >= params.m_min && factor <= params.m_max, "{factor}");
            }
        }
    }
}
