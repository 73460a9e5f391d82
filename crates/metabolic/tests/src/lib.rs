//! Shared fixtures for the cross-crate scenario and property suites.

use std::collections::BTreeMap;
use std::sync::Arc;

use holographic_router::{sign_frame, DigestVerifier, HealthFrame, NodeId, ScoreTable};
use metabolic_plane::{ControlPlane, PlaneConfig};
use metabolic_types::{
    EmergenceProposalFrame, EmergenceVoteFrame, Epoch, MetabolicParams, MetabolicVoteFrame,
    OrganSpec, ParamKey, ParamMap, ParameterMesh, ProposalId, RoutingConfig, WitnessId,
};

pub const RATIONALE: &str = "rationale-hash";

/// A plane over `mesh` starting at epoch 0, with its score table.
pub fn plane_with(mesh: ParameterMesh) -> (ControlPlane, Arc<ScoreTable>) {
    let scores = Arc::new(ScoreTable::new());
    let config = PlaneConfig {
        mesh,
        ..PlaneConfig::default()
    };
    let plane = ControlPlane::new(&config, scores.clone(), Arc::new(DigestVerifier));
    (plane, scores)
}

pub fn plane() -> (ControlPlane, Arc<ScoreTable>) {
    plane_with(ParameterMesh::default())
}

/// Defaults with `overrides` applied, as a complete parameter map.
pub fn full_params(overrides: &[(ParamKey, f64)]) -> ParamMap {
    overrides
        .iter()
        .fold(MetabolicParams::default(), |params, (key, value)| {
            params.with(*key, *value)
        })
        .to_map()
}

pub fn metabolic_vote(id: &str, params: &ParamMap, target: Epoch, witness: &str) -> MetabolicVoteFrame {
    MetabolicVoteFrame {
        proposal_id: ProposalId::new(id),
        params: params.clone(),
        target_epoch: target,
        rationale_hash: RATIONALE.into(),
        witness_id: WitnessId::new(witness),
        witness_epoch: 0,
        multisig: Vec::new(),
    }
}

/// Submit a metabolic proposal and cast `voters` distinct matching votes.
pub fn propose_with_votes(
    plane: &mut ControlPlane,
    id: &str,
    target: Epoch,
    params: &ParamMap,
    voters: usize,
) {
    plane
        .submit_metabolic(
            ProposalId::new(id),
            target,
            params.clone(),
            WitnessId::new("proposer"),
            RATIONALE,
        )
        .expect("submission accepted");
    for n in 0..voters {
        let vote = metabolic_vote(id, params, target, &format!("witness-{n}"));
        assert!(plane.vote_metabolic(&vote).is_counted());
    }
}

/// An organ whose parameters name no governed key.
pub fn organ(id: &str) -> OrganSpec {
    OrganSpec {
        organ_id: id.to_string(),
        organ_type: "buffer".to_string(),
        params: BTreeMap::from([("capacity".to_string(), 10.0)]),
        safety_envelope: BTreeMap::from([("max_capacity".to_string(), 100.0)]),
        ache_origin_context: BTreeMap::new(),
        justification_hash: format!("justify-{id}"),
    }
}

pub fn organ_proposal(id: &str, target: Epoch, organ: OrganSpec) -> EmergenceProposalFrame {
    EmergenceProposalFrame {
        proposal_id: ProposalId::new(id),
        target_epoch: target,
        organ,
        proposer_witness: WitnessId::new("proposer"),
        witness_epoch: 0,
        multisig: Vec::new(),
    }
}

/// Submit an organ proposal and cast `voters` distinct votes.
pub fn propose_organ(
    plane: &mut ControlPlane,
    id: &str,
    target: Epoch,
    organ: OrganSpec,
    voters: usize,
) {
    plane
        .submit_emergence(organ_proposal(id, target, organ))
        .expect("submission accepted");
    for n in 0..voters {
        let vote = EmergenceVoteFrame::new(id, format!("witness-{n}").as_str(), 0);
        assert!(plane.vote_emergence(&vote).is_counted());
    }
}

/// A correctly signed health frame carrying the default ledger reference.
pub fn health(node: &str, epoch: Epoch, scar_index: u32, coherence: f64) -> HealthFrame {
    let mut frame = HealthFrame {
        node_id: NodeId::new(node),
        epoch,
        scar_index,
        load_percent: 0.5,
        headroom_units: 5_000,
        latency_ms: 40,
        coherence,
        ledger_ref: RoutingConfig::default().canonical_ref,
        signature: String::new(),
    };
    frame.signature = sign_frame(&frame);
    frame
}
