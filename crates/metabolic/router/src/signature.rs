//! Frame authenticity checks.
//!
//! The router only asks "is this signature valid for this node and payload";
//! key management is the caller's problem.

use crate::frames::{HealthFrame, NodeId};

/// Opaque authenticity predicate over (signer, payload, signature).
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, node: &NodeId, payload: &[u8], signature: &str) -> bool;
}

/// Accepts everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl SignatureVerifier for AcceptAllVerifier {
    fn verify(&self, _node: &NodeId, _payload: &[u8], _signature: &str) -> bool {
        true
    }
}

/// Checks that the signature is the BLAKE3 digest of the signed payload.
/// Proves integrity only, not identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct DigestVerifier;

const DIGEST_PREFIX: &str = "blake3:";

fn digest_signature(payload: &[u8]) -> String {
    format!("{DIGEST_PREFIX}{}", blake3::hash(payload).to_hex())
}

impl SignatureVerifier for DigestVerifier {
    fn verify(&self, _node: &NodeId, payload: &[u8], signature: &str) -> bool {
        signature == digest_signature(payload)
    }
}

/// Produce the signature [`DigestVerifier`] expects for `frame`.
pub fn sign_frame(frame: &HealthFrame) -> String {
    digest_signature(&frame.signed_payload())
}
