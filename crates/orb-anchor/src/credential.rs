//! The anchor credential (§3): "opaque JSON-LD document containing payload
//! + one or more detached signatures (issuer + witnesses)". Kept opaque at
//! the proof layer — proofs are passed through as JSON values rather than
//! parsed, since the signature suite is out of scope here (§9 notes the
//! deep VC-Data-Integrity canonicalization rules are implemented elsewhere).

use crate::payload::AnchorPayload;
use orb_core::error::{OrbError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnchorCredential {
    pub payload: AnchorPayload,
    #[serde(default)]
    pub proofs: Vec<serde_json::Value>,
}

impl AnchorCredential {
    pub fn new(payload: AnchorPayload) -> Self {
        Self {
            payload,
            proofs: Vec::new(),
        }
    }

    pub fn is_sealed(&self) -> bool {
        !self.proofs.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| OrbError::integrity(format!("encode anchor credential: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| OrbError::integrity(format!("decode anchor credential: {e}")))
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| OrbError::integrity(format!("decode anchor credential: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn round_trips_through_bytes() {
        let credential = AnchorCredential::new(AnchorPayload {
            namespace: "did:orb".into(),
            protocol_version: 1,
            core_index_hash: "hl:abc".into(),
            operation_count: 3,
            previous_anchors: BTreeMap::new(),
        });
        assert!(!credential.is_sealed());
        let bytes = credential.to_bytes().unwrap();
        let parsed = AnchorCredential::from_bytes(&bytes).unwrap();
        assert_eq!(credential, parsed);
    }
}
