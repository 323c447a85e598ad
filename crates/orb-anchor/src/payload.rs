//! The anchor payload (§3 "Anchor payload"): the Sidetree-facing summary of
//! a batch — namespace, protocol version, core-index hash, operation count,
//! and the per-suffix chain pointer `previous_anchors[suffix]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnchorPayload {
    pub namespace: String,
    pub protocol_version: u32,
    pub core_index_hash: String,
    pub operation_count: u32,
    /// `previous_anchors[suffix]` is either an earlier anchor's hashlink or
    /// the empty string when this is the suffix's create operation (§3
    /// invariant 2).
    #[serde(default)]
    pub previous_anchors: BTreeMap<String, String>,
}

impl AnchorPayload {
    pub fn is_create(&self, suffix: &str) -> bool {
        match self.previous_anchors.get(suffix) {
            None => true,
            Some(previous) => previous.is_empty(),
        }
    }

    pub fn previous_anchor(&self, suffix: &str) -> Option<&str> {
        self.previous_anchors
            .get(suffix)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_previous_anchor_both_count_as_create() {
        let mut payload = AnchorPayload {
            namespace: "did:orb".into(),
            protocol_version: 1,
            core_index_hash: "hl:abc".into(),
            operation_count: 1,
            previous_anchors: BTreeMap::new(),
        };
        assert!(payload.is_create("suffix-a"));

        payload
            .previous_anchors
            .insert("suffix-a".to_string(), String::new());
        assert!(payload.is_create("suffix-a"));

        payload
            .previous_anchors
            .insert("suffix-a".to_string(), "hl:previous".to_string());
        assert!(!payload.is_create("suffix-a"));
        assert_eq!(payload.previous_anchor("suffix-a"), Some("hl:previous"));
    }
}
