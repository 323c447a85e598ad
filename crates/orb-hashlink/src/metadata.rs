//! The hashlink metadata CBOR codec (§6 wire formats): "Metadata is a map
//! containing an ordered list `urls` of retrieval links." Spelled out here
//! as a concrete `serde`-derived struct since spec.md only describes it in
//! prose (SPEC_FULL.md "Supplemented features").

use orb_core::error::{OrbError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashlinkMetadata {
    pub urls: Vec<String>,
}

impl HashlinkMetadata {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    /// Encode as CBOR, then hex, matching the hex wire convention
    /// `orb_core::cas::format_multihash` already uses for the hash itself.
    pub fn encode(&self) -> Result<String> {
        let cbor = serde_cbor::to_vec(self)
            .map_err(|e| OrbError::integrity(format!("cbor encode failed: {e}")))?;
        Ok(hex::encode(cbor))
    }

    pub fn decode(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|_| OrbError::integrity(format!("bad metadata hex {s:?}")))?;
        serde_cbor::from_slice(&bytes)
            .map_err(|e| OrbError::integrity(format!("cbor decode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips() {
        let meta = HashlinkMetadata::new(vec!["https://a/cas/x".into(), "ipfs://bafy".into()]);
        let encoded = meta.encode().unwrap();
        let decoded = HashlinkMetadata::decode(&encoded).unwrap();
        assert_eq!(meta, decoded);
    }
}
