//! The CAS storage engine and IPFS reader collaborators (§6), plus the
//! multihash helper the whole pipeline hashes against.
//!
//! The trait shape follows the teacher's `StorageBackend`
//! (`shared/crates/storage/src/lib.rs`) narrowed to the two operations §6
//! names; the content-hash discipline (no domain prefix, dedupe on bytes)
//! mirrors `echo-cas`'s `BlobStore`/`blob_hash` in the example pack's
//! `other_examples` (`flyingrobots-echo`), used here to supplement the
//! teacher, which has no CAS primitive of its own.

use crate::error::{OrbError, Result};
use multihash_codetable::{Code, MultihashDigest};

/// A resource hash: the multihash of the canonical byte sequence identified
/// by a hashlink (§3 invariant 1).
pub type ResourceHash = multihash_codetable::Multihash;

/// Compute the default resource hash (BLAKE3) over canonical bytes.
pub fn multihash(bytes: &[u8]) -> ResourceHash {
    Code::Blake3_256.digest(bytes)
}

/// Parse a resource hash back out of its hex wire form.
pub fn parse_multihash(s: &str) -> Result<ResourceHash> {
    let raw =
        hex::decode(s).map_err(|_| OrbError::integrity(format!("unparsable multihash {s:?}")))?;
    ResourceHash::from_bytes(&raw)
        .map_err(|e| OrbError::integrity(format!("invalid multihash bytes: {e}")))
}

/// Render a resource hash to its hex wire form, matching the lowercase-hex
/// display convention the teacher's companion example (`echo_cas::BlobHash`)
/// uses for content hashes.
pub fn format_multihash(h: &ResourceHash) -> String {
    hex::encode(h.to_bytes())
}

/// `Read(hash) -> bytes | not-found`, `Write(bytes) -> hash` (§6).
#[async_trait::async_trait]
pub trait CasStorage: Send + Sync {
    async fn read(&self, hash: &ResourceHash) -> Result<Vec<u8>>;
    async fn write(&self, bytes: &[u8]) -> Result<ResourceHash>;
}

/// `Read(cid) -> bytes` (§6).
#[async_trait::async_trait]
pub trait IpfsReader: Send + Sync {
    async fn read(&self, cid: &str) -> Result<Vec<u8>>;
}

/// In-memory CAS used by tests and as the default local-writer backend.
#[derive(Default)]
pub struct MemoryCas {
    data: dashmap::DashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryCas {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CasStorage for MemoryCas {
    async fn read(&self, hash: &ResourceHash) -> Result<Vec<u8>> {
        self.data
            .get(&hash.to_bytes())
            .map(|v| v.clone())
            .ok_or_else(|| OrbError::not_found(format!("cas miss for {}", format_multihash(hash))))
    }

    async fn write(&self, bytes: &[u8]) -> Result<ResourceHash> {
        let h = multihash(bytes);
        self.data.insert(h.to_bytes(), bytes.to_vec());
        Ok(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_cas_write_then_read_idempotent() {
        let cas = MemoryCas::new();
        let h1 = cas.write(b"payload").await.unwrap();
        let h2 = cas.write(b"payload").await.unwrap();
        assert_eq!(h1, h2);
        assert_eq!(cas.read(&h1).await.unwrap(), b"payload");
    }

    #[test]
    fn multihash_round_trips_through_wire_form() {
        let h = multihash(b"hello");
        let wire = format_multihash(&h);
        let parsed = parse_multihash(&wire).unwrap();
        assert_eq!(h, parsed);
    }
}
