//! The anchor graph (§4.3): canonicalize/compress/write through the CAS
//! writer; resolve/decompress/parse on read; DID-suffix chain traversal.

use crate::credential::AnchorCredential;
use crate::linkset::LinksetDocument;
use orb_core::activity::AnchorLinkset;
use orb_core::error::{OrbError, Result};
use orb_hashlink::{HashWithHint, Resolver};
use std::sync::Arc;

const COMPRESSION_NONE: u8 = 0;
const COMPRESSION_ZSTD: u8 = 1;

#[derive(Debug, Clone, Copy)]
pub struct CompressionConfig {
    pub enabled: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

pub struct AnchorGraph {
    resolver: Arc<Resolver>,
    compression: CompressionConfig,
}

impl AnchorGraph {
    pub fn new(resolver: Arc<Resolver>, compression: CompressionConfig) -> Self {
        Self {
            resolver,
            compression,
        }
    }

    /// Canonicalize, optionally compress (recording the algorithm id
    /// alongside), write through the CAS writer, and return the hashlink.
    pub async fn write(&self, anchor_origin: Option<String>, credential: &AnchorCredential) -> Result<String> {
        let canonical = credential.to_bytes()?;
        let linkset = LinksetDocument::single(AnchorLinkset {
            hashlink: String::new(),
            anchor_origin,
            credential: canonical,
        });
        let document_bytes = linkset.to_bytes()?;
        let framed = self.frame(&document_bytes)?;
        self.resolver.write(&framed).await
    }

    /// Resolve the hashlink, attempt decompression (falling back to raw
    /// bytes on failure for backward compatibility), parse the outer
    /// collection shape, and decode the embedded anchor credential.
    pub async fn read(
        &self,
        web_cas_url: Option<&str>,
        hint: &HashWithHint,
    ) -> Result<(AnchorCredential, String)> {
        let (bytes, hashlink) = self.resolver.resolve(web_cas_url, hint, None).await?;
        let unframed = self.unframe(&bytes);
        let document = LinksetDocument::parse(&unframed)?;
        let item = document
            .items()
            .first()
            .ok_or_else(|| OrbError::integrity("anchor linkset has no items"))?;
        let credential = AnchorCredential::from_bytes(&item.credential)?;
        Ok((credential, hashlink))
    }

    /// `GetDidAnchors(startHashlink, suffix) -> anchors[oldest..newest]`
    /// (§4.3 "DID traversal"). A non-resolvable previous pointer is a hard
    /// error; an absent or empty pointer stops traversal at the create op.
    pub async fn get_did_anchors(
        &self,
        start_hashlink: &str,
        suffix: &str,
    ) -> Result<Vec<AnchorCredential>> {
        let mut newest_first = Vec::new();
        let mut cursor = start_hashlink.to_string();
        loop {
            let hint = HashWithHint::parse(&cursor)?;
            let (credential, _hashlink) = self.read(None, &hint).await?;
            let previous = credential.payload.previous_anchor(suffix).map(str::to_string);
            newest_first.push(credential);
            match previous {
                Some(hashlink) => cursor = hashlink,
                None => break,
            }
        }
        newest_first.reverse();
        Ok(newest_first)
    }

    fn frame(&self, canonical: &[u8]) -> Result<Vec<u8>> {
        if !self.compression.enabled {
            let mut out = Vec::with_capacity(canonical.len() + 1);
            out.push(COMPRESSION_NONE);
            out.extend_from_slice(canonical);
            return Ok(out);
        }
        let compressed = zstd::stream::encode_all(canonical, 0)
            .map_err(|e| OrbError::integrity(format!("anchor compression failed: {e}")))?;
        let mut out = Vec::with_capacity(compressed.len() + 1);
        out.push(COMPRESSION_ZSTD);
        out.extend(compressed);
        Ok(out)
    }

    /// Attempt decompression; on any failure (unknown/missing algorithm id,
    /// corrupt stream), treat the bytes as uncompressed (§4.3 "Compression
    /// failures on read fall back to treating the bytes as uncompressed").
    fn unframe(&self, bytes: &[u8]) -> Vec<u8> {
        match bytes.split_first() {
            Some((&COMPRESSION_ZSTD, rest)) => {
                zstd::stream::decode_all(rest).unwrap_or_else(|_| bytes.to_vec())
            }
            Some((&COMPRESSION_NONE, rest)) => rest.to_vec(),
            _ => bytes.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_core::cas::MemoryCas;

    fn test_resolver() -> Arc<Resolver> {
        Arc::new(Resolver::new(
            Arc::new(MemoryCas::new()),
            None,
            reqwest::Client::new(),
            "https://node.example/cas",
            false,
        ))
    }

    #[tokio::test]
    async fn write_then_read_round_trips_with_compression() {
        let resolver = test_resolver();
        let graph = AnchorGraph::new(resolver, CompressionConfig { enabled: true });
        let credential = AnchorCredential::new(crate::payload::AnchorPayload {
            namespace: "did:orb".into(),
            protocol_version: 1,
            core_index_hash: "hl:core".into(),
            operation_count: 1,
            previous_anchors: Default::default(),
        });
        let hashlink = graph
            .write(Some("https://orb.example".into()), &credential)
            .await
            .unwrap();
        let hint = HashWithHint::parse(&hashlink).unwrap();
        let (read_back, hashlink2) = graph.read(None, &hint).await.unwrap();
        assert_eq!(read_back, credential);
        assert_eq!(hashlink, hashlink2);
    }

    #[tokio::test]
    async fn traversal_stops_at_create_operation() {
        let resolver = test_resolver();
        let graph = AnchorGraph::new(resolver, CompressionConfig { enabled: false });

        let create = AnchorCredential::new(crate::payload::AnchorPayload {
            namespace: "did:orb".into(),
            protocol_version: 1,
            core_index_hash: "hl:core0".into(),
            operation_count: 1,
            previous_anchors: Default::default(),
        });
        let create_hl = graph.write(None, &create).await.unwrap();

        let mut previous_anchors = std::collections::BTreeMap::new();
        previous_anchors.insert("suffix-a".to_string(), create_hl.clone());
        let update = AnchorCredential::new(crate::payload::AnchorPayload {
            namespace: "did:orb".into(),
            protocol_version: 1,
            core_index_hash: "hl:core1".into(),
            operation_count: 1,
            previous_anchors,
        });
        let update_hl = graph.write(None, &update).await.unwrap();

        let chain = graph.get_did_anchors(&update_hl, "suffix-a").await.unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0], create);
        assert_eq!(chain[1], update);
    }
}
