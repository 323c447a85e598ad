//! The witness transparency-log client (§4.8 steps 1 and 3): WebFinger the
//! witness domain for its ledger type, then query the signed tree head and
//! request proof-by-hash. Grounded on `orb_transport::WebFingerClient`
//! (§4.1 scenario 2 already establishes the discovery pattern) and
//! `orb_transport::Transport` for the signed wire hops.

use crate::merkle::InclusionProof;
use async_trait::async_trait;
use orb_core::error::{OrbError, Result};
use orb_transport::{CallKind, Request, Transport, WebFingerClient};
use orb_core::cancel::CancelToken;
use serde::Deserialize;
use std::sync::Arc;

/// The only ledger type the proof monitor understands (§4.8 step 1
/// "proceeds only for the recognized type").
pub const RECOGNIZED_LEDGER_TYPE: &str = "vct-v1";

const WEBFINGER_REL_LEDGER_TYPE: &str = "https://trustbloc.dev/orb/vct-ledger-type";
const WEBFINGER_REL_STH: &str = "https://trustbloc.dev/orb/vct-sth";
const WEBFINGER_REL_PROOF: &str = "https://trustbloc.dev/orb/vct-proof-by-hash";

#[derive(Debug, Clone, Deserialize)]
pub struct SignedTreeHead {
    pub tree_size: u64,
    pub root_hash: [u8; 32],
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Resolves `witness_domain`'s ledger type via WebFinger, or
    /// `Kind::NotFound` if the domain doesn't advertise one.
    async fn ledger_type(&self, witness_domain: &str) -> Result<String>;
    async fn signed_tree_head(&self, witness_domain: &str) -> Result<SignedTreeHead>;
    async fn proof_by_hash(&self, witness_domain: &str, leaf_hash: [u8; 32]) -> Result<InclusionProof>;
}

pub struct HttpLedgerClient {
    transport: Arc<Transport>,
    webfinger: WebFingerClient,
}

impl HttpLedgerClient {
    pub fn new(transport: Arc<Transport>, http: reqwest::Client) -> Self {
        Self {
            transport,
            webfinger: WebFingerClient::new(http),
        }
    }

    async fn webfinger_link(&self, witness_domain: &str, rel: &str) -> Result<String> {
        let resource = format!("acct:ledger@{witness_domain}");
        let response = self.webfinger.resolve(witness_domain, &resource).await?;
        response
            .link_with_rel(rel)
            .and_then(|l| l.href.clone())
            .ok_or_else(|| OrbError::not_found(format!("{witness_domain} has no {rel} webfinger link")))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let cancel = CancelToken::new();
        let response = self
            .transport
            .get(&cancel, Request::new(url.to_string()), CallKind::Cas)
            .await
            .map_err(|e| OrbError::transient(format!("ledger request to {url} failed: {e}")))?;
        serde_json::from_slice(&response.body)
            .map_err(|e| OrbError::integrity(format!("malformed ledger response from {url}: {e}")))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn ledger_type(&self, witness_domain: &str) -> Result<String> {
        let resource = format!("acct:ledger@{witness_domain}");
        let response = self.webfinger.resolve(witness_domain, &resource).await?;
        response
            .link_with_rel(WEBFINGER_REL_LEDGER_TYPE)
            .and_then(|l| l.properties.get(WEBFINGER_REL_LEDGER_TYPE).cloned().flatten())
            .ok_or_else(|| OrbError::not_found(format!("{witness_domain} does not advertise a ledger type")))
    }

    async fn signed_tree_head(&self, witness_domain: &str) -> Result<SignedTreeHead> {
        let url = self.webfinger_link(witness_domain, WEBFINGER_REL_STH).await?;
        self.get_json(&url).await
    }

    async fn proof_by_hash(&self, witness_domain: &str, leaf_hash: [u8; 32]) -> Result<InclusionProof> {
        let base = self.webfinger_link(witness_domain, WEBFINGER_REL_PROOF).await?;
        let url = format!("{base}?hash={}", hex::encode(leaf_hash));
        self.get_json(&url).await
    }
}
