//! Request signing (§4.2 "Signing policy"). A signer attaches HTTP
//! Signature headers (`draft-cavage-http-signatures`, §6 "Outbound HTTP")
//! over the request's signing string; which signer runs (if any) is decided
//! per-request by an [`AuthPolicy`], and GET/POST may use distinct signers
//! to support dual key-pairs (§4.2).
//!
//! Grounded on the ed25519-dalek signing shape in the teacher's
//! `wallet-identity/src/client/transport/httpcg_client.rs`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature, Signer as _, SigningKey};
use orb_core::error::Result;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// `(path, method) -> bool`: should this request be signed?
pub trait AuthPolicy: Send + Sync {
    fn requires_auth(&self, path: &str, method: Method) -> bool;
}

/// Always-sign / never-sign policies for tests and simple deployments.
pub struct AlwaysAuth;
impl AuthPolicy for AlwaysAuth {
    fn requires_auth(&self, _path: &str, _method: Method) -> bool {
        true
    }
}

pub struct NeverAuth;
impl AuthPolicy for NeverAuth {
    fn requires_auth(&self, _path: &str, _method: Method) -> bool {
        false
    }
}

/// A signer attaches headers to a request given its method, path, and
/// header bag (the "signing string" inputs under draft-cavage). Swappable;
/// a no-op signer exists for tests (§4.2).
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        method: &str,
        path: &str,
        headers: &BTreeMap<String, String>,
        body: &[u8],
    ) -> Result<BTreeMap<String, String>>;
}

/// Used in tests: attaches nothing.
pub struct NoopSigner;
impl Signer for NoopSigner {
    fn sign(
        &self,
        _method: &str,
        _path: &str,
        _headers: &BTreeMap<String, String>,
        _body: &[u8],
    ) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }
}

/// The default signer: ed25519 over a `(request-target) host date digest`
/// signing string, following `draft-cavage-http-signatures` §2.3.
pub struct Ed25519Signer {
    key_id: String,
    signing_key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key_id: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            key_id: key_id.into(),
            signing_key,
        }
    }

    fn digest_header(body: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(body);
        format!("SHA-256={}", STANDARD.encode(hasher.finalize()))
    }

    fn signing_string(&self, method: &str, path: &str, headers: &BTreeMap<String, String>) -> String {
        let host = headers.get("host").map(String::as_str).unwrap_or("");
        let date = headers.get("date").map(String::as_str).unwrap_or("");
        let digest = headers.get("digest").map(String::as_str).unwrap_or("");
        format!(
            "(request-target): {} {}\nhost: {}\ndate: {}\ndigest: {}",
            method.to_ascii_lowercase(),
            path,
            host,
            date,
            digest
        )
    }
}

impl Signer for Ed25519Signer {
    fn sign(
        &self,
        method: &str,
        path: &str,
        headers: &BTreeMap<String, String>,
        body: &[u8],
    ) -> Result<BTreeMap<String, String>> {
        let mut out = headers.clone();
        out.insert("digest".to_string(), Self::digest_header(body));
        let signing_string = self.signing_string(method, path, &out);
        let signature: Signature = self.signing_key.sign(signing_string.as_bytes());
        let header = format!(
            "keyId=\"{}\",algorithm=\"ed25519\",headers=\"(request-target) host date digest\",signature=\"{}\"",
            self.key_id,
            STANDARD.encode(signature.to_bytes())
        );
        let mut result = BTreeMap::new();
        result.insert("digest".to_string(), out.remove("digest").unwrap());
        result.insert("signature".to_string(), header);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn ed25519_signer_attaches_signature_and_digest() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let signer = Ed25519Signer::new("actor#key-1", signing_key);
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), "witness.example".to_string());
        headers.insert("date".to_string(), "Tue, 28 Jul 2026 00:00:00 GMT".to_string());
        let out = signer.sign("POST", "/inbox", &headers, b"{}").unwrap();
        assert!(out.contains_key("signature"));
        assert!(out["signature"].contains("keyId=\"actor#key-1\""));
        assert!(out.contains_key("digest"));
    }
}
