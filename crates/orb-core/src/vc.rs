//! The verifiable-credential library collaborator (§6). Orb's core treats
//! the credential as opaque once signed (Non-goals, §1): it only needs
//! parse/marshal and a public-key fetcher callback, never the JSON-LD
//! vocabulary itself.

use crate::error::Result;
use async_trait::async_trait;

/// An opaque, already-signed verifiable credential. Concrete VC libraries
/// (out of scope, §1) implement this by wrapping their own document type.
pub trait VerifiableCredential: Send + Sync {
    fn marshal_json(&self) -> Result<Vec<u8>>;
    /// The canonical byte form used for hashing (§3 invariant, §6 wire
    /// formats): deterministic canonicalization output.
    fn canonical_bytes(&self) -> Result<Vec<u8>>;
}

/// Callback used by a VC library to resolve an issuer's signing key.
pub type PublicKeyFetcher = Box<dyn Fn(&str, &str) -> Result<Vec<u8>> + Send + Sync>;

#[async_trait]
pub trait VcLibrary: Send + Sync {
    async fn parse_credential(&self, bytes: &[u8]) -> Result<Box<dyn VerifiableCredential>>;
}
