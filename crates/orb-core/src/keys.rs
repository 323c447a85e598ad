//! The key provider collaborator (§6): `Sign(keyID, bytes) -> sig`,
//! `Verify(keyID, bytes, sig) -> bool`, `ExportPublicKey(keyID) -> PEM`.
//!
//! Grounded on the ed25519-dalek usage in the teacher's
//! `wallet-identity/src/client/transport/httpcg_client.rs`.

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn sign(&self, key_id: &str, bytes: &[u8]) -> Result<Vec<u8>>;
    async fn verify(&self, key_id: &str, bytes: &[u8], signature: &[u8]) -> Result<bool>;
    async fn export_public_key(&self, key_id: &str) -> Result<String>;
}
