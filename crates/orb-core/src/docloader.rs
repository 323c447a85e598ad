//! The JSON-LD document loader collaborator (§6): `Load(iri) -> document`.
//! Out of scope to implement (§1); Orb's core only needs the trait seam so
//! the anchor graph and transport can be constructed against a real loader.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, iri: &str) -> Result<Value>;
}
