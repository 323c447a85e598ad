//! The witness policy config cache (§4.6 "Loaded from a config store,
//! cached with TTL, invalidated on update"). Built on
//! [`orb_core::arc_cache::ArcCache`], the same primitive the hashlink
//! resolver uses for its actor/public-key caches (§4.1).

use super::engine::PolicyConfig;
use orb_core::arc_cache::ArcCache;
use orb_core::error::{OrbError, Result};
use orb_core::store::Store;
use std::sync::Arc;
use std::time::Duration;

const NAMESPACE: &str = "witness-policy-config";

pub struct PolicyConfigStore {
    store: Arc<dyn Store>,
    cache: ArcCache<String, PolicyConfig>,
}

impl PolicyConfigStore {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self {
            store,
            cache: ArcCache::new(64, ttl),
        }
    }

    fn key(policy_key: &str) -> String {
        format!("{NAMESPACE}:{policy_key}")
    }

    pub async fn get(&self, policy_key: &str) -> Result<PolicyConfig> {
        let store = self.store.clone();
        let key = policy_key.to_string();
        self.cache
            .get_or_load(&policy_key.to_string(), move || async move {
                let record = store
                    .get(&Self::key(&key))
                    .await?
                    .ok_or_else(|| OrbError::not_found(format!("no witness policy named {key:?}")))?;
                let dsl = String::from_utf8(record.value)
                    .map_err(|e| OrbError::integrity(format!("policy dsl is not utf8: {e}")))?;
                PolicyConfig::parse(&dsl)
            })
            .await
    }

    /// Writes a new policy DSL string and evicts the cached value so the
    /// next `get` reloads it immediately (§4.6 "invalidated on update").
    pub async fn update(&self, policy_key: &str, dsl: &str) -> Result<()> {
        PolicyConfig::parse(dsl)?;
        self.store
            .put(&Self::key(policy_key), dsl.as_bytes().to_vec(), vec![])
            .await?;
        self.cache.invalidate(&policy_key.to_string()).await;
        Ok(())
    }
}
