//! Actor and public-key caches (§4.1 "Caching"): "Actor and public-key
//! lookups (used by transport) are cached with ARC eviction and a
//! configured expiration; loader re-runs on miss. Cache hits are
//! observable." Built on [`orb_core::arc_cache::ArcCache`].

use orb_core::activity::Actor;
use orb_core::arc_cache::ArcCache;
use orb_core::error::Result;
use orb_core::metrics::MetricsSink;
use std::sync::Arc;
use std::time::Duration;

pub struct ActorCache<M: MetricsSink> {
    actors: ArcCache<String, Actor>,
    public_keys: ArcCache<String, String>,
    metrics: Arc<M>,
}

impl<M: MetricsSink> ActorCache<M> {
    pub fn new(capacity: usize, ttl: Duration, metrics: Arc<M>) -> Self {
        Self {
            actors: ArcCache::new(capacity, ttl),
            public_keys: ArcCache::new(capacity, ttl),
            metrics,
        }
    }

    pub async fn get_actor<F, Fut>(&self, iri: &str, load: F) -> Result<Actor>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Actor>>,
    {
        let before = self.actors.hits();
        let actor = self.actors.get_or_load(&iri.to_string(), load).await?;
        if self.actors.hits() > before {
            self.metrics.cache_hit("actor");
        } else {
            self.metrics.cache_miss("actor");
        }
        Ok(actor)
    }

    pub async fn get_public_key<F, Fut>(&self, key_id: &str, load: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<String>>,
    {
        let before = self.public_keys.hits();
        let pem = self
            .public_keys
            .get_or_load(&key_id.to_string(), load)
            .await?;
        if self.public_keys.hits() > before {
            self.metrics.cache_hit("public_key");
        } else {
            self.metrics.cache_miss("public_key");
        }
        Ok(pem)
    }
}
