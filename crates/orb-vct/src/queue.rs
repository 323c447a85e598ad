//! The proof-watch queue (§4.8): persists `Watch(vc, deadline,
//! witnessDomain, createdAt)` requests through the §6 `Store` collaborator
//! so the monitor can pull due entries across ticks, mirroring
//! `orb_status::StatusStore`'s tag-indexed layout.

use chrono::{DateTime, Utc};
use orb_core::error::{OrbError, Result};
use orb_core::store::{Store, Tag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const NAMESPACE: &str = "vct-watch";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedWatch {
    pub id: String,
    pub vc_bytes: Vec<u8>,
    pub deadline: DateTime<Utc>,
    pub witness_domain: String,
    pub created_at: DateTime<Utc>,
}

pub struct WatchQueue {
    store: Arc<dyn Store>,
}

impl WatchQueue {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key(id: &str) -> String {
        format!("{NAMESPACE}:{id}")
    }

    pub async fn enqueue(
        &self,
        vc_bytes: Vec<u8>,
        deadline: DateTime<Utc>,
        witness_domain: String,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let entry = QueuedWatch {
            id: Uuid::new_v4().to_string(),
            vc_bytes,
            deadline,
            witness_domain,
            created_at,
        };
        let value = serde_json::to_vec(&entry)
            .map_err(|e| OrbError::integrity(format!("encode queued watch: {e}")))?;
        self.store
            .put(
                &Self::key(&entry.id),
                value,
                vec![
                    Tag::str("namespace", NAMESPACE),
                    Tag::int("deadline", entry.deadline.timestamp_millis()),
                ],
            )
            .await
    }

    /// All queued watches, bounded to `limit` (§4.8 "bounded per run").
    pub async fn due(&self, limit: usize) -> Result<Vec<QueuedWatch>> {
        let records = self.store.query(&format!("namespace:{NAMESPACE}")).await?;
        let mut out = Vec::with_capacity(records.len().min(limit));
        for record in records.into_iter().take(limit) {
            out.push(
                serde_json::from_slice(&record.value)
                    .map_err(|e| OrbError::integrity(format!("decode queued watch: {e}")))?,
            );
        }
        Ok(out)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&Self::key(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_core::store::MemoryStore;

    #[tokio::test]
    async fn enqueue_then_due_then_delete() {
        let queue = WatchQueue::new(Arc::new(MemoryStore::new()));
        queue
            .enqueue(b"vc".to_vec(), Utc::now(), "witness.example".into(), Utc::now())
            .await
            .unwrap();

        let due = queue.due(10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].witness_domain, "witness.example");

        queue.delete(&due[0].id).await.unwrap();
        assert!(queue.due(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn due_respects_limit() {
        let queue = WatchQueue::new(Arc::new(MemoryStore::new()));
        for _ in 0..3 {
            queue
                .enqueue(b"vc".to_vec(), Utc::now(), "witness.example".into(), Utc::now())
                .await
                .unwrap();
        }
        assert_eq!(queue.due(2).await.unwrap().len(), 2);
    }
}
