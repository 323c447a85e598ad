//! The anchor status store (§4.7 "Storage"). Backed by the §6 `Store`
//! collaborator, tag-indexed by `{anchorID, status, expiryTime,
//! statusCheckTime}` so the monitor's due-record query (§4.7 "Queries of
//! interest") is a single `Query` call rather than a full scan.
//!
//! A transition to `completed` writes the completed row and deletes the
//! in-process row in one `Store::batch` call — §5's "transactional batch;
//! if the backend lacks transactions, completed is written first and
//! in-process deletion is idempotent" is satisfied by ordering the batch
//! ops with the `Put` first.

use crate::record::{Status, StatusRecord};
use chrono::{DateTime, Utc};
use orb_core::error::{OrbError, Result};
use orb_core::store::{BatchOp, Store, Tag};
use std::sync::Arc;

const NAMESPACE: &str = "anchor-status";

fn key(anchor_id: &str, status: Status) -> String {
    format!("{NAMESPACE}:{anchor_id}:{}", status.as_tag())
}

pub struct StatusStore {
    store: Arc<dyn Store>,
}

impl StatusStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Admits a freshly-cut anchor as in-process with `deadline = now +
    /// maxWitnessDelay + delta` (§4.5 step 2). The first status check is
    /// due at the deadline itself.
    pub async fn add_in_process(&self, anchor_id: &str, deadline: DateTime<Utc>) -> Result<()> {
        self.put_in_process(anchor_id, deadline, deadline).await
    }

    async fn put_in_process(
        &self,
        anchor_id: &str,
        deadline: DateTime<Utc>,
        status_check_time: DateTime<Utc>,
    ) -> Result<()> {
        let record = StatusRecord {
            anchor_id: anchor_id.to_string(),
            status: Status::InProcess,
            deadline,
            status_check_time,
        };
        let value = serde_json::to_vec(&record)
            .map_err(|e| OrbError::integrity(format!("encode status record: {e}")))?;
        self.store
            .put(
                &key(anchor_id, Status::InProcess),
                value,
                vec![
                    Tag::str("anchorID", anchor_id),
                    Tag::str("status", Status::InProcess.as_tag()),
                    Tag::int("expiryTime", deadline.timestamp_millis()),
                    Tag::int("statusCheckTime", status_check_time.timestamp_millis()),
                ],
            )
            .await
    }

    /// Push the next due-check out (or in) without disturbing the deadline;
    /// used by the monitor after the inspector re-selects witnesses (§4.7).
    pub async fn reschedule_check(
        &self,
        anchor_id: &str,
        next_check_time: DateTime<Utc>,
    ) -> Result<()> {
        let existing = self.store.get(&key(anchor_id, Status::InProcess)).await?;
        let Some(existing) = existing else {
            return Ok(());
        };
        let mut record: StatusRecord = serde_json::from_slice(&existing.value)
            .map_err(|e| OrbError::integrity(format!("decode status record: {e}")))?;
        record.status_check_time = next_check_time;
        self.put_in_process(anchor_id, record.deadline, next_check_time)
            .await
    }

    /// Transitions `anchor_id` to completed, atomically (relative to
    /// queries) deleting all in-process rows for the id (§3 invariant,
    /// §4.5 step 6, §8 invariant 5).
    pub async fn mark_completed(&self, anchor_id: &str) -> Result<()> {
        let record = StatusRecord {
            anchor_id: anchor_id.to_string(),
            status: Status::Completed,
            deadline: Utc::now(),
            status_check_time: Utc::now(),
        };
        let value = serde_json::to_vec(&record)
            .map_err(|e| OrbError::integrity(format!("encode status record: {e}")))?;
        self.store
            .batch(vec![
                BatchOp::Put {
                    key: key(anchor_id, Status::Completed),
                    value,
                    tags: vec![
                        Tag::str("anchorID", anchor_id),
                        Tag::str("status", Status::Completed.as_tag()),
                    ],
                },
                BatchOp::Delete {
                    key: key(anchor_id, Status::InProcess),
                },
            ])
            .await
    }

    /// Abandons an anchor (inspector found no replacement witnesses, §4.7
    /// "the monitor deletes the in-process rows"). Idempotent.
    pub async fn delete_in_process(&self, anchor_id: &str) -> Result<()> {
        self.store.delete(&key(anchor_id, Status::InProcess)).await
    }

    /// `GetStatus(x)`: completed takes priority over any lingering
    /// in-process row, per §8's `AddStatus(x, completed)` then
    /// `AddStatus(x, in-process)` round-trip property.
    pub async fn get_status(&self, anchor_id: &str) -> Result<Option<StatusRecord>> {
        if let Some(record) = self.store.get(&key(anchor_id, Status::Completed)).await? {
            return Ok(Some(
                serde_json::from_slice(&record.value)
                    .map_err(|e| OrbError::integrity(format!("decode status record: {e}")))?,
            ));
        }
        if let Some(record) = self.store.get(&key(anchor_id, Status::InProcess)).await? {
            return Ok(Some(
                serde_json::from_slice(&record.value)
                    .map_err(|e| OrbError::integrity(format!("decode status record: {e}")))?,
            ));
        }
        Ok(None)
    }

    /// All in-process records due for a check (§4.7 "All `in-process`
    /// records with `statusCheckTime <= now`"), bounded to `limit`
    /// (`maxRecordsPerInterval`).
    pub async fn due_in_process(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<StatusRecord>> {
        let expr = format!("status:in-process && statusCheckTime<={}", now.timestamp_millis());
        let records = self.store.query(&expr).await?;
        let mut out = Vec::with_capacity(records.len().min(limit));
        for record in records.into_iter().take(limit) {
            out.push(
                serde_json::from_slice(&record.value)
                    .map_err(|e| OrbError::integrity(format!("decode status record: {e}")))?,
            );
        }
        Ok(out)
    }
}
