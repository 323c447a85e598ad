//! The proof monitor (§4.8): implements [`orb_witness::ProofWatcher`] to
//! accept watch requests from the anchor writer, and a background worker
//! (grounded on `orb_opqueue::cutter::Cutter`'s `tokio::select!` loop
//! shape, same as `orb_status::Monitor`) that periodically checks queued
//! entries against each witness's transparency log.

use crate::ledger::{LedgerClient, RECOGNIZED_LEDGER_TYPE};
use crate::merkle::leaf_hash;
use crate::queue::{QueuedWatch, WatchQueue};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orb_core::cancel::CancelToken;
use orb_core::error::{Kind, OrbError, Result};
use orb_core::metrics::MetricsSink;
use orb_witness::ProofWatcher;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub max_per_run: usize,
}

pub struct Monitor<M: MetricsSink> {
    queue: Arc<WatchQueue>,
    ledger: Arc<dyn LedgerClient>,
    metrics: Arc<M>,
    config: MonitorConfig,
}

impl<M: MetricsSink> Monitor<M> {
    pub fn new(
        queue: Arc<WatchQueue>,
        ledger: Arc<dyn LedgerClient>,
        metrics: Arc<M>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            queue,
            ledger,
            metrics,
            config,
        }
    }

    pub async fn run(&self, cancel: CancelToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("proof monitor stopping");
                    return;
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
            self.tick().await;
        }
    }

    /// One pass over up to `max_per_run` queued entries (§4.8 "A background
    /// worker pulls queued entries at an interval, bounded per run").
    pub async fn tick(&self) {
        let due = match self.queue.due(self.config.max_per_run).await {
            Ok(due) => due,
            Err(e) => {
                tracing::warn!(error = %e, "proof monitor failed to query due watches");
                return;
            }
        };
        for entry in due {
            self.check_one(entry).await;
        }
    }

    async fn check_one(&self, entry: QueuedWatch) {
        let now = Utc::now();
        if now > entry.deadline {
            tracing::error!(
                witness_domain = %entry.witness_domain,
                anchor_created_at = %entry.created_at,
                "witness inclusion promise expired"
            );
            self.metrics.proof_expired();
            self.delete(&entry).await;
            return;
        }

        match self.check_inclusion(&entry).await {
            Ok(true) => {
                tracing::info!(witness_domain = %entry.witness_domain, "witness inclusion confirmed");
                self.metrics.proof_confirmed();
                self.delete(&entry).await;
            }
            Ok(false) => {
                // tree_size == 0 or proof not yet available; retry next tick.
            }
            Err(e) if e.is(Kind::NotFound) => {
                tracing::error!(witness_domain = %entry.witness_domain, error = %e, "unrecognized witness ledger type");
                self.delete(&entry).await;
            }
            Err(e) if e.is(Kind::Integrity) => {
                tracing::error!(witness_domain = %entry.witness_domain, error = %e, "witness inclusion proof failed verification");
                self.delete(&entry).await;
            }
            Err(e) => {
                tracing::warn!(witness_domain = %entry.witness_domain, error = %e, "proof check failed transiently, will retry");
            }
        }
    }

    /// `Ok(true)` if presence is confirmed, `Ok(false)` if the check should
    /// be retried later (tree not yet grown to include the leaf), `Err` of
    /// `Kind::NotFound`/`Kind::Integrity` for conditions that should drop
    /// the entry.
    async fn check_inclusion(&self, entry: &QueuedWatch) -> Result<bool> {
        let ledger_type = self.ledger.ledger_type(&entry.witness_domain).await?;
        if ledger_type != RECOGNIZED_LEDGER_TYPE {
            return Err(OrbError::not_found(format!(
                "unrecognized ledger type {ledger_type:?} for {}",
                entry.witness_domain
            )));
        }

        let sth = self.ledger.signed_tree_head(&entry.witness_domain).await?;
        if sth.tree_size == 0 {
            return Ok(false);
        }

        let leaf = leaf_hash(entry.created_at.timestamp_millis(), &entry.vc_bytes);
        let proof = self.ledger.proof_by_hash(&entry.witness_domain, leaf).await?;
        if proof.is_trivially_invalid() {
            return Err(OrbError::integrity(format!(
                "empty audit path for non-root leaf index {}",
                proof.leaf_index
            )));
        }
        if !proof.verify(leaf, sth.root_hash) {
            return Err(OrbError::integrity("inclusion proof does not reconstruct the signed tree head"));
        }
        Ok(true)
    }

    async fn delete(&self, entry: &QueuedWatch) {
        if let Err(e) = self.queue.delete(&entry.id).await {
            tracing::warn!(id = %entry.id, error = %e, "failed to delete resolved watch entry");
        }
    }
}

#[async_trait]
impl<M: MetricsSink> ProofWatcher for Monitor<M> {
    async fn watch(
        &self,
        vc_bytes: Vec<u8>,
        deadline: DateTime<Utc>,
        witness_domain: String,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.queue
            .enqueue(vc_bytes, deadline, witness_domain, created_at)
            .await
    }
}
