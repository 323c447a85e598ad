//! The status monitor (§4.7 "Monitor"): periodically queries for due
//! in-process records (bounded per tick), and for each either confirms
//! completion, invokes the inspector, or abandons the anchor.
//!
//! Grounded on the `orb-opqueue` cutter's loop shape
//! (`orb_opqueue::cutter::Cutter::run`): a `tokio::select!` against a
//! cancellation token racing a sleep, rather than the out-of-scope
//! `TaskManager` collaborator (§6) a bootstrap layer would otherwise wire
//! this through.

use crate::inspector::{CheckPolicyOutcome, Inspector};
use crate::record::Status;
use crate::store::StatusStore;
use chrono::Utc;
use orb_core::cancel::CancelToken;
use orb_core::metrics::MetricsSink;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub default_interval: Duration,
    /// Used for the next tick when the previous one hit `max_records`,
    /// i.e. "the next run is scheduled sooner than the default interval"
    /// (§4.7).
    pub fast_interval: Duration,
    pub max_records_per_interval: usize,
    /// How soon the inspector's re-selected witnesses get rechecked.
    pub recheck_delay: Duration,
}

pub struct Monitor<M: MetricsSink> {
    store: Arc<StatusStore>,
    inspector: Arc<dyn Inspector>,
    metrics: Arc<M>,
    config: MonitorConfig,
}

impl<M: MetricsSink> Monitor<M> {
    pub fn new(
        store: Arc<StatusStore>,
        inspector: Arc<dyn Inspector>,
        metrics: Arc<M>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            store,
            inspector,
            metrics,
            config,
        }
    }

    pub async fn run(&self, cancel: CancelToken) {
        let mut interval = self.config.default_interval;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("anchor status monitor stopping");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            interval = if self.tick().await {
                self.config.fast_interval
            } else {
                self.config.default_interval
            };
        }
    }

    /// One tick. Returns `true` if the tick hit `max_records_per_interval`
    /// (records likely remain, so the caller should recheck sooner).
    pub async fn tick(&self) -> bool {
        let now = Utc::now();
        let due = match self
            .store
            .due_in_process(now, self.config.max_records_per_interval)
            .await
        {
            Ok(due) => due,
            Err(e) => {
                tracing::warn!(error = %e, "status monitor failed to query due records");
                return false;
            }
        };
        let hit_limit = due.len() >= self.config.max_records_per_interval;

        for record in due {
            self.check_one(&record.anchor_id).await;
        }
        hit_limit
    }

    async fn check_one(&self, anchor_id: &str) {
        match self.store.get_status(anchor_id).await {
            Ok(Some(status)) if status.status == Status::Completed => {
                if let Err(e) = self.store.delete_in_process(anchor_id).await {
                    tracing::warn!(anchor_id, error = %e, "failed to gc completed anchor's in-process row");
                }
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(anchor_id, error = %e, "failed to read anchor status");
                return;
            }
        }

        match self.inspector.check_policy(anchor_id).await {
            Ok(CheckPolicyOutcome::Reselected(uris)) => {
                tracing::info!(anchor_id, witnesses = ?uris, "inspector re-selected witnesses");
                let next = Utc::now()
                    + chrono::Duration::from_std(self.config.recheck_delay).unwrap_or_default();
                if let Err(e) = self.store.reschedule_check(anchor_id, next).await {
                    tracing::warn!(anchor_id, error = %e, "failed to reschedule status check");
                }
            }
            Ok(CheckPolicyOutcome::WitnessesNotFound) => {
                tracing::warn!(anchor_id, "no replacement witnesses available, abandoning anchor");
                self.metrics.anchor_abandoned();
                if let Err(e) = self.store.delete_in_process(anchor_id).await {
                    tracing::warn!(anchor_id, error = %e, "failed to delete abandoned anchor status");
                }
            }
            Err(e) => {
                tracing::warn!(anchor_id, error = %e, "inspector check failed, will retry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orb_core::error::Result;
    use orb_core::metrics::NoopMetrics;
    use orb_core::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubInspector {
        calls: AtomicUsize,
        outcome: CheckPolicyOutcome,
    }

    #[async_trait]
    impl Inspector for StubInspector {
        async fn check_policy(&self, _anchor_id: &str) -> Result<CheckPolicyOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            default_interval: Duration::from_secs(30),
            fast_interval: Duration::from_millis(10),
            max_records_per_interval: 10,
            recheck_delay: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn completed_anchor_is_gced_without_calling_inspector() {
        let store = Arc::new(StatusStore::new(Arc::new(MemoryStore::new())));
        store.add_in_process("a1", Utc::now()).await.unwrap();
        store.mark_completed("a1").await.unwrap();
        // Re-admit an in-process row to simulate a race the gc must still clean up.
        store.add_in_process("a1", Utc::now()).await.unwrap();
        store.mark_completed("a1").await.unwrap();

        let inspector = Arc::new(StubInspector {
            calls: AtomicUsize::new(0),
            outcome: CheckPolicyOutcome::WitnessesNotFound,
        });
        let monitor = Monitor::new(store.clone(), inspector.clone(), Arc::new(NoopMetrics), config());
        monitor.tick().await;
        assert_eq!(inspector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn witnesses_not_found_deletes_in_process_row() {
        let store = Arc::new(StatusStore::new(Arc::new(MemoryStore::new())));
        let now = Utc::now();
        store.add_in_process("a1", now).await.unwrap();

        let inspector = Arc::new(StubInspector {
            calls: AtomicUsize::new(0),
            outcome: CheckPolicyOutcome::WitnessesNotFound,
        });
        let monitor = Monitor::new(store.clone(), inspector, Arc::new(NoopMetrics), config());
        monitor.tick().await;

        assert!(store.due_in_process(now, 10).await.unwrap().is_empty());
        assert!(store.get_status("a1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reselected_outcome_reschedules_rather_than_deletes() {
        let store = Arc::new(StatusStore::new(Arc::new(MemoryStore::new())));
        let now = Utc::now();
        store.add_in_process("a1", now).await.unwrap();

        let inspector = Arc::new(StubInspector {
            calls: AtomicUsize::new(0),
            outcome: CheckPolicyOutcome::Reselected(vec!["https://w3.example".into()]),
        });
        let monitor = Monitor::new(store.clone(), inspector, Arc::new(NoopMetrics), config());
        monitor.tick().await;

        assert!(store.get_status("a1").await.unwrap().is_some());
        assert!(store.due_in_process(now, 10).await.unwrap().is_empty());
    }
}
