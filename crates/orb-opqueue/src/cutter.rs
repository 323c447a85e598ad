//! The background batch cutter (§4.4, §5 "Long loops ... suspend on a timer
//! selectable against the cancel signal"). Cuts on max size or max age,
//! hands the batch to a [`BatchSink`], and restores the batch on failure so
//! the next tick retries.

use crate::queue::{Operation, OperationQueue};
use orb_core::cancel::CancelToken;
use orb_core::error::{IsTransient, Result};
use orb_core::metrics::MetricsSink;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[async_trait::async_trait]
pub trait BatchSink: Send + Sync {
    async fn cut(&self, operations: Vec<Operation>) -> Result<()>;
}

pub struct Cutter<S: BatchSink, M: MetricsSink> {
    queue: Arc<OperationQueue>,
    sink: Arc<S>,
    metrics: Arc<M>,
    poll_interval: Duration,
}

impl<S: BatchSink, M: MetricsSink> Cutter<S, M> {
    pub fn new(
        queue: Arc<OperationQueue>,
        sink: Arc<S>,
        metrics: Arc<M>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            sink,
            metrics,
            poll_interval,
        }
    }

    /// Runs until `cancel` fires. One tick: sleep, check the cut predicate,
    /// drain and hand off, restore on failure.
    pub async fn run(&self, cancel: CancelToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("batch cutter stopping");
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
            self.tick().await;
        }
    }

    async fn tick(&self) {
        if !self.queue.should_cut().await {
            return;
        }
        let batch = self.queue.drain().await;
        if batch.is_empty() {
            return;
        }
        let size = batch.len();
        let started = Instant::now();
        match self.sink.cut(batch.clone()).await {
            Ok(()) => {
                let elapsed = started.elapsed();
                self.metrics.batch_cut(size, elapsed);
                tracing::info!(operations = size, elapsed_ms = elapsed.as_millis() as u64, "batch cut");
            }
            Err(e) => {
                self.metrics.batch_rollback();
                tracing::warn!(
                    error = %e,
                    transient = e.is_transient(),
                    operations = size,
                    "batch cut failed, restoring operations"
                );
                self.queue.restore(batch).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueConfig;
    use orb_core::error::OrbError;
    use orb_core::metrics::NoopMetrics;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakySink {
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl BatchSink for FlakySink {
        async fn cut(&self, _operations: Vec<Operation>) -> Result<()> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(OrbError::transient("anchor writer unavailable"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn failed_cut_restores_batch_for_retry() {
        let queue = Arc::new(OperationQueue::new(QueueConfig {
            high_water_mark: 10,
            max_batch_size: 1,
            max_batch_age: Duration::from_secs(3600),
        }));
        queue
            .admit(Operation {
                suffix: "a".into(),
                operation_type: "update".into(),
                payload: vec![],
            })
            .await
            .unwrap();

        let sink = Arc::new(FlakySink {
            attempts: AtomicUsize::new(0),
        });
        let cutter = Cutter::new(queue.clone(), sink.clone(), Arc::new(NoopMetrics), Duration::from_millis(1));

        cutter.tick().await;
        assert_eq!(queue.len().await, 1, "batch restored after transient failure");

        cutter.tick().await;
        assert_eq!(queue.len().await, 0, "batch consumed on retry success");
        assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    }
}
