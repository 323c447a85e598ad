//! The operation admission queue (§4.4, §5 "Backpressure"): "The queue
//! admits operations tagged by DID suffix ... rejects admits when above a
//! configured high-water mark with a transient error."

use orb_core::error::{OrbError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    pub suffix: String,
    pub operation_type: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub high_water_mark: usize,
    pub max_batch_size: usize,
    pub max_batch_age: Duration,
}

struct State {
    operations: VecDeque<Operation>,
    first_admit_at: Option<Instant>,
}

/// Admits [`Operation`]s and exposes the cut predicate and drain/restore
/// primitives the [`crate::cutter::Cutter`] drives.
pub struct OperationQueue {
    config: QueueConfig,
    state: Mutex<State>,
}

impl OperationQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                operations: VecDeque::new(),
                first_admit_at: None,
            }),
        }
    }

    pub async fn admit(&self, operation: Operation) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.operations.len() >= self.config.high_water_mark {
            return Err(OrbError::transient(format!(
                "queue above high-water mark of {}",
                self.config.high_water_mark
            )));
        }
        if state.operations.is_empty() {
            state.first_admit_at = Some(Instant::now());
        }
        state.operations.push_back(operation);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.operations.len()
    }

    /// True when the batch should be cut: max size reached, or max age
    /// elapsed since the first admit into an otherwise-empty queue.
    pub async fn should_cut(&self) -> bool {
        let state = self.state.lock().await;
        if state.operations.is_empty() {
            return false;
        }
        if state.operations.len() >= self.config.max_batch_size {
            return true;
        }
        match state.first_admit_at {
            Some(first) => first.elapsed() >= self.config.max_batch_age,
            None => false,
        }
    }

    /// Remove and return every admitted operation, resetting the age timer.
    pub async fn drain(&self) -> Vec<Operation> {
        let mut state = self.state.lock().await;
        state.first_admit_at = None;
        state.operations.drain(..).collect()
    }

    /// Restore a batch that failed to cut, preserving FIFO order ahead of
    /// anything admitted since (§4.4 "rollback on transient failure
    /// preserves the batch; the next cut retries").
    pub async fn restore(&self, operations: Vec<Operation>) {
        if operations.is_empty() {
            return;
        }
        let mut state = self.state.lock().await;
        let mut restored: VecDeque<Operation> = operations.into();
        restored.append(&mut state.operations);
        state.operations = restored;
        if state.first_admit_at.is_none() {
            state.first_admit_at = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> QueueConfig {
        QueueConfig {
            high_water_mark: 2,
            max_batch_size: 10,
            max_batch_age: Duration::from_secs(3600),
        }
    }

    fn op(suffix: &str) -> Operation {
        Operation {
            suffix: suffix.to_string(),
            operation_type: "update".to_string(),
            payload: vec![],
        }
    }

    #[tokio::test]
    async fn admit_rejects_above_high_water_mark() {
        let queue = OperationQueue::new(config());
        queue.admit(op("a")).await.unwrap();
        queue.admit(op("b")).await.unwrap();
        let err = queue.admit(op("c")).await.unwrap_err();
        assert!(err.is(orb_core::error::Kind::Transient));
    }

    #[tokio::test]
    async fn drain_then_restore_preserves_order_ahead_of_new_admits() {
        let queue = OperationQueue::new(config());
        queue.admit(op("a")).await.unwrap();
        let drained = queue.drain().await;
        assert_eq!(drained.len(), 1);

        queue.admit(op("b")).await.unwrap();
        queue.restore(drained).await;

        let all = queue.drain().await;
        assert_eq!(all[0].suffix, "a");
        assert_eq!(all[1].suffix, "b");
    }

    #[tokio::test]
    async fn should_cut_on_max_size() {
        let mut cfg = config();
        cfg.max_batch_size = 1;
        let queue = OperationQueue::new(cfg);
        assert!(!queue.should_cut().await);
        queue.admit(op("a")).await.unwrap();
        assert!(queue.should_cut().await);
    }
}
