//! The task manager and expiry-service collaborators (§6).
//!
//! `RegisterTask(id, interval, fn)` and `RegisterTaskEx(id, interval, fn) ->
//! nextIntervalOverride` let a component (the batch cutter, the status
//! monitor, the proof-monitor worker) hand its periodic loop to a shared
//! scheduler instead of spawning its own `tokio::time::interval`, so a
//! bootstrap layer (out of scope, §1) can observe and stop every periodic
//! task uniformly. `Expiry::Register` wires a store's expiry tag to a
//! scheduled GC sweep (§4.7 storage).

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type TaskFn = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Run `task` every `interval`, with no feedback loop.
    async fn register_task(&self, id: &str, interval: Duration, task: TaskFn);

    /// Like `register_task`, but `task` may report how long to wait before
    /// the next tick (used by the status monitor to shorten its interval
    /// when records remain, §4.7).
    async fn register_task_ex(
        &self,
        id: &str,
        interval: Duration,
        task: Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Option<Duration>> + Send>> + Send + Sync>,
    );
}

#[async_trait]
pub trait ExpiryService: Send + Sync {
    /// Delete records in `namespace` whose `expiry_tag_name` tag is in the
    /// past. Backs the §4.7 "expiry is enforced by a scheduled GC task".
    async fn register(&self, namespace: &str, expiry_tag_name: &str);
}
