//! A cooperative cancellation token (§5: "parallel preemptive tasks with
//! cooperative cancellation via a context token"). Every suspension point
//! (network I/O, store query, timer) accepts one of these and races it
//! against the real work; firing returns a [`crate::error::Kind::Cancelled`]
//! error with no retry.

use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: std::sync::atomic::AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner
            .cancelled
            .store(true, std::sync::atomic::Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Resolves once `cancel()` has been called.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }

    /// Race `fut` against cancellation, per §5 "every network I/O ... may
    /// block and must honor the context".
    pub async fn race<F, T>(&self, fut: F) -> crate::error::Result<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(crate::error::OrbError::cancelled()),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn race_returns_cancelled_error() {
        let token = CancelToken::new();
        let token2 = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            token2.cancel();
        });
        let result = token
            .race(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                42
            })
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is(crate::error::Kind::Cancelled));
    }

    #[tokio::test]
    async fn race_returns_value_when_not_cancelled() {
        let token = CancelToken::new();
        let result = token.race(async { 7 }).await.unwrap();
        assert_eq!(result, 7);
    }
}
