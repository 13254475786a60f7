//! Utility functions and helpers

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::shared::errors::{DexError, DexResult};

/// Generate unique request ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Bounded attempts with a linear pause of `attempt × unit` between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    unit: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(attempts: u32, unit: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            unit,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pause after the `attempt`-th failure (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.unit * attempt
    }

    /// Re-runs `op` while it fails with `DexError::Network`; other errors and the
    /// last network error are returned as they are
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> DexResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DexResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(DexError::Network(reason)) if attempt < self.attempts => {
                    warn!(what, attempt, max = self.attempts, error = %reason, "request failed, retrying");
                    tokio::time::sleep(self.delay(attempt)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy::new(4, Duration::from_millis(250));
        assert_eq!(policy.delay(1), Duration::from_millis(250));
        assert_eq!(policy.delay(2), Duration::from_millis(500));
        assert_eq!(policy.delay(3), Duration::from_millis(750));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts(), 1);
    }

    #[tokio::test]
    async fn test_run_sleeps_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(20));
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let started = Instant::now();

        let result: DexResult<()> = policy
            .run("blockhash", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(DexError::Network("timeout".into()))
            })
            .await;

        assert_eq!(result, Err(DexError::Network("timeout".into())));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // 20ms after the first failure, 40ms after the second
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_run_recovers_and_skips_non_network_errors() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = policy
            .run("fee", || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(DexError::Network("reset".into())),
                    _ => Ok(42u64),
                }
            })
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: DexResult<()> = policy
            .run("send", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(DexError::Submission("rejected".into()))
            })
            .await;
        assert!(matches!(result, Err(DexError::Submission(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
