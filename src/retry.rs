//! Bounded retry around a single transport call.
//!
//! Retries only on a retryable result (HTTP status >= 500). Transport
//! errors and non-5xx responses end the loop immediately. When the attempt
//! budget runs out the last-received result is returned as-is; the caller's
//! normal response classification decides what to do with it.

use rand::Rng;
use std::time::Duration;

/// A call outcome that may warrant another attempt.
pub(crate) trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for reqwest::blocking::Response {
    fn is_retryable(&self) -> bool {
        self.status().as_u16() >= 500
    }
}

impl Retryable for reqwest::Response {
    fn is_retryable(&self) -> bool {
        self.status().as_u16() >= 500
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy for one dispatch: `max_retries` total attempts (1 = no
    /// retry), random exponential wait bounded to `[1, timeout]` seconds.
    pub fn bounded(max_retries: u32, timeout_secs: u64) -> Self {
        Self {
            max_attempts: max_retries.max(1),
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    /// Random exponential backoff: uniform over `[min, min * 2^attempt]`,
    /// capped at `max`.
    fn backoff(&self, attempt: u32) -> Duration {
        let min_ms = self.min_delay.as_millis() as u64;
        let cap_ms = self.max_delay.as_millis() as u64;
        let exp_ms = min_ms
            .saturating_mul(1u64 << attempt.min(20))
            .min(cap_ms);
        let low_ms = min_ms.min(exp_ms);
        let wait_ms = rand::thread_rng().gen_range(low_ms..=exp_ms.max(low_ms));
        Duration::from_millis(wait_ms)
    }

    /// Blocking runner.
    pub fn run<T, E, F>(&self, mut call: F) -> Result<T, E>
    where
        T: Retryable,
        F: FnMut() -> Result<T, E>,
    {
        let mut attempt = 0;
        loop {
            let result = call()?;
            attempt += 1;
            if result.is_retryable() && attempt < self.max_attempts {
                let wait = self.backoff(attempt);
                tracing::debug!(attempt, wait_ms = wait.as_millis() as u64, "retrying after server error");
                std::thread::sleep(wait);
                continue;
            }
            return Ok(result);
        }
    }

    /// Cooperative runner with identical semantics.
    pub async fn run_async<T, E, F, Fut>(&self, mut call: F) -> Result<T, E>
    where
        T: Retryable,
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            let result = call().await?;
            attempt += 1;
            if result.is_retryable() && attempt < self.max_attempts {
                let wait = self.backoff(attempt);
                tracing::debug!(attempt, wait_ms = wait.as_millis() as u64, "retrying after server error");
                tokio::time::sleep(wait).await;
                continue;
            }
            return Ok(result);
        }
    }
}
