use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use color_eyre::eyre::Result;

/// Bounded exponential backoff applied to destination write calls.
///
/// Delay before retry `n` (0-indexed) is `min(initial_delay * factor^n, max_delay)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub factor: f32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_delay: Duration::from_secs(5),
            factor: 2.0,
            max_delay: Duration::from_secs(600),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without sleeping, for tests.
    #[cfg(test)]
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            factor: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries)
    }

    /// Run `operation` until it succeeds or the retries are used up.
    ///
    /// Returns the last error when every attempt failed.
    pub async fn run<T, F, Fut>(&self, label: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        operation
            .retry(self.backoff())
            .sleep(tokio::time::sleep)
            .notify(|err, delay: Duration| {
                tracing::warn!(
                    "Retrying {} in {}: {}",
                    label,
                    humantime::format_duration(delay),
                    err
                );
            })
            .await
    }
}
