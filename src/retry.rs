use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::config::RetryConfig;

/// Computes exponential backoff with optional jitter.
#[derive(Debug, Clone)]
pub struct BackoffCalculator;

impl BackoffCalculator {
    /// Calculate backoff delay for a given attempt index (0-based).
    pub fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
        let pow = config.backoff_multiplier.powi(attempt as i32);
        let mut delay_ms = (config.initial_backoff_ms as f32 * pow) as u64;
        if delay_ms > config.max_backoff_ms {
            delay_ms = config.max_backoff_ms;
        }

        let jitter = config.jitter_factor.clamp(0.0, 1.0);
        if jitter > 0.0 {
            let mut rng = rand::rng();
            let jitter_scale: f32 = rng.random_range(-jitter..=jitter);
            let jitter_ms = (delay_ms as f32 * jitter_scale)
                .round()
                .max(-(delay_ms as f32));
            let adjusted = (delay_ms as i64 + jitter_ms as i64).max(0) as u64;
            return Duration::from_millis(adjusted);
        }

        Duration::from_millis(delay_ms)
    }
}

/// A thin async retry executor for fallible operations.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor;

impl RetryExecutor {
    /// Run `operation` up to `config.max_attempts` times.
    ///
    /// `operation(attempt)` receives the 0-based attempt index. After a failure,
    /// `should_retry(&err, attempt)` decides whether another attempt is made;
    /// when it returns false, or attempts are exhausted, the last error is
    /// returned as-is.
    pub async fn execute_with_retry<F, Fut, T, E, R>(
        config: &RetryConfig,
        mut operation: F,
        should_retry: R,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E, u32) -> bool,
    {
        let max = config.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            match operation(attempt).await {
                Ok(val) => return Ok(val),
                Err(err) => {
                    let is_last = attempt + 1 >= max;
                    if is_last || !should_retry(&err, attempt) {
                        return Err(err);
                    }

                    let next_attempt = attempt + 1;
                    let delay = BackoffCalculator::calculate_delay(config, attempt);
                    debug!(
                        attempt = attempt,
                        next_attempt = next_attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retry backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt = next_attempt;
                }
            }
        }
    }
}
