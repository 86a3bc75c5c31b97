use std::future::Future;
use std::iter;
use std::time::Duration;
use tracing::{error, warn};

/// Backoff policy for the startup connection.
///
/// After a failed attempt the caller waits `initial_delay`, and each
/// following wait doubles, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts allowed after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// The waits between attempts, in order
    fn delays(self) -> impl Iterator<Item = Duration> {
        iter::successors(Some(self.initial_delay.min(self.max_delay)), move |delay| {
            Some((*delay * 2).min(self.max_delay))
        })
        .take(self.max_retries as usize)
    }
}

/// Run `operation` until it succeeds or the policy's waits run out.
///
/// The error of the final attempt is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delays = config.delays();
    let mut attempt: u32 = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(delay) = delays.next() else {
            error!(attempts = attempt, error = %err, "Giving up on connection");
            return Err(err);
        };

        warn!(attempt, ?delay, error = %err, "Connection attempt failed, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
