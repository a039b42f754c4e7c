use std::{future::Future, time::Duration};

use tracing::{debug, warn};

use super::FetchError;

/// Fixed-delay retry for transient fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Runs `call` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts. The last transient failure is reported as
/// [`FetchError::Unavailable`].
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match call().await {
            Err(FetchError::Connection(source)) => {
                warn!("Forecast fetch attempt {attempt}/{max_attempts} failed: {source}");

                if attempt >= max_attempts {
                    return Err(FetchError::Unavailable { attempts: attempt, source });
                }

                debug!("Retrying in {:.1}s", policy.delay.as_secs_f64());
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
