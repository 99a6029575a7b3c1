//! Bounded retry that carries an exclusion list between attempts, so a
//! generator is never offered a name that already failed.

use log::debug;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Linear backoff: attempt `k` (1-based) waits `k * backoff` before the next.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

/// Anything an attempt can fail with; a failure may name what it rejected.
pub trait ExcludableFailure {
    fn rejected_name(&self) -> Option<&str>;
}

/// Runs `op` until it succeeds or `policy.max_attempts` is reached. Each
/// attempt receives the exclusion list grown by every earlier failure.
/// On exhaustion returns all failures in attempt order.
pub async fn retry_with_exclusions<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut exclusions: Vec<String>,
    mut op: F,
) -> Result<T, Vec<E>>
where
    E: ExcludableFailure,
    F: FnMut(u32, Vec<String>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = Vec::new();

    for attempt in 1..=policy.max_attempts {
        match op(attempt, exclusions.clone()).await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                if let Some(name) = failure.rejected_name() {
                    if !exclusions.iter().any(|n| n == name) {
                        exclusions.push(name.to_string());
                    }
                }
                failures.push(failure);

                if attempt < policy.max_attempts && !policy.backoff.is_zero() {
                    let wait = policy.backoff * attempt;
                    debug!("Attempt {} failed, retrying in {:?}", attempt, wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    Err(failures)
}
