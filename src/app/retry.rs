//! Deadlines and bounded retry for transient gateway failures.
//!
//! Only the transient class (`Network`/`Timeout`) is ever retried, and only
//! for reads: a fresh attempt re-fetches state from the gateway rather than
//! replaying anything cached, so a retried account load always observes the
//! current sequence number. Deterministic rejections pass straight through.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::domain::{AccountId, AccountSnapshot};
use crate::port::{GatewayError, LedgerGateway};

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Upper bound on the delay between attempts.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay_ms: 250,
            backoff_multiplier: 2.0,
            max_delay_ms: 2_000,
        }
    }
}

/// Bound a gateway call by a deadline.
///
/// A call that outlives the deadline surfaces as [`GatewayError::Timeout`];
/// no suspension point in the crate runs unbounded.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout {
            elapsed_ms: deadline.as_millis() as u64,
        }),
    }
}

/// Load an account, retrying transient failures under the policy.
///
/// Every attempt issues a fresh `load_account` call; the returned snapshot
/// (and its sequence number) is never reused from a failed attempt.
///
/// # Errors
///
/// The last transient error once attempts are exhausted, or the first
/// non-transient error immediately.
pub async fn load_with_retry(
    gateway: &dyn LedgerGateway,
    id: &AccountId,
    deadline: Duration,
    policy: &RetryPolicy,
) -> Result<AccountSnapshot, GatewayError> {
    let mut delay_ms = policy.initial_delay_ms;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match with_deadline(deadline, gateway.load_account(id)).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(err) if err.is_transient() && attempt < policy.attempts => {
                warn!(
                    account = %id,
                    attempt,
                    error = %err,
                    "account load failed, retrying"
                );
                sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = ((delay_ms as f64) * policy.backoff_multiplier) as u64;
                delay_ms = delay_ms.min(policy.max_delay_ms);
            }
            Err(err) => return Err(err),
        }
    }
}
