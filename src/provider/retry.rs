//! # Retry policy
//!
//! Module dedicated to the retry behavior of remote calls. Rate-limit
//! and transient-error characteristics differ per provider, so every
//! provider gets its own attempt count and backoff base.
//!
//! Only transient failures are retried: conflicts are resolved by the
//! caller and credential rejections abort the whole run.

use std::{future::Future, time::Duration};

use tracing::debug;

use super::{
    api::{ApiError, ApiResult},
    Provider,
};

/// The retry policy of one provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first call included.
    pub max_attempts: u8,

    /// Delay before the first retry. Doubles on every subsequent one.
    pub base_delay: Duration,

    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Return the default policy of the given provider.
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Gmail => Self {
                max_attempts: 4,
                base_delay: Duration::from_millis(250),
                max_delay: Duration::from_secs(4),
            },
            Provider::Outlook => Self {
                max_attempts: 5,
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(8),
            },
        }
    }

    /// Return the delay to observe after the given zero-based failed
    /// attempt.
    pub fn delay_for(&self, attempt: u8) -> Duration {
        let factor = 2u32.saturating_pow(attempt.into());
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run the given call, retrying transient failures according to the
/// policy. Every attempt is bounded by the caller-supplied timeout; an
/// elapsed timeout cancels the attempt and counts as transient.
pub(crate) async fn with_retry<T, F, Fut>(
    provider: Provider,
    operation: &str,
    policy: &RetryPolicy,
    call_timeout: Duration,
    call: F,
) -> ApiResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempt = 0;

    loop {
        let outcome = match tokio::time::timeout(call_timeout, call()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::Transient {
                status: None,
                message: format!("{operation} timed out after {call_timeout:?}"),
            }),
        };

        match outcome {
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                debug!("transient {provider} failure during {operation}, retrying in {delay:?}: {err}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            outcome => break outcome,
        }
    }
}
