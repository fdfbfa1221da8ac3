use std::thread;

use tracing::debug;

use crate::config::BackoffPolicy;
use crate::error::client::ClientError;

/// Strategy for handling a client error in a retry context.
pub enum ErrorRetryStrategy {
    /// Sleep per the backoff policy and reissue the same request.
    Backoff,
    /// Failed permanently for this unit of work.
    Fail,
}

impl ClientError {
    /// Determine the retry strategy for this error.
    ///
    /// Transport errors have already consumed the mirror fallback inside the
    /// client, and 404 or an unexpected status will not change on reissue.
    /// Only rate limiting is worth waiting out.
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            ClientError::RateLimited { .. } => ErrorRetryStrategy::Backoff,
            ClientError::Transport { .. } => ErrorRetryStrategy::Fail,
            ClientError::NotFound { .. } => ErrorRetryStrategy::Fail,
            ClientError::UnexpectedStatus { .. } => ErrorRetryStrategy::Fail,
            ClientError::Decode { .. } => ErrorRetryStrategy::Fail,
        }
    }
}

/// Reissue `op` for as long as it reports rate limiting, sleeping per
/// `policy` between attempts.
///
/// The attempt counter is scoped to this one unit of work (one page, one
/// batch), so the additive delay resets when the caller moves on. Any
/// non-rate-limit error is returned to the caller unchanged.
pub fn retry_rate_limited<T>(
    policy: &BackoffPolicy,
    mut op: impl FnMut() -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    let mut attempt: u32 = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => match err.to_retry_strategy() {
                ErrorRetryStrategy::Backoff => {
                    let delay = policy.delay_for(attempt, err.retry_after());
                    debug!(attempt, ?delay, "rate limited, backing off");
                    thread::sleep(delay);
                    attempt += 1;
                }
                ErrorRetryStrategy::Fail => return Err(err),
            },
        }
    }
}
