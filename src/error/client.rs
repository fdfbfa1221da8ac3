use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the remote resource client.
///
/// Rate limiting is deliberately not folded into the transport case: callers
/// wait out a rate-limited request on a delay schedule, while a transport
/// error has already consumed the mirror fallback by the time it is
/// returned, so there is nothing left to retry against.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network failure or 5xx, after the mirror host was also tried.
    #[error("transport failure for {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// HTTP 429; `retry_after` carries the server's hint when present.
    #[error("rate limited for {path}")]
    RateLimited {
        path: String,
        retry_after: Option<Duration>,
    },
    /// HTTP 404: the unit of work has no data, not fatal to the run.
    #[error("resource not found: {path}")]
    NotFound { path: String },
    /// Any other unexpected status code.
    #[error("unexpected status {status} for {path}")]
    UnexpectedStatus { status: StatusCode, path: String },
    /// Response body did not match the expected JSON shape.
    #[error("failed to decode response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// Whether this is a transport-level failure eligible for the mirror
    /// fallback inside the client.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The server's `Retry-After` hint, if it provided one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
