//! Error types for the badgeline pipeline.
//!
//! Remote API failures get their own domain type in [`client`], with a retry
//! classification in [`retry`] that the paginator and batched lookup share.
//! The top-level [`Error`] aggregates everything with `thiserror` `#[from]`
//! conversions so call sites can use `?` throughout.

pub mod client;
pub mod retry;

use thiserror::Error;

use crate::error::client::ClientError;

#[derive(Error, Debug)]
pub enum Error {
    /// Remote API error (transport, rate limiting, unexpected status).
    #[error(transparent)]
    ClientError(#[from] ClientError),
    /// An award timestamp survived none of the parsing fallbacks.
    ///
    /// Fatal to the aggregation pass that requested it: a silently dropped
    /// event would corrupt the running counts, so no summary or chart is
    /// written for the affected user.
    #[error("failed to parse award timestamp: {0:?}")]
    DateParseError(String),
    /// Chart rendering failed.
    #[error("failed to render chart: {0}")]
    ChartError(String),
    /// Filesystem error while writing artifacts or reading configuration.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// JSON (de)serialization error.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}
