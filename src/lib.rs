//! Badge history timelines for users of a third-party achievement platform.
//!
//! The pipeline fetches a user's full badge list through cursor pagination,
//! resolves award timestamps through batched lookups, normalizes the
//! heterogeneous timestamp encodings the platform has emitted over the years,
//! and aggregates everything into a cumulative series that is persisted as a
//! JSON summary and rendered as a chart.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod social;
pub mod util;
