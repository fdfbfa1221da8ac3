//! Pipeline configuration.
//!
//! Everything tunable lives here: endpoint host pairs, pagination and batch
//! sizing, the rate-limit backoff schedule, classification thresholds, and
//! the injected watchlist data. A [`Config`] is constructed once at startup
//! and passed into the pipeline; no module reads global state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

/// Primary and mirror host for one remote resource family.
///
/// The mirror exposes an identical contract and gets exactly one attempt
/// when the primary fails at the transport level.
#[derive(Debug, Clone)]
pub struct HostPair {
    pub primary: String,
    pub mirror: String,
}

impl HostPair {
    pub fn new(primary: impl Into<String>, mirror: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            mirror: mirror.into(),
        }
    }

    /// Both hosts pointed at the same base URL, used by tests against a mock
    /// server.
    pub fn single(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            primary: url.clone(),
            mirror: url,
        }
    }
}

/// Host pairs for each of the four remote resource families.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub users: HostPair,
    pub groups: HostPair,
    pub friends: HostPair,
    pub badges: HostPair,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            users: HostPair::new("https://users.roblox.com", "https://users.rotunnel.com"),
            groups: HostPair::new("https://groups.roblox.com", "https://groups.rotunnel.com"),
            friends: HostPair::new("https://friends.roblox.com", "https://friends.rotunnel.com"),
            badges: HostPair::new("https://badges.roblox.com", "https://badges.rotunnel.com"),
        }
    }
}

/// Delay schedule for rate-limited retries.
///
/// Attempt `k` (zero-based) sleeps `initial + k * increment` unless the
/// server supplied a `Retry-After` hint, which takes precedence. The same
/// schedule is shared by pagination and batched lookups.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub increment: Duration,
}

impl BackoffPolicy {
    /// Delay before reissuing after the given number of prior rate-limited
    /// attempts for the same unit of work.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        hint.unwrap_or(self.initial + self.increment * attempt)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(5),
            increment: Duration::from_secs(5),
        }
    }
}

/// Injected membership data: badge ids to highlight plus the allow/deny
/// lists used by the extended social checks.
///
/// These are business data, not engineering, so they default to empty and
/// are loaded from a JSON file at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Watchlist {
    /// Badge ids rendered as a highlighted subset with a legend entry.
    pub highlight_badge_ids: HashSet<u64>,
    /// Group ids flagged by the enemy-group audit.
    pub enemy_group_ids: HashSet<u64>,
    /// Usernames checked against the friends list.
    pub banished: Vec<String>,
    /// Usernames checked against the friends list.
    pub excommunicated: Vec<String>,
}

impl Watchlist {
    /// Load a watchlist from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    /// Page size requested from the badge listing endpoint.
    pub page_limit: u32,
    /// Number of badge ids per awarded-dates request.
    pub batch_size: usize,
    pub backoff: BackoffPolicy,
    /// Creators with more badges than this are classified as high-volume.
    pub creator_volume_threshold: usize,
    /// Emit a progress log line every this many items. Must be non-zero.
    pub progress_every: usize,
    /// Directory the summary and chart artifacts are written to.
    pub output_dir: PathBuf,
    pub watchlist: Watchlist,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            page_limit: 100,
            batch_size: 50,
            backoff: BackoffPolicy::default(),
            creator_volume_threshold: 70,
            progress_every: 1000,
            output_dir: PathBuf::from("graphs"),
            watchlist: Watchlist::default(),
        }
    }
}
