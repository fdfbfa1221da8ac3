//! Wire DTOs for the remote API and the aggregation types derived from them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One achievement type as returned by the badge listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Identifier of the creator (user or group) that published the badge.
    #[serde(default)]
    pub creator_target_id: Option<u64>,
}

/// One instance of a badge being earned, carrying the raw award timestamp
/// exactly as the server encoded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRecord {
    pub badge_id: u64,
    pub awarded_date: String,
}

/// One page of a cursor-paginated listing.
///
/// An absent `nextPageCursor` signals pagination exhaustion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    // An explicit default keeps the derive from demanding `T: Default`.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

/// Envelope of the batched awarded-dates endpoint (not paginated).
#[derive(Debug, Deserialize)]
pub struct AwardedDates {
    #[serde(default)]
    pub data: Vec<AwardRecord>,
}

/// Identity record from the users endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Account creation timestamp, raw.
    pub created: String,
}

/// One group membership from the group-roles endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembership {
    pub group: GroupSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupSummary {
    pub id: u64,
    pub name: String,
}

/// One friend entry from the friends list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Friend {
    #[serde(default)]
    pub name: Option<String>,
}

/// Envelope for the count endpoints (`{ "count": n }`).
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    #[serde(default)]
    pub count: u64,
}

/// Rendering category for one awarded badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The badge's creator published more badges than the configured
    /// threshold.
    HighVolumeCreator,
    Standard,
}

/// One entry of the cumulative series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub at: DateTime<Utc>,
    /// Running total including this event; strictly `1..=n` over the series.
    pub count: usize,
    pub category: Category,
}

/// Time-ordered cumulative view of every award event.
pub type CumulativeSeries = Vec<SeriesPoint>;

/// Count of badges published per creator across the full badge collection.
pub type CreatorFrequencyTable = HashMap<u64, usize>;

/// One highlighted award: a member of the configured allow-list.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightPoint {
    /// Index into the sorted cumulative series.
    pub index: usize,
    pub badge_id: u64,
    pub at: DateTime<Utc>,
    /// Running total at this event.
    pub count: usize,
}

/// Structured per-user summary persisted next to the chart.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BadgeSummary {
    pub total_badges: usize,
    /// RFC 3339 timestamp of the earliest award, absent when no badges.
    pub first_badge_date: Option<String>,
    /// RFC 3339 timestamps of highlighted awards, in series order.
    pub highlight_badge_dates: Vec<String>,
}
