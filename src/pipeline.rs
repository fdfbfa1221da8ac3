//! Per-user orchestration: fetch, normalize, aggregate, report.

use std::path::PathBuf;

use tracing::info;

use crate::aggregate::aggregate;
use crate::client::batch::lookup_award_dates;
use crate::client::paginate::collect_badges;
use crate::client::ApiClient;
use crate::error::Error;
use crate::report::Reporter;

/// Artifacts produced by a successful run.
#[derive(Debug)]
pub struct RunArtifacts {
    pub summary_path: PathBuf,
    pub chart_path: Option<PathBuf>,
    pub total_badges: usize,
    pub highlighted: usize,
}

/// Run the full pipeline for one user.
///
/// Transport and rate-limit failures are absorbed close to their call
/// sites, so what reaches this level is either a finished run or a
/// parse/aggregation error, in which case no artifacts are written for the
/// user.
pub fn process_user(
    client: &ApiClient,
    reporter: &Reporter,
    user_id: u64,
    display_name: &str,
) -> Result<RunArtifacts, Error> {
    let badges = collect_badges(client, user_id, display_name);
    info!(user_id, total = badges.len(), "badge listing complete");

    let badge_ids: Vec<u64> = badges.iter().map(|badge| badge.id).collect();
    let records = lookup_award_dates(client, user_id, &badge_ids, display_name);
    info!(user_id, total = records.len(), "award date lookup complete");

    let config = client.config();
    let aggregation = aggregate(
        &records,
        &badges,
        &config.watchlist.highlight_badge_ids,
        config.creator_volume_threshold,
    )?;

    let summary_path = reporter.write_summary(user_id, &aggregation)?;
    let chart_path = reporter.render_chart(user_id, display_name, &aggregation)?;
    info!("completed run for {display_name}");

    Ok(RunArtifacts {
        summary_path,
        chart_path,
        total_badges: aggregation.series.len(),
        highlighted: aggregation.highlights.len(),
    })
}
