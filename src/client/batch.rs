//! Batched awarded-date lookups.

use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::retry::retry_rate_limited;
use crate::model::AwardRecord;

/// Fetch the award timestamp for every badge id, `batch_size` ids per
/// request.
///
/// Batches run strictly sequentially: they are independent, but the remote
/// rate limit is shared, so concurrency would only trade progress for 429s.
/// A rate-limited batch is reissued after an additively growing delay; any
/// other failure skips that batch, so its ids contribute zero records
/// instead of aborting the whole lookup.
pub fn lookup_award_dates(
    client: &ApiClient,
    user_id: u64,
    badge_ids: &[u64],
    display_name: &str,
) -> Vec<AwardRecord> {
    let config = client.config();
    let mut records: Vec<AwardRecord> = Vec::with_capacity(badge_ids.len());

    for batch in badge_ids.chunks(config.batch_size.max(1)) {
        let fetched = retry_rate_limited(&config.backoff, || {
            client.get_awarded_dates(user_id, batch)
        });
        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(
                    user_id,
                    batch_len = batch.len(),
                    error = %err,
                    "skipping awarded-dates batch"
                );
                continue;
            }
        };

        for record in fetched {
            records.push(record);
            if records.len() % config.progress_every == 0 {
                info!("{} awarded dates for {display_name} requested", records.len());
            }
        }
    }

    records
}
