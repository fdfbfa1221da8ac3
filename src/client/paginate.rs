//! Cursor-driven pagination over the badge listing.

use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::retry::retry_rate_limited;
use crate::model::Badge;

/// Collect every badge for a user by following continuation cursors until
/// the server stops returning one or a page comes back empty.
///
/// A rate-limited page is reissued on the configured backoff schedule. Any
/// other failure abandons pagination and returns what was accumulated so
/// far; a partial badge list is still useful output.
pub fn collect_badges(client: &ApiClient, user_id: u64, display_name: &str) -> Vec<Badge> {
    let config = client.config();
    let mut badges: Vec<Badge> = Vec::new();
    let mut cursor: Option<String> = None;

    info!("loading badges for {display_name}");
    loop {
        let page = retry_rate_limited(&config.backoff, || {
            client.get_badge_page(user_id, cursor.as_deref())
        });
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                warn!(
                    user_id,
                    error = %err,
                    collected = badges.len(),
                    "abandoning badge pagination, keeping partial results"
                );
                break;
            }
        };

        if page.data.is_empty() {
            break;
        }

        for badge in page.data {
            badges.push(badge);
            if badges.len() % config.progress_every == 0 {
                info!("{} badges for {display_name} requested", badges.len());
            }
        }

        match page.next_page_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(user_id, total = badges.len(), "badge pagination complete");
    badges
}

#[cfg(test)]
mod tests {
    use mockito::Server;

    use super::*;
    use crate::util::test::mock::{mock_badge_page, mock_badge_page_error};
    use crate::util::test::setup::test_client;

    fn badges(ids: std::ops::Range<u64>) -> Vec<Badge> {
        ids.map(|id| Badge {
            id,
            name: None,
            creator_target_id: None,
        })
        .collect()
    }

    #[test]
    fn concatenates_pages_in_order_until_cursor_exhaustion() {
        let mut server = Server::new();
        let client = test_client(&server.url());

        let first = mock_badge_page(&mut server, 7, None, &badges(0..3), Some("a"));
        let second = mock_badge_page(&mut server, 7, Some("a"), &badges(3..6), Some("b"));
        // Final partial page with a null cursor.
        let last = mock_badge_page(&mut server, 7, Some("b"), &badges(6..8), None);

        let collected = collect_badges(&client, 7, "test user");

        first.assert();
        second.assert();
        last.assert();
        let ids: Vec<u64> = collected.iter().map(|badge| badge.id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn stops_on_empty_page_even_with_cursor_present() {
        let mut server = Server::new();
        let client = test_client(&server.url());

        let first = mock_badge_page(&mut server, 7, None, &badges(0..2), Some("a"));
        let empty = mock_badge_page(&mut server, 7, Some("a"), &[], Some("b"));

        let collected = collect_badges(&client, 7, "test user");

        first.assert();
        empty.assert();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn mid_pagination_failure_returns_partial_results() {
        let mut server = Server::new();
        let client = test_client(&server.url());

        let first = mock_badge_page(&mut server, 7, None, &badges(0..3), Some("a"));
        // Second page fails on both hosts of the pair (same server, two hits).
        let failing = mock_badge_page_error(&mut server, 7, Some("a"), 500, 2);

        let collected = collect_badges(&client, 7, "test user");

        first.assert();
        failing.assert();
        assert_eq!(collected.len(), 3);
    }
}
