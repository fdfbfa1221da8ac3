//! Sort-then-accumulate aggregation and classification of award events.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::model::{
    AwardRecord, Badge, Category, CreatorFrequencyTable, CumulativeSeries, HighlightPoint,
    SeriesPoint,
};
use crate::util::time::parse_award_timestamp;

/// Everything the report emitter needs for one user.
#[derive(Debug)]
pub struct Aggregation {
    pub series: CumulativeSeries,
    pub creator_counts: CreatorFrequencyTable,
    pub highlights: Vec<HighlightPoint>,
}

/// Aggregate award records into a cumulative series with per-event
/// classification and the highlighted subset.
///
/// Every raw timestamp must normalize; a single unparseable record aborts
/// the pass, since a silently dropped event would corrupt the running
/// counts. The sort is stable, so equal instants keep input order and runs
/// are reproducible.
pub fn aggregate(
    records: &[AwardRecord],
    badges: &[Badge],
    highlight_badge_ids: &HashSet<u64>,
    creator_volume_threshold: usize,
) -> Result<Aggregation, Error> {
    let creator_counts = creator_frequency(badges);
    let creator_by_badge: HashMap<u64, Option<u64>> = badges
        .iter()
        .map(|badge| (badge.id, badge.creator_target_id))
        .collect();

    let mut dated: Vec<(DateTime<Utc>, &AwardRecord)> = records
        .iter()
        .map(|record| Ok((parse_award_timestamp(&record.awarded_date)?, record)))
        .collect::<Result<_, Error>>()?;
    dated.sort_by_key(|(at, _)| *at);

    let mut series: CumulativeSeries = Vec::with_capacity(dated.len());
    for (index, (at, record)) in dated.iter().enumerate() {
        let creator_volume = creator_by_badge
            .get(&record.badge_id)
            .copied()
            .flatten()
            .and_then(|creator| creator_counts.get(&creator).copied())
            .unwrap_or(0);
        let category = if creator_volume > creator_volume_threshold {
            Category::HighVolumeCreator
        } else {
            Category::Standard
        };

        series.push(SeriesPoint {
            at: *at,
            count: index + 1,
            category,
        });
    }

    let highlights = extract_highlights(&dated, &series, highlight_badge_ids);

    Ok(Aggregation {
        series,
        creator_counts,
        highlights,
    })
}

/// Count badges per creator across the full badge collection. Badges with
/// no creator id are excluded from the table.
pub fn creator_frequency(badges: &[Badge]) -> CreatorFrequencyTable {
    let mut counts = CreatorFrequencyTable::new();
    for badge in badges {
        if let Some(creator) = badge.creator_target_id {
            *counts.entry(creator).or_insert(0) += 1;
        }
    }
    counts
}

/// Every allow-listed award in series order. Records sharing an instant all
/// stay in the set; collapsing equal instants is a rendering concern.
fn extract_highlights(
    dated: &[(DateTime<Utc>, &AwardRecord)],
    series: &[SeriesPoint],
    highlight_badge_ids: &HashSet<u64>,
) -> Vec<HighlightPoint> {
    dated
        .iter()
        .enumerate()
        .filter(|(_, (_, record))| highlight_badge_ids.contains(&record.badge_id))
        .map(|(index, (at, record))| HighlightPoint {
            index,
            badge_id: record.badge_id,
            at: *at,
            count: series[index].count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn badge(id: u64, creator: Option<u64>) -> Badge {
        Badge {
            id,
            name: None,
            creator_target_id: creator,
        }
    }

    fn record(badge_id: u64, awarded_date: &str) -> AwardRecord {
        AwardRecord {
            badge_id,
            awarded_date: awarded_date.to_string(),
        }
    }

    fn reference_records() -> Vec<AwardRecord> {
        vec![
            record(1, "2020-01-01T00:00:00Z"),
            record(2, "2020-01-02T00:00:00.123456789Z"),
            record(3, "2019-12-31T23:59:59"),
        ]
    }

    fn reference_badges() -> Vec<Badge> {
        vec![
            badge(1, Some(100)),
            badge(2, Some(100)),
            badge(3, None),
        ]
    }

    #[test]
    fn sorts_and_accumulates_the_reference_example() {
        let aggregation = aggregate(
            &reference_records(),
            &reference_badges(),
            &HashSet::new(),
            70,
        )
        .unwrap();

        let series = &aggregation.series;
        assert_eq!(series.len(), 3);
        assert_eq!(
            series[0].at,
            Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 59).unwrap()
        );
        assert_eq!(
            series[1].at,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            series[2].at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            "2020-01-02T00:00:00.123456Z"
        );
        assert_eq!(
            series.iter().map(|p| p.count).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn counts_are_strictly_increasing_for_any_permutation() {
        let records = reference_records();
        let badges = reference_badges();
        let permutations: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for permutation in permutations {
            let shuffled: Vec<AwardRecord> =
                permutation.iter().map(|&i| records[i].clone()).collect();
            let aggregation = aggregate(&shuffled, &badges, &HashSet::new(), 70).unwrap();

            let counts: Vec<usize> = aggregation.series.iter().map(|p| p.count).collect();
            assert_eq!(counts, vec![1, 2, 3]);
            assert!(aggregation
                .series
                .windows(2)
                .all(|pair| pair[0].at <= pair[1].at));
        }
    }

    #[test]
    fn highlight_allow_list_matches_by_badge_id() {
        let highlight_ids = HashSet::from([2]);
        let aggregation = aggregate(
            &reference_records(),
            &reference_badges(),
            &highlight_ids,
            70,
        )
        .unwrap();

        assert_eq!(aggregation.highlights.len(), 1);
        let highlight = &aggregation.highlights[0];
        assert_eq!(highlight.badge_id, 2);
        assert_eq!(highlight.count, 3);
    }

    #[test]
    fn duplicate_instants_keep_every_allow_listed_record() {
        let records = vec![
            record(1, "2020-01-01T00:00:00Z"),
            record(2, "2020-01-01T00:00:00Z"),
        ];
        let badges = vec![badge(1, None), badge(2, None)];
        let highlight_ids = HashSet::from([1, 2]);

        let aggregation = aggregate(&records, &badges, &highlight_ids, 70).unwrap();

        let highlights = &aggregation.highlights;
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].index, 0);
        assert_eq!(highlights[1].index, 1);
        assert_eq!(highlights[0].at, highlights[1].at);
        assert_eq!(
            highlights.iter().map(|h| h.count).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn classification_uses_the_creator_frequency_threshold() {
        let mut badges: Vec<Badge> = (0..80).map(|id| badge(id, Some(500))).collect();
        badges.push(badge(1000, Some(600)));

        let records = vec![
            record(5, "2020-01-01T00:00:00Z"),
            record(1000, "2020-01-02T00:00:00Z"),
        ];

        let aggregation = aggregate(&records, &badges, &HashSet::new(), 70).unwrap();

        assert_eq!(aggregation.series[0].category, Category::HighVolumeCreator);
        assert_eq!(aggregation.series[1].category, Category::Standard);
        assert_eq!(aggregation.creator_counts.get(&500), Some(&80));
        assert_eq!(aggregation.creator_counts.get(&600), Some(&1));
    }

    #[test]
    fn frequency_table_covers_the_full_badge_collection() {
        let badges = vec![badge(1, Some(9)), badge(2, Some(9)), badge(3, None)];
        let counts = creator_frequency(&badges);

        // Badges without a creator id are excluded; the rest sum to the total.
        assert_eq!(counts.values().sum::<usize>(), 2);
        assert_eq!(counts.get(&9), Some(&2));
    }

    #[test]
    fn unparseable_record_aborts_the_pass() {
        let records = vec![record(1, "never")];
        let badges = vec![badge(1, None)];

        let result = aggregate(&records, &badges, &HashSet::new(), 70);
        assert!(matches!(result, Err(Error::DateParseError(_))));
    }

    #[test]
    fn empty_input_produces_an_empty_aggregation() {
        let aggregation = aggregate(&[], &[], &HashSet::new(), 70).unwrap();

        assert!(aggregation.series.is_empty());
        assert!(aggregation.creator_counts.is_empty());
        assert!(aggregation.highlights.is_empty());
    }
}
