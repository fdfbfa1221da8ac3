//! Report emission: the structured per-user summary and the rendered chart.
//!
//! This is the pipeline's outward boundary. By the time the reporter runs,
//! the series is final, sorted, and classified; nothing here re-derives
//! data, it only persists and draws it.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use tracing::info;

use crate::aggregate::Aggregation;
use crate::error::Error;
use crate::model::{BadgeSummary, Category, HighlightPoint};

const CHART_SIZE: (u32, u32) = (1280, 720);
const BACKGROUND: RGBColor = RGBColor(16, 16, 16);

/// Writes both artifacts for a user into one output directory.
pub struct Reporter {
    output_dir: PathBuf,
}

impl Reporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Persist the structured summary as `<output_dir>/<user_id>.json`.
    pub fn write_summary(
        &self,
        user_id: u64,
        aggregation: &Aggregation,
    ) -> Result<PathBuf, Error> {
        let summary = BadgeSummary {
            total_badges: aggregation.series.len(),
            first_badge_date: aggregation
                .series
                .first()
                .map(|point| point.at.to_rfc3339()),
            highlight_badge_dates: aggregation
                .highlights
                .iter()
                .map(|highlight| highlight.at.to_rfc3339())
                .collect(),
        };

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{user_id}.json"));
        fs::write(&path, serde_json::to_vec(&summary)?)?;
        Ok(path)
    }

    /// Render the cumulative chart as `<output_dir>/<user_id>.svg`.
    ///
    /// Returns `None` without touching the filesystem when there are no
    /// events to draw.
    pub fn render_chart(
        &self,
        user_id: u64,
        display_name: &str,
        aggregation: &Aggregation,
    ) -> Result<Option<PathBuf>, Error> {
        let series = &aggregation.series;
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            info!(user_id, "no badge dates to chart");
            return Ok(None);
        };

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{user_id}.svg"));

        // Pad a flat range so the axis always has a drawable span.
        let (from, to) = if first.at == last.at {
            (first.at - Duration::days(1), last.at + Duration::days(1))
        } else {
            (first.at, last.at)
        };

        // Scoped so the backend's borrow of `path` ends before the return.
        {
            let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&BACKGROUND).map_err(chart_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!("Badges over time for {display_name}"),
                    ("sans-serif", 28).into_font().color(&WHITE),
                )
                .margin(16)
                .x_label_area_size(48)
                .y_label_area_size(56)
                .build_cartesian_2d(from..to, 0usize..series.len() + 1)
                .map_err(chart_error)?;

            chart
                .configure_mesh()
                .axis_style(&WHITE)
                .label_style(("sans-serif", 14).into_font().color(&WHITE))
                .x_desc("Badge earned date")
                .y_desc("Total badges")
                .draw()
                .map_err(chart_error)?;

            for (category, color) in [
                (Category::Standard, RGBAColor(0, 255, 255, 0.2)),
                (Category::HighVolumeCreator, RGBAColor(255, 0, 0, 0.4)),
            ] {
                chart
                    .draw_series(
                        series
                            .iter()
                            .filter(|point| point.category == category)
                            .map(|point| Circle::new((point.at, point.count), 3, color.filled())),
                    )
                    .map_err(chart_error)?;
            }

            // Every highlighted record is in the summary, but equal instants
            // render as one marker so the legend maps to visible points.
            let drawn = first_per_instant(&aggregation.highlights);
            if !drawn.is_empty() {
                chart
                    .draw_series(drawn.iter().map(|highlight| {
                        Circle::new((highlight.at, highlight.count), 5, GREEN.filled())
                    }))
                    .map_err(chart_error)?
                    .label("Highlighted badge")
                    .legend(|(x, y)| Circle::new((x, y), 5, GREEN.filled()));

                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::LowerRight)
                    .background_style(BACKGROUND.filled())
                    .label_font(("sans-serif", 14).into_font().color(&WHITE))
                    .draw()
                    .map_err(chart_error)?;
            }

            root.present().map_err(chart_error)?;
        }

        Ok(Some(path))
    }
}

/// The first highlight at each distinct instant, in series order.
fn first_per_instant(highlights: &[HighlightPoint]) -> Vec<&HighlightPoint> {
    let mut seen: HashSet<DateTime<Utc>> = HashSet::new();
    highlights
        .iter()
        .filter(|highlight| seen.insert(highlight.at))
        .collect()
}

fn chart_error(err: impl std::fmt::Display) -> Error {
    Error::ChartError(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::{AwardRecord, Badge};

    fn sample_aggregation() -> Aggregation {
        let records = vec![
            AwardRecord {
                badge_id: 1,
                awarded_date: "2020-01-01T00:00:00Z".to_string(),
            },
            AwardRecord {
                badge_id: 2,
                awarded_date: "2020-01-02T00:00:00.123456789Z".to_string(),
            },
            AwardRecord {
                badge_id: 3,
                awarded_date: "2019-12-31T23:59:59".to_string(),
            },
        ];
        let badges = vec![
            Badge {
                id: 1,
                name: None,
                creator_target_id: Some(100),
            },
            Badge {
                id: 2,
                name: None,
                creator_target_id: Some(100),
            },
            Badge {
                id: 3,
                name: None,
                creator_target_id: None,
            },
        ];

        aggregate(&records, &badges, &HashSet::from([2]), 70).unwrap()
    }

    #[test]
    fn writes_the_summary_artifact() {
        let dir = tempdir().unwrap();
        let reporter = Reporter::new(dir.path());

        let path = reporter.write_summary(42, &sample_aggregation()).unwrap();

        assert_eq!(path, dir.path().join("42.json"));
        let raw = fs::read_to_string(&path).unwrap();
        let summary: BadgeSummary = serde_json::from_str(&raw).unwrap();
        assert_eq!(summary.total_badges, 3);
        assert_eq!(
            summary.first_badge_date.as_deref(),
            Some("2019-12-31T23:59:59+00:00")
        );
        assert_eq!(summary.highlight_badge_dates.len(), 1);
        assert!(summary.highlight_badge_dates[0].starts_with("2020-01-02T00:00:00.123456"));
    }

    #[test]
    fn empty_series_writes_a_null_first_date_and_skips_the_chart() {
        let dir = tempdir().unwrap();
        let reporter = Reporter::new(dir.path());
        let empty = aggregate(&[], &[], &HashSet::new(), 70).unwrap();

        let summary_path = reporter.write_summary(7, &empty).unwrap();
        let chart = reporter.render_chart(7, "nobody", &empty).unwrap();

        let raw = fs::read_to_string(summary_path).unwrap();
        assert!(raw.contains("\"first_badge_date\":null"));
        assert!(chart.is_none());
        assert!(!dir.path().join("7.svg").exists());
    }

    #[test]
    fn renders_a_chart_artifact() {
        let dir = tempdir().unwrap();
        let reporter = Reporter::new(dir.path());

        let path = reporter
            .render_chart(42, "test user", &sample_aggregation())
            .unwrap()
            .expect("non-empty series should produce a chart");

        assert_eq!(path, dir.path().join("42.svg"));
        let rendered = fs::read_to_string(&path).unwrap();
        assert!(rendered.contains("<svg"));
    }

    #[test]
    fn summary_keeps_every_highlight_sharing_an_instant() {
        let dir = tempdir().unwrap();
        let reporter = Reporter::new(dir.path());
        let records = vec![
            AwardRecord {
                badge_id: 1,
                awarded_date: "2020-01-01T00:00:00Z".to_string(),
            },
            AwardRecord {
                badge_id: 2,
                awarded_date: "2020-01-01T00:00:00Z".to_string(),
            },
        ];
        let badges = vec![
            Badge {
                id: 1,
                name: None,
                creator_target_id: None,
            },
            Badge {
                id: 2,
                name: None,
                creator_target_id: None,
            },
        ];
        let aggregation = aggregate(&records, &badges, &HashSet::from([1, 2]), 70).unwrap();

        let path = reporter.write_summary(9, &aggregation).unwrap();
        let summary: BadgeSummary =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(summary.highlight_badge_dates.len(), 2);
        assert_eq!(
            summary.highlight_badge_dates[0],
            summary.highlight_badge_dates[1]
        );
        // Drawing collapses the shared instant into a single marker.
        assert_eq!(first_per_instant(&aggregation.highlights).len(), 1);
        assert!(reporter.render_chart(9, "twin", &aggregation).unwrap().is_some());
    }

    #[test]
    fn renders_a_single_event_series() {
        let dir = tempdir().unwrap();
        let reporter = Reporter::new(dir.path());
        let records = vec![AwardRecord {
            badge_id: 1,
            awarded_date: "2020-01-01T00:00:00Z".to_string(),
        }];
        let badges = vec![Badge {
            id: 1,
            name: None,
            creator_target_id: None,
        }];
        let aggregation = aggregate(&records, &badges, &HashSet::new(), 70).unwrap();

        let path = reporter.render_chart(1, "solo", &aggregation).unwrap();
        assert!(path.is_some());
    }
}
