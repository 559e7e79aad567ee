//! Aggregate statistics service.
//!
//! Everything here is computed over the public-safe projection, so the
//! statistics path can never touch reporter contact fields.

use chrono::{DateTime, Days, Utc};
use komuna_common::{AppResult, FeedbackEntry, PrefsStore, damage_estimate};
use komuna_db::entities::report::ReportStatus;
use serde::Serialize;

use crate::services::report::{PublicReport, ReportService};

/// Days covered by the submissions-over-time series.
const DAILY_SERIES_DAYS: u64 = 14;

/// Neighborhood bucket label for reports without a location.
const NO_NEIGHBORHOOD_LABEL: &str = "Pa lagje";

/// Aggregate statistics over all reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    /// Total number of reports.
    pub total: usize,
    /// Reports with status `new`.
    pub new: usize,
    /// Reports with status `in_progress`.
    pub in_progress: usize,
    /// Reports with status `resolved`.
    pub resolved: usize,
    /// Reports carrying a shared location.
    pub with_location: usize,
    /// Reports carrying a photo.
    pub with_photo: usize,
    /// Share of resolved reports, in whole percent.
    pub resolution_rate_pct: u32,
    /// Mean hours from submission to the last update of resolved reports.
    pub avg_resolution_hours: i64,
    /// Mean feedback rating, when any ratings exist.
    pub average_rating: Option<f64>,
    /// Per-neighborhood report counts, busiest first.
    pub by_neighborhood: Vec<NeighborhoodCount>,
    /// Submissions per day over the last two weeks, oldest first.
    pub daily: Vec<DailyCount>,
}

/// Report count for one neighborhood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodCount {
    /// Neighborhood name, or the no-location bucket.
    pub name: String,
    /// Number of reports.
    pub count: usize,
    /// Estimated open damage in EUR for known neighborhoods.
    pub damage_estimate_eur: Option<u32>,
}

/// Submissions on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Number of submissions.
    pub count: usize,
}

/// Statistics service.
#[derive(Clone)]
pub struct StatsService {
    report_service: ReportService,
    prefs: PrefsStore,
}

impl StatsService {
    /// Create a new statistics service.
    #[must_use]
    pub const fn new(report_service: ReportService, prefs: PrefsStore) -> Self {
        Self {
            report_service,
            prefs,
        }
    }

    /// Compute the current statistics.
    pub async fn compute(&self) -> AppResult<ReportStatistics> {
        let reports = self.report_service.all_public().await?;
        let feedback = self.prefs.all_feedback().await;
        Ok(compute_statistics(&reports, &feedback, Utc::now()))
    }
}

/// Compute statistics over a report snapshot.
///
/// Pure so the aggregation is testable without a database.
#[must_use]
pub fn compute_statistics(
    reports: &[PublicReport],
    feedback: &[FeedbackEntry],
    now: DateTime<Utc>,
) -> ReportStatistics {
    let total = reports.len();
    let count_status =
        |status: ReportStatus| reports.iter().filter(|r| r.status == status).count();

    let new = count_status(ReportStatus::New);
    let in_progress = count_status(ReportStatus::InProgress);
    let resolved = count_status(ReportStatus::Resolved);
    let with_location = reports.iter().filter(|r| r.has_location).count();
    let with_photo = reports.iter().filter(|r| r.photo_url.is_some()).count();

    let resolution_rate_pct = if total > 0 {
        ((resolved as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    let resolution_hours: Vec<i64> = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Resolved)
        .map(|r| (r.updated_at - r.created_at).num_hours())
        .collect();
    let avg_resolution_hours = if resolution_hours.is_empty() {
        0
    } else {
        resolution_hours.iter().sum::<i64>() / resolution_hours.len() as i64
    };

    let average_rating = if feedback.is_empty() {
        None
    } else {
        let sum: u32 = feedback.iter().map(|f| u32::from(f.rating)).sum();
        Some((f64::from(sum) / feedback.len() as f64 * 10.0).round() / 10.0)
    };

    ReportStatistics {
        total,
        new,
        in_progress,
        resolved,
        with_location,
        with_photo,
        resolution_rate_pct,
        avg_resolution_hours,
        average_rating,
        by_neighborhood: neighborhood_counts(reports),
        daily: daily_series(reports, now),
    }
}

fn neighborhood_counts(reports: &[PublicReport]) -> Vec<NeighborhoodCount> {
    let mut counts = std::collections::BTreeMap::<&str, usize>::new();
    for report in reports {
        let name = report
            .neighborhood
            .as_deref()
            .unwrap_or(NO_NEIGHBORHOOD_LABEL);
        *counts.entry(name).or_default() += 1;
    }

    let mut buckets: Vec<NeighborhoodCount> = counts
        .into_iter()
        .map(|(name, count)| NeighborhoodCount {
            name: name.to_string(),
            count,
            damage_estimate_eur: damage_estimate(name),
        })
        .collect();

    // Busiest first; BTreeMap iteration already settled name ties.
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

fn daily_series(reports: &[PublicReport], now: DateTime<Utc>) -> Vec<DailyCount> {
    let today = now.date_naive();

    (0..DAILY_SERIES_DAYS)
        .map(|i| {
            let date = today - Days::new(DAILY_SERIES_DAYS - 1 - i);
            let count = reports
                .iter()
                .filter(|r| r.created_at.date_naive() == date)
                .count();
            DailyCount {
                date: date.format("%Y-%m-%d").to_string(),
                count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report(
        status: ReportStatus,
        neighborhood: Option<&str>,
        created_ago_hours: i64,
        resolution_hours: i64,
    ) -> PublicReport {
        let created = Utc::now() - Duration::hours(created_ago_hours);
        let updated = created + Duration::hours(resolution_hours);
        PublicReport {
            id: format!("r{created_ago_hours}"),
            tracking_code: "A1B2C3D4".to_string(),
            title: "Titull".to_string(),
            description: "Përshkrim".to_string(),
            photo_url: None,
            has_location: neighborhood.is_some(),
            latitude: None,
            longitude: None,
            neighborhood: neighborhood.map(ToString::to_string),
            status,
            admin_note: None,
            created_at: created.into(),
            updated_at: updated.into(),
        }
    }

    fn rating(stars: u8) -> FeedbackEntry {
        FeedbackEntry {
            rating: stars,
            comment: None,
            tracking_code: "A1B2C3D4".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn empty_snapshot_yields_zeroes() {
        let stats = compute_statistics(&[], &[], Utc::now());

        assert_eq!(stats.total, 0);
        assert_eq!(stats.resolution_rate_pct, 0);
        assert_eq!(stats.avg_resolution_hours, 0);
        assert!(stats.average_rating.is_none());
        assert!(stats.by_neighborhood.is_empty());
        assert_eq!(stats.daily.len(), 14);
        assert!(stats.daily.iter().all(|d| d.count == 0));
    }

    #[test]
    fn counts_and_resolution_rate() {
        let reports = vec![
            report(ReportStatus::New, None, 1, 0),
            report(ReportStatus::InProgress, Some("Lagja Kala"), 2, 0),
            report(ReportStatus::Resolved, Some("Lagja Kala"), 50, 24),
            report(ReportStatus::Resolved, Some("Lagja Partizani"), 60, 48),
        ];

        let stats = compute_statistics(&reports, &[], Utc::now());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.with_location, 3);
        assert_eq!(stats.resolution_rate_pct, 50);
        assert_eq!(stats.avg_resolution_hours, 36);
    }

    #[test]
    fn neighborhood_buckets_are_sorted_and_priced() {
        let reports = vec![
            report(ReportStatus::New, Some("Lagja Kala"), 1, 0),
            report(ReportStatus::New, Some("Lagja Kala"), 2, 0),
            report(ReportStatus::New, Some("Lagja Partizani"), 3, 0),
            report(ReportStatus::New, None, 4, 0),
        ];

        let stats = compute_statistics(&reports, &[], Utc::now());

        assert_eq!(stats.by_neighborhood[0].name, "Lagja Kala");
        assert_eq!(stats.by_neighborhood[0].count, 2);
        assert_eq!(stats.by_neighborhood[0].damage_estimate_eur, Some(15_200));
        // The no-location bucket has no damage estimate.
        let unlocated = stats
            .by_neighborhood
            .iter()
            .find(|b| b.name == "Pa lagje")
            .unwrap();
        assert_eq!(unlocated.damage_estimate_eur, None);
    }

    #[test]
    fn daily_series_spans_fourteen_days_oldest_first() {
        let now = Utc::now();
        let reports = vec![
            report(ReportStatus::New, None, 0, 0),
            report(ReportStatus::New, None, 1, 0),
            // Far outside the window.
            report(ReportStatus::New, None, 24 * 30, 0),
        ];

        let stats = compute_statistics(&reports, &[], now);

        assert_eq!(stats.daily.len(), 14);
        assert_eq!(
            stats.daily.last().unwrap().date,
            now.date_naive().format("%Y-%m-%d").to_string()
        );
        let in_window: usize = stats.daily.iter().map(|d| d.count).sum();
        assert_eq!(in_window, 2);
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        let stats = compute_statistics(&[], &[rating(5), rating(4), rating(4)], Utc::now());
        assert_eq!(stats.average_rating, Some(4.3));
    }
}
