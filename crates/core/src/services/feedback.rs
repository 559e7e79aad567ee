//! Feedback rating service.
//!
//! Ratings live in the local preferences store, keyed by report ID.
//! Submission is idempotent per report: the first rating wins and later
//! submissions get the stored one back read-only.

use chrono::Utc;
use komuna_common::{
    AppError, AppResult, FeedbackEntry, FeedbackOutcome, PrefsStore,
};
use komuna_db::{entities::report::ReportStatus, repositories::ReportRepository};
use serde::Deserialize;
use validator::Validate;

/// Feedback service.
#[derive(Clone)]
pub struct FeedbackService {
    report_repo: ReportRepository,
    prefs: PrefsStore,
}

/// Input for a feedback submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackInput {
    /// Star rating.
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,

    /// Optional free-text comment.
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl FeedbackService {
    /// Create a new feedback service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository, prefs: PrefsStore) -> Self {
        Self { report_repo, prefs }
    }

    /// Submit a rating for a resolved report.
    pub async fn submit(
        &self,
        report_id: &str,
        input: SubmitFeedbackInput,
    ) -> AppResult<FeedbackOutcome> {
        input.validate()?;

        let report = self.report_repo.get_by_id(report_id).await?;
        if report.status != ReportStatus::Resolved {
            return Err(AppError::BadRequest(
                "Only resolved reports can be rated".to_string(),
            ));
        }

        let entry = FeedbackEntry {
            rating: input.rating,
            comment: input
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            tracking_code: report.tracking_code,
            submitted_at: Utc::now(),
        };

        self.prefs.record_feedback(report_id, entry).await
    }

    /// Stored rating for a report, if any.
    pub async fn get(&self, report_id: &str) -> Option<FeedbackEntry> {
        self.prefs.feedback_for(report_id).await
    }
}
