//! Public report endpoints: submission, tracking, feedback.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use komuna_common::{AppError, AppResult, FeedbackEntry, FeedbackOutcome};
use komuna_core::{PublicReport, SubmitFeedbackInput, SubmitReportInput};
use komuna_db::entities::report::ReportStatus;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse, sse::ReportEvent};

/// Arithmetic anti-automation challenge.
///
/// A pure deterrent: the submit endpoint checks the echoed answer, no
/// challenge state is kept server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub left: u8,
    pub right: u8,
}

/// Issue a fresh challenge.
async fn challenge() -> Json<ChallengeResponse> {
    let mut rng = rand::thread_rng();
    Json(ChallengeResponse {
        left: rng.gen_range(1..=10),
        right: rng.gen_range(1..=10),
    })
}

/// Echoed challenge answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeAnswer {
    pub left: i32,
    pub right: i32,
    pub answer: i32,
}

impl ChallengeAnswer {
    fn passed(&self) -> bool {
        self.left + self.right == self.answer
    }
}

/// Report submission request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub title: String,
    pub description: String,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub include_location: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub challenge: Option<ChallengeAnswer>,
}

/// Report submission response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportResponse {
    pub id: String,
    pub tracking_code: String,
    pub status: ReportStatus,
}

/// Submit a new report.
async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitReportRequest>,
) -> AppResult<ApiResponse<SubmitReportResponse>> {
    // The challenge gate runs before anything touches the database.
    let challenge = req.challenge.ok_or_else(|| {
        AppError::Validation("Anti-automation challenge is required".to_string())
    })?;
    if !challenge.passed() {
        return Err(AppError::Validation(
            "Anti-automation challenge failed".to_string(),
        ));
    }

    let input = SubmitReportInput {
        title: req.title,
        description: req.description,
        photo_url: req.photo_url,
        include_location: req.include_location,
        latitude: req.latitude,
        longitude: req.longitude,
        reporter_name: req.reporter_name,
        reporter_email: req.reporter_email,
        reporter_phone: req.reporter_phone,
    };

    let created = state.report_service.submit(input).await?;

    state.broadcaster.broadcast(ReportEvent::Created {
        report: created.clone().into(),
    });

    Ok(ApiResponse::ok(SubmitReportResponse {
        id: created.id,
        tracking_code: created.tracking_code,
        status: created.status,
    }))
}

/// Search a report by tracking code. Public-safe, case-insensitive.
async fn track(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<PublicReport>> {
    state
        .report_service
        .track(&code)
        .await?
        .map(ApiResponse::ok)
        .ok_or_else(|| AppError::ReportNotFound(code.trim().to_uppercase()))
}

/// The latest reports, public-safe.
async fn recent(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PublicReport>>> {
    Ok(ApiResponse::ok(state.report_service.recent_public().await?))
}

/// Stored feedback rating, read-only.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    /// Whether this rating predated the current request.
    pub already_rated: bool,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub tracking_code: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl FeedbackResponse {
    fn from_entry(entry: FeedbackEntry, already_rated: bool) -> Self {
        Self {
            already_rated,
            rating: entry.rating,
            comment: entry.comment,
            tracking_code: entry.tracking_code,
            submitted_at: entry.submitted_at,
        }
    }
}

/// Rate the resolution of a report.
async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SubmitFeedbackInput>,
) -> AppResult<ApiResponse<FeedbackResponse>> {
    let outcome = state.feedback_service.submit(&id, input).await?;

    let response = match outcome {
        FeedbackOutcome::Recorded(entry) => FeedbackResponse::from_entry(entry, false),
        FeedbackOutcome::AlreadyRated(entry) => FeedbackResponse::from_entry(entry, true),
    };

    Ok(ApiResponse::ok(response))
}

/// Stored feedback for a report, if any.
async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Option<FeedbackResponse>>> {
    Ok(ApiResponse::ok(
        state
            .feedback_service
            .get(&id)
            .await
            .map(|entry| FeedbackResponse::from_entry(entry, true)),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/challenge", get(challenge))
        .route("/recent", get(recent))
        .route("/track/{code}", get(track))
        .route("/{id}/feedback", post(submit_feedback).get(get_feedback))
}
