//! Public statistics endpoint.

use axum::{Router, extract::State, routing::get};
use komuna_common::AppResult;
use komuna_core::ReportStatistics;

use crate::{middleware::AppState, response::ApiResponse};

/// Aggregate statistics over all reports.
async fn stats(State(state): State<AppState>) -> AppResult<ApiResponse<ReportStatistics>> {
    Ok(ApiResponse::ok(state.stats_service.compute().await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(stats))
}
