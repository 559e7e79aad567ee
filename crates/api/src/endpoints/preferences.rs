//! Preferences endpoints.
//!
//! Thin HTTP surface over the process-wide preferences store: one read
//! path, one dispatch-update path.

use axum::{Json, Router, extract::State, routing::get};
use komuna_common::{AppResult, UiPreferences, UiPreferencesUpdate};

use crate::{middleware::AppState, response::ApiResponse};

/// Current UI preferences.
async fn get_preferences(State(state): State<AppState>) -> ApiResponse<UiPreferences> {
    ApiResponse::ok(state.prefs.ui().await)
}

/// Apply a partial preferences update.
async fn update_preferences(
    State(state): State<AppState>,
    Json(update): Json<UiPreferencesUpdate>,
) -> AppResult<ApiResponse<UiPreferences>> {
    Ok(ApiResponse::ok(state.prefs.dispatch(update).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_preferences).post(update_preferences))
}
