//! API endpoints.

mod admin;
mod auth;
mod meta;
mod photos;
mod preferences;
mod reports;
mod stats;

use axum::Router;
use komuna_common::AppError;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/meta", meta::router())
        .nest("/reports", reports::router())
        .nest("/stats", stats::router())
        .nest("/photos", photos::router())
        .nest("/admin", admin::router())
        .nest("/preferences", preferences::router())
        .nest("/streaming/sse", sse::router())
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
