//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use komuna_common::{PrefsStore, config::InstanceConfig};
use komuna_core::{
    AdminService, FeedbackService, PhotoService, ReportService, StatsService,
};

use crate::sse::ReportBroadcaster;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    pub admin_service: AdminService,
    pub stats_service: StatsService,
    pub photo_service: PhotoService,
    pub feedback_service: FeedbackService,
    pub prefs: PrefsStore,
    pub instance: InstanceConfig,
    pub broadcaster: ReportBroadcaster,
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract token from header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        // Authenticate admin by token
        if let Ok(admin) = state.admin_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(admin);
        }
    }

    next.run(req).await
}
