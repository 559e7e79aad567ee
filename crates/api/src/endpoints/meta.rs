//! Instance metadata endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::middleware::AppState;

/// Instance metadata response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub languages: Vec<String>,
}

/// Get instance metadata.
async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    Json(MetaResponse {
        name: state.instance.name.clone(),
        description: state.instance.description.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        languages: state.instance.languages.clone(),
    })
}

/// Privacy policy response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyResponse {
    pub policy: String,
}

/// Get the privacy policy text.
async fn privacy(State(state): State<AppState>) -> Json<PrivacyResponse> {
    let policy = state.instance.privacy_policy.clone().unwrap_or_else(|| {
        "Raportimet janë anonime. Të dhënat e kontaktit janë opsionale, \
         shihen vetëm nga administratorët dhe nuk publikohen kurrë."
            .to_string()
    });

    Json(PrivacyResponse { policy })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(meta))
        .route("/privacy", get(privacy))
}
