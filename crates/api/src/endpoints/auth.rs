//! Admin authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use komuna_common::AppResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthAdmin, middleware::AppState, response::ApiResponse};

/// Signin request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_super_admin: bool,
    pub token: String,
}

/// Sign in to an admin account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SigninResponse>> {
    req.validate()?;

    let admin = state.admin_service.signin(&req.email, &req.password).await?;

    Ok(ApiResponse::ok(SigninResponse {
        id: admin.id,
        email: admin.email,
        full_name: admin.full_name,
        is_super_admin: admin.is_super_admin,
        token: admin.token.unwrap_or_default(),
    }))
}

/// Signout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out (rotate the token so the current one stops working).
async fn signout(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.admin_service.signout(&admin.id).await?;

    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
