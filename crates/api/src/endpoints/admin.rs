//! Privileged admin endpoints: report triage and admin management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use komuna_common::AppResult;
use komuna_core::{CreateAdminInput, UpdateAdminInput, UpdateStatusInput};
use komuna_db::{
    entities::{admin::Model as AdminModel, report::Model as ReportModel, report::ReportStatus},
    repositories::ReportListFilter,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthAdmin,
    middleware::AppState,
    response::{ApiResponse, ok},
    sse::ReportEvent,
};

/// Full report record for the dashboard, reporter contact included.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReportResponse {
    pub id: String,
    pub tracking_code: String,
    pub title: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub has_location: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub neighborhood: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub status: ReportStatus,
    pub admin_note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ReportModel> for AdminReportResponse {
    fn from(r: ReportModel) -> Self {
        Self {
            id: r.id,
            tracking_code: r.tracking_code,
            title: r.title,
            description: r.description,
            photo_url: r.photo_url,
            has_location: r.has_location,
            latitude: r.latitude,
            longitude: r.longitude,
            neighborhood: r.neighborhood,
            reporter_name: r.reporter_name,
            reporter_email: r.reporter_email,
            reporter_phone: r.reporter_phone,
            status: r.status,
            admin_note: r.admin_note,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

/// Dashboard report listing filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub status: Option<ReportStatus>,
    pub search: Option<String>,
    #[serde(default)]
    pub has_photo: bool,
    #[serde(default)]
    pub has_location: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// List reports with filters.
async fn list_reports(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<Vec<AdminReportResponse>>> {
    let filter = ReportListFilter {
        status: query.status,
        search: query.search.filter(|s| !s.trim().is_empty()),
        has_photo: query.has_photo,
        has_location: query.has_location,
        limit: query.limit.min(200),
        offset: query.offset,
    };

    let reports = state.report_service.list(&filter).await?;

    Ok(ApiResponse::ok(
        reports.into_iter().map(AdminReportResponse::from).collect(),
    ))
}

/// Get one full report record.
async fn get_report(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminReportResponse>> {
    let report = state.report_service.get(&id).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Apply a status transition.
async fn update_status(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<ApiResponse<AdminReportResponse>> {
    let updated = state.report_service.update_status(&id, input).await?;

    tracing::info!(
        report_id = %updated.id,
        status = ?updated.status,
        admin = %admin.email,
        "Report status updated"
    );

    state.broadcaster.broadcast(ReportEvent::Updated {
        report: updated.clone().into(),
    });

    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a report.
async fn delete_report(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.report_service.delete(&id).await?;

    tracing::info!(report_id = %id, admin = %admin.email, "Report deleted");

    state
        .broadcaster
        .broadcast(ReportEvent::Deleted { id });

    Ok(ok())
}

/// Admin account, credentials omitted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_super_admin: bool,
    pub created_by: Option<String>,
    pub created_at: String,
}

impl From<AdminModel> for AdminResponse {
    fn from(a: AdminModel) -> Self {
        Self {
            id: a.id,
            email: a.email,
            full_name: a.full_name,
            is_super_admin: a.is_super_admin,
            created_by: a.created_by,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// List admin accounts. Superadmins only.
async fn list_admins(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AdminResponse>>> {
    let admins = state.admin_service.list(&admin).await?;
    Ok(ApiResponse::ok(
        admins.into_iter().map(AdminResponse::from).collect(),
    ))
}

/// Create an admin account. Superadmins only.
async fn create_admin(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAdminInput>,
) -> AppResult<ApiResponse<AdminResponse>> {
    let created = state.admin_service.create(input, &admin).await?;
    Ok(ApiResponse::ok(created.into()))
}

/// Update an admin account. Superadmins only.
async fn update_admin(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAdminInput>,
) -> AppResult<ApiResponse<AdminResponse>> {
    let updated = state.admin_service.update(&id, input, &admin).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Delete an admin account. Superadmins only, never yourself.
async fn delete_admin(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.admin_service.delete(&id, &admin).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/{id}", get(get_report).delete(delete_report))
        .route("/reports/{id}/status", post(update_status))
        .route("/admins", get(list_admins).post(create_admin))
        .route("/admins/{id}", post(update_admin).delete(delete_admin))
}
