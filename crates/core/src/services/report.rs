//! Report service.

use chrono::Utc;
use komuna_common::{
    AppError, AppResult, IdGenerator, is_valid_tracking_code, resolve_neighborhood,
};
use komuna_db::{
    entities::report::{self, ReportStatus},
    repositories::{AdminRepository, ReportListFilter, ReportRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::email::{EmailService, ReportNotification};

/// Attempts at allocating a fresh tracking code before giving up.
const MAX_TRACKING_CODE_ATTEMPTS: u32 = 5;

/// Default size of the public recent-reports listing.
pub const RECENT_REPORTS_LIMIT: u64 = 20;

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    admin_repo: AdminRepository,
    email_service: EmailService,
    id_gen: IdGenerator,
}

/// Input for an anonymous report submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 4000))]
    pub description: String,

    /// Public URL previously returned by the photo upload endpoint.
    #[validate(length(max = 1024))]
    pub photo_url: Option<String>,

    /// Whether the reporter chose to share a location.
    #[serde(default)]
    pub include_location: bool,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[validate(length(max = 256))]
    pub reporter_name: Option<String>,

    #[validate(email)]
    pub reporter_email: Option<String>,

    #[validate(length(max = 64))]
    pub reporter_phone: Option<String>,
}

impl SubmitReportInput {
    /// Trim every text field and collapse blank optionals to `None`.
    fn normalized(mut self) -> Self {
        fn clean(field: Option<String>) -> Option<String> {
            field
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }

        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.photo_url = clean(self.photo_url);
        self.reporter_name = clean(self.reporter_name);
        self.reporter_email = clean(self.reporter_email);
        self.reporter_phone = clean(self.reporter_phone);
        self
    }
}

/// Input for an admin status transition.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusInput {
    /// New lifecycle status.
    pub status: ReportStatus,

    /// Resolution note, kept on the record when present.
    #[validate(length(max = 4000))]
    pub admin_note: Option<String>,
}

/// The public-safe projection of a report.
///
/// This type is the application-layer enforcement of the public/private
/// split: it has no reporter contact fields, so the anonymous-facing
/// paths cannot leak them by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicReport {
    pub id: String,
    pub tracking_code: String,
    pub title: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub has_location: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub neighborhood: Option<String>,
    pub status: ReportStatus,
    pub admin_note: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<report::Model> for PublicReport {
    fn from(r: report::Model) -> Self {
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
            status: r.status,
            admin_note: r.admin_note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        admin_repo: AdminRepository,
        email_service: EmailService,
    ) -> Self {
        Self {
            report_repo,
            admin_repo,
            email_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new citizen report.
    ///
    /// Validates the input, resolves the neighborhood server-side when a
    /// location is shared, allocates a unique tracking code, inserts the
    /// record, and fires the admin notification without waiting on it.
    pub async fn submit(&self, input: SubmitReportInput) -> AppResult<report::Model> {
        let input = input.normalized();
        input.validate()?;

        // A location counts only when both coordinates actually arrived.
        let has_location =
            input.include_location && input.latitude.is_some() && input.longitude.is_some();
        let (latitude, longitude) = if has_location {
            (input.latitude, input.longitude)
        } else {
            (None, None)
        };
        let neighborhood = match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(resolve_neighborhood(lat, lng).to_string()),
            _ => None,
        };

        let tracking_code = self.allocate_tracking_code().await?;
        let now = Utc::now();

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            tracking_code: Set(tracking_code),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            photo_url: Set(input.photo_url),
            has_location: Set(has_location),
            latitude: Set(latitude),
            longitude: Set(longitude),
            neighborhood: Set(neighborhood),
            reporter_name: Set(input.reporter_name),
            reporter_email: Set(input.reporter_email),
            reporter_phone: Set(input.reporter_phone),
            status: Set(ReportStatus::New),
            admin_note: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.report_repo.create(model).await?;
        self.spawn_notification(&created);

        Ok(created)
    }

    /// Allocate a tracking code not yet present among existing reports.
    async fn allocate_tracking_code(&self) -> AppResult<String> {
        for _ in 0..MAX_TRACKING_CODE_ATTEMPTS {
            let code = self.id_gen.generate_tracking_code();
            if self
                .report_repo
                .find_by_tracking_code(&code)
                .await?
                .is_none()
            {
                return Ok(code);
            }
        }

        Err(AppError::Internal(
            "Failed to allocate a unique tracking code".to_string(),
        ))
    }

    /// Notify all admins about a new report on a detached task.
    ///
    /// Failure is logged and swallowed: the submission already succeeded
    /// and must not be affected.
    fn spawn_notification(&self, created: &report::Model) {
        if !self.email_service.is_enabled() {
            return;
        }

        let admin_repo = self.admin_repo.clone();
        let email_service = self.email_service.clone();
        let notification = ReportNotification {
            title: created.title.clone(),
            description: created.description.clone(),
            tracking_code: created.tracking_code.clone(),
            neighborhood: created.neighborhood.clone(),
            has_location: created.has_location,
            reporter_name: created.reporter_name.clone(),
        };

        tokio::spawn(async move {
            let admins = match admin_repo.list().await {
                Ok(admins) => admins,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load admins for report notification");
                    return;
                }
            };

            let recipients: Vec<String> = admins.into_iter().map(|a| a.email).collect();
            if recipients.is_empty() {
                tracing::debug!("No admins to notify");
                return;
            }

            match email_service
                .send_report_notification(recipients, &notification)
                .await
            {
                Ok(result) if !result.success => {
                    tracing::warn!(
                        tracking_code = %notification.tracking_code,
                        error = ?result.error,
                        "Report notification was rejected by the email provider"
                    );
                }
                Ok(_) => {
                    tracing::info!(
                        tracking_code = %notification.tracking_code,
                        "Report notification sent"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        tracking_code = %notification.tracking_code,
                        error = %e,
                        "Failed to send report notification"
                    );
                }
            }
        });
    }

    /// Public-safe lookup by tracking code, case-insensitive.
    pub async fn track(&self, code: &str) -> AppResult<Option<PublicReport>> {
        let code = code.trim().to_uppercase();

        // Malformed codes cannot match anything; skip the query.
        if !is_valid_tracking_code(&code) {
            return Ok(None);
        }

        Ok(self
            .report_repo
            .find_by_tracking_code(&code)
            .await?
            .map(PublicReport::from))
    }

    /// The most recent reports, public-safe.
    pub async fn recent_public(&self) -> AppResult<Vec<PublicReport>> {
        Ok(self
            .report_repo
            .recent(RECENT_REPORTS_LIMIT)
            .await?
            .into_iter()
            .map(PublicReport::from)
            .collect())
    }

    /// Every report, public-safe. Used by the statistics service.
    pub async fn all_public(&self) -> AppResult<Vec<PublicReport>> {
        Ok(self
            .report_repo
            .all()
            .await?
            .into_iter()
            .map(PublicReport::from)
            .collect())
    }

    /// Get a full report record. Privileged path.
    pub async fn get(&self, id: &str) -> AppResult<report::Model> {
        self.report_repo.get_by_id(id).await
    }

    /// List full report records with filters. Privileged path.
    pub async fn list(&self, filter: &ReportListFilter) -> AppResult<Vec<report::Model>> {
        self.report_repo.list(filter).await
    }

    /// Apply a status transition with an optional resolution note.
    pub async fn update_status(
        &self,
        id: &str,
        input: UpdateStatusInput,
    ) -> AppResult<report::Model> {
        input.validate()?;

        let existing = self.report_repo.get_by_id(id).await?;
        let mut active: report::ActiveModel = existing.into();

        active.status = Set(input.status);
        if let Some(note) = input
            .admin_note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        {
            active.admin_note = Set(Some(note));
        }
        active.updated_at = Set(Utc::now().into());

        self.report_repo.update(active).await
    }

    /// Delete a report. Privileged path, explicit admin action only.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.report_repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service_with(db: sea_orm::DatabaseConnection) -> ReportService {
        let db = Arc::new(db);
        ReportService::new(
            ReportRepository::new(Arc::clone(&db)),
            AdminRepository::new(db),
            EmailService::new(None),
        )
    }

    fn empty_db_service() -> ReportService {
        service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn sample_input() -> SubmitReportInput {
        SubmitReportInput {
            title: "Gropë në rrugë".to_string(),
            description: "Gropë e madhe para shkollës".to_string(),
            photo_url: None,
            include_location: false,
            latitude: None,
            longitude: None,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
        }
    }

    fn sample_model() -> report::Model {
        report::Model {
            id: "01jreport0000000000000000a".to_string(),
            tracking_code: "A1B2C3D4".to_string(),
            title: "Gropë në rrugë".to_string(),
            description: "Gropë e madhe para shkollës".to_string(),
            photo_url: None,
            has_location: false,
            latitude: None,
            longitude: None,
            neighborhood: None,
            reporter_name: Some("Arben Hoxha".to_string()),
            reporter_email: Some("arben@example.com".to_string()),
            reporter_phone: Some("+355671234567".to_string()),
            status: ReportStatus::New,
            admin_note: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_any_query() {
        let service = empty_db_service();
        let input = SubmitReportInput {
            title: "   ".to_string(),
            ..sample_input()
        };

        // A mock database with no prepared results turns any query into a
        // Database error, so a Validation error proves nothing was queried.
        let err = service.submit(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_description_is_rejected_before_any_query() {
        let service = empty_db_service();
        let input = SubmitReportInput {
            description: String::new(),
            ..sample_input()
        };

        let err = service.submit(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_reporter_email_is_rejected() {
        let service = empty_db_service();
        let input = SubmitReportInput {
            reporter_email: Some("not-an-email".to_string()),
            ..sample_input()
        };

        let err = service.submit(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_resolves_neighborhood_server_side() {
        // First result: tracking-code uniqueness probe (empty), then the
        // inserted row coming back from the INSERT .. RETURNING.
        let mut inserted = sample_model();
        inserted.has_location = true;
        inserted.latitude = Some(41.1098);
        inserted.longitude = Some(20.0789);
        inserted.neighborhood = Some("Lagja Kala".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<report::Model>::new()])
            .append_query_results([[inserted]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = service_with(db);
        let input = SubmitReportInput {
            include_location: true,
            latitude: Some(41.1098),
            longitude: Some(20.0789),
            ..sample_input()
        };

        let created = service.submit(input).await.unwrap();
        assert!(created.has_location);
        assert_eq!(created.neighborhood.as_deref(), Some("Lagja Kala"));
    }

    #[tokio::test]
    async fn location_without_coordinates_is_dropped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<report::Model>::new()])
            .append_query_results([[sample_model()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = service_with(db);
        let input = SubmitReportInput {
            include_location: true,
            latitude: Some(41.1098),
            longitude: None,
            ..sample_input()
        };

        let created = service.submit(input).await.unwrap();
        assert!(!created.has_location);
        assert!(created.neighborhood.is_none());
    }

    #[tokio::test]
    async fn tracking_code_collision_retries() {
        // First probe hits an existing report, the second one is free.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[sample_model()]])
            .append_query_results([Vec::<report::Model>::new()])
            .append_query_results([[sample_model()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = service_with(db);
        let created = service.submit(sample_input()).await.unwrap();
        assert_eq!(created.tracking_code, "A1B2C3D4");
    }

    #[tokio::test]
    async fn track_with_malformed_code_skips_the_query() {
        // No prepared results: a query would error, None proves the
        // shape check short-circuited.
        let service = empty_db_service();
        let result = service.track("too-short").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn track_miss_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<report::Model>::new()])
            .into_connection();

        let service = service_with(db);
        let result = service.track("ZZZZZZZZ").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_status_keeps_note_and_touches_updated_at() {
        let existing = sample_model();
        let mut updated = sample_model();
        updated.status = ReportStatus::Resolved;
        updated.admin_note = Some("Llamba u zëvendësua".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .append_query_results([[updated]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = service_with(db);
        let result = service
            .update_status(
                "01jreport0000000000000000a",
                UpdateStatusInput {
                    status: ReportStatus::Resolved,
                    admin_note: Some("  Llamba u zëvendësua  ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, ReportStatus::Resolved);
        assert_eq!(result.admin_note.as_deref(), Some("Llamba u zëvendësua"));
    }

    #[test]
    fn public_projection_never_exposes_reporter_contact() {
        let public = PublicReport::from(sample_model());
        let json = serde_json::to_value(&public).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();

        assert!(keys.iter().all(|k| !k.to_lowercase().contains("reporter")));
        assert_eq!(json["trackingCode"], "A1B2C3D4");
    }
}
