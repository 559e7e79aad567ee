//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, ReportStatus},
};
use komuna_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Filters for the privileged report listing.
#[derive(Debug, Clone, Default)]
pub struct ReportListFilter {
    /// Only reports with this status.
    pub status: Option<ReportStatus>,
    /// Free-text match against title or tracking code.
    pub search: Option<String>,
    /// Only reports with an attached photo.
    pub has_photo: bool,
    /// Only reports with a shared location.
    pub has_location: bool,
    /// Page size.
    pub limit: u64,
    /// Page offset.
    pub offset: u64,
}

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::ReportNotFound(id.to_string()))
    }

    /// Find a report by tracking code.
    ///
    /// Codes are stored uppercase; the input is upper-cased so lookups
    /// are case-insensitive.
    pub async fn find_by_tracking_code(&self, code: &str) -> AppResult<Option<report::Model>> {
        Report::find()
            .filter(report::Column::TrackingCode.eq(code.trim().to_uppercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reports with filters, newest first.
    pub async fn list(&self, filter: &ReportListFilter) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find().order_by_desc(report::Column::CreatedAt);

        if let Some(status) = filter.status {
            query = query.filter(report::Column::Status.eq(status));
        }

        if let Some(ref term) = filter.search {
            query = query.filter(
                Condition::any()
                    .add(report::Column::Title.contains(term))
                    .add(report::Column::TrackingCode.contains(&term.to_uppercase())),
            );
        }

        if filter.has_photo {
            query = query.filter(report::Column::PhotoUrl.is_not_null());
        }

        if filter.has_location {
            query = query.filter(report::Column::HasLocation.eq(true));
        }

        query
            .offset(filter.offset)
            .limit(filter.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recent reports, newest first.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<report::Model>> {
        Report::find()
            .order_by_desc(report::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get every report, newest first. Used by the statistics service.
    pub async fn all(&self) -> AppResult<Vec<report::Model>> {
        Report::find()
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a report by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Report::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::ReportNotFound(id.to_string()));
        }

        Ok(())
    }

    /// Count all reports.
    pub async fn count(&self) -> AppResult<u64> {
        Report::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_report(id: &str, code: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            tracking_code: code.to_string(),
            title: "Gropë në rrugë".to_string(),
            description: "Gropë e madhe para shkollës".to_string(),
            photo_url: None,
            has_location: false,
            latitude: None,
            longitude: None,
            neighborhood: None,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            status: ReportStatus::New,
            admin_note: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let report = create_test_report("report1", "A1B2C3D4");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("report1").await.unwrap();

        assert_eq!(result.id, "report1");
        assert_eq!(result.status, ReportStatus::New);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::ReportNotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_tracking_code_uppercases_input() {
        let report = create_test_report("report1", "A1B2C3D4");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(Arc::clone(&db));
        let found = repo.find_by_tracking_code("  a1b2c3d4 ").await.unwrap();
        assert!(found.is_some());

        // The executed query must carry the upper-cased code.
        drop(repo);
        let log = Arc::try_unwrap(db)
            .expect("repository dropped")
            .into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("A1B2C3D4"), "query was: {sql}");
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let report = create_test_report("report1", "A1B2C3D4");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let filter = ReportListFilter {
            status: Some(ReportStatus::New),
            search: Some("gropë".to_string()),
            has_photo: false,
            has_location: false,
            limit: 10,
            offset: 0,
        };

        let result = repo.list(&filter).await.unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_report_errors() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let err = repo.delete("missing").await.unwrap_err();

        assert!(matches!(err, AppError::ReportNotFound(_)));
    }
}
