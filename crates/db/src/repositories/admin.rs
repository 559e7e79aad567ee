//! Administrator repository.

use std::sync::Arc;

use crate::entities::{Admin, admin};
use komuna_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Administrator repository for database operations.
#[derive(Clone)]
pub struct AdminRepository {
    db: Arc<DatabaseConnection>,
}

impl AdminRepository {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new admin.
    pub async fn create(&self, model: admin::ActiveModel) -> AppResult<admin::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an admin by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<admin::Model> {
        Admin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::AdminNotFound(id.to_string()))
    }

    /// Find an admin by sign-in email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an admin by bearer token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all admins, newest first.
    pub async fn list(&self) -> AppResult<Vec<admin::Model>> {
        Admin::find()
            .order_by_desc(admin::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an admin.
    pub async fn update(&self, model: admin::ActiveModel) -> AppResult<admin::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an admin by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Admin::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::AdminNotFound(id.to_string()));
        }

        Ok(())
    }

    /// Count all admins.
    pub async fn count(&self) -> AppResult<u64> {
        Admin::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
