//! Administrator service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use komuna_common::{AppError, AppResult, IdGenerator, config::BootstrapAdminConfig};
use komuna_db::{entities::admin, repositories::AdminRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Administrator service for business logic.
#[derive(Clone)]
pub struct AdminService {
    admin_repo: AdminRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new admin.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(max = 256))]
    pub full_name: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    pub is_super_admin: bool,
}

/// Input for updating an admin.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminInput {
    #[validate(length(max = 256))]
    pub full_name: Option<String>,

    pub is_super_admin: Option<bool>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(admin_repo: AdminRepository) -> Self {
        Self {
            admin_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Authenticate an admin by email and password.
    ///
    /// Returns the admin with a live token, rotating one in if the
    /// account has none yet.
    pub async fn signin(&self, email: &str, password: &str) -> AppResult<admin::Model> {
        let admin = self
            .admin_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password_hash = admin.password_hash.clone().ok_or(AppError::Unauthorized)?;
        if !verify_password(password, &password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if admin.token.is_some() {
            return Ok(admin);
        }

        let token = self.id_gen.generate_token();
        let mut active: admin::ActiveModel = admin.into();
        active.token = Set(Some(token));
        self.admin_repo.update(active).await
    }

    /// Authenticate an admin by bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<admin::Model> {
        self.admin_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Sign out: rotate the token so the current one stops working.
    pub async fn signout(&self, admin_id: &str) -> AppResult<()> {
        let admin = self.admin_repo.get_by_id(admin_id).await?;
        let mut active: admin::ActiveModel = admin.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.admin_repo.update(active).await?;
        Ok(())
    }

    /// Create a new admin account. Superadmins only.
    pub async fn create(
        &self,
        input: CreateAdminInput,
        actor: &admin::Model,
    ) -> AppResult<admin::Model> {
        if !actor.is_super_admin {
            return Err(AppError::Forbidden(
                "Only superadmins can manage admins".to_string(),
            ));
        }

        input.validate()?;
        let email = input.email.trim().to_lowercase();

        if self.admin_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "An admin with email {email} already exists"
            )));
        }

        let model = admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            full_name: Set(input.full_name.filter(|n| !n.trim().is_empty())),
            is_super_admin: Set(input.is_super_admin),
            password_hash: Set(Some(hash_password(&input.password)?)),
            token: Set(None),
            created_by: Set(Some(actor.id.clone())),
            created_at: Set(Utc::now().into()),
        };

        self.admin_repo.create(model).await
    }

    /// Update an admin account. Superadmins only.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateAdminInput,
        actor: &admin::Model,
    ) -> AppResult<admin::Model> {
        if !actor.is_super_admin {
            return Err(AppError::Forbidden(
                "Only superadmins can manage admins".to_string(),
            ));
        }

        input.validate()?;

        let existing = self.admin_repo.get_by_id(id).await?;
        let mut active: admin::ActiveModel = existing.into();

        if let Some(full_name) = input.full_name {
            let trimmed = full_name.trim().to_string();
            active.full_name = Set((!trimmed.is_empty()).then_some(trimmed));
        }
        if let Some(is_super_admin) = input.is_super_admin {
            active.is_super_admin = Set(is_super_admin);
        }
        if let Some(password) = input.password {
            active.password_hash = Set(Some(hash_password(&password)?));
        }

        self.admin_repo.update(active).await
    }

    /// Delete an admin account. Superadmins only; self-deletion refused.
    pub async fn delete(&self, id: &str, actor: &admin::Model) -> AppResult<()> {
        if !actor.is_super_admin {
            return Err(AppError::Forbidden(
                "Only superadmins can manage admins".to_string(),
            ));
        }
        if id == actor.id {
            return Err(AppError::Forbidden(
                "You cannot delete your own admin account".to_string(),
            ));
        }

        self.admin_repo.delete(id).await
    }

    /// List all admin accounts. Superadmins only.
    pub async fn list(&self, actor: &admin::Model) -> AppResult<Vec<admin::Model>> {
        if !actor.is_super_admin {
            return Err(AppError::Forbidden(
                "Only superadmins can manage admins".to_string(),
            ));
        }

        self.admin_repo.list().await
    }

    /// Seed the first superadmin from configuration.
    ///
    /// Only applies when the admin table is empty; an existing deployment
    /// is never touched.
    pub async fn ensure_bootstrap_admin(
        &self,
        config: &BootstrapAdminConfig,
    ) -> AppResult<Option<admin::Model>> {
        if self.admin_repo.count().await? > 0 {
            return Ok(None);
        }

        let model = admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(config.email.trim().to_lowercase()),
            full_name: Set(config.full_name.clone()),
            is_super_admin: Set(true),
            password_hash: Set(Some(hash_password(&config.password)?)),
            token: Set(None),
            created_by: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let created = self.admin_repo.create(model).await?;
        tracing::info!(email = %created.email, "Bootstrapped initial superadmin");
        Ok(Some(created))
    }
}

/// Hash a password with Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
