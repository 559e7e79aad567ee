//! Administrator entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Administrator model.
///
/// Admins triage reports; superadmins additionally manage other admins.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Sign-in email, unique.
    #[sea_orm(unique)]
    pub email: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Whether this admin may manage other admins.
    pub is_super_admin: bool,
    /// Argon2 password hash. Absent until the admin sets a password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Opaque bearer token for API authentication.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// ID of the superadmin who created this account.
    pub created_by: Option<String>,
    /// When the account was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
