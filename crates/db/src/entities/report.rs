//! Citizen report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ReportStatus {
    /// Freshly submitted, not yet triaged.
    #[sea_orm(string_value = "new")]
    #[default]
    New,
    /// Picked up by an administrator.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Resolved, optionally with a resolution note.
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

/// Citizen report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-shareable code for anonymous status lookup. Unique,
    /// uppercase alphanumeric, generated server-side.
    #[sea_orm(unique)]
    pub tracking_code: String,
    /// Short problem title.
    pub title: String,
    /// Detailed problem description.
    pub description: String,
    /// Public URL of an uploaded photo.
    pub photo_url: Option<String>,
    /// Whether the reporter chose to share a location.
    pub has_location: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Neighborhood resolved from the coordinates at submission time.
    pub neighborhood: Option<String>,
    /// Optional reporter contact details. Never exposed on the public
    /// read path.
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    /// Current lifecycle status.
    pub status: ReportStatus,
    /// Resolution note set by an administrator.
    pub admin_note: Option<String>,
    /// When the report was submitted.
    pub created_at: DateTimeWithTimeZone,
    /// When the report was last mutated by an administrator.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
