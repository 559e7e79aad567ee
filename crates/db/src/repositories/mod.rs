//! Database repositories.

pub mod admin;
pub mod report;

pub use admin::AdminRepository;
pub use report::{ReportListFilter, ReportRepository};
