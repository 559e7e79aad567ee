//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod capture;
pub mod email;
pub mod feedback;
pub mod photo;
pub mod report;
pub mod stats;

pub use admin::{AdminService, CreateAdminInput, UpdateAdminInput};
pub use capture::{
    CaptureError, CaptureService, CaptureSession, DeviceBackend, DeviceKind, GeoBackend,
    MediaTrack, PositionFix, locate_neighborhood,
};
pub use email::{
    EmailConfig, EmailDeliveryResult, EmailMessage, EmailProvider, EmailService,
    ReportNotification, ResendConfig, SmtpConfig,
};
pub use feedback::{FeedbackService, SubmitFeedbackInput};
pub use photo::{MAX_PHOTO_SIZE, PhotoService, StoredPhoto, UploadPhotoInput};
pub use report::{
    PublicReport, RECENT_REPORTS_LIMIT, ReportService, SubmitReportInput, UpdateStatusInput,
};
pub use stats::{DailyCount, NeighborhoodCount, ReportStatistics, StatsService, compute_statistics};
