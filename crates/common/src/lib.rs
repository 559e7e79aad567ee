//! Common utilities and shared types for komuna.
//!
//! This crate provides foundational components used across all komuna crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID entity IDs and tracking codes via [`IdGenerator`]
//! - **Geography**: Neighborhood resolution for submitted coordinates
//! - **Preferences**: The process-wide settings store via [`PrefsStore`]
//! - **Storage**: File storage backend for report photos
//!
//! # Example
//!
//! ```no_run
//! use komuna_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let code = id_gen.generate_tracking_code();
//!     println!("Tracking code: {code}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod id;
pub mod prefs;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use geo::{NEIGHBORHOODS, Neighborhood, damage_estimate, resolve_neighborhood};
pub use id::{IdGenerator, TRACKING_CODE_LEN, is_valid_tracking_code};
pub use prefs::{
    ConsentLevel, FeedbackEntry, FeedbackOutcome, Language, PrefsStore, Theme, UiPreferences,
    UiPreferencesUpdate,
};
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
