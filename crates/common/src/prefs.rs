//! Process-wide preferences store.
//!
//! Theme, language, accessibility options, the cookie-consent decision
//! and the locally-cached feedback ratings all live in one store backed
//! by a single JSON file. The store is loaded once at startup, exposes a
//! read/subscribe interface to consumers, and confines every persistence
//! side effect to this module. Entries never expire and are never synced
//! anywhere.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};

use crate::{AppError, AppResult};

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme (the default presentation).
    #[default]
    Dark,
    /// Light theme.
    Light,
}

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Albanian.
    #[default]
    Sq,
    /// English.
    En,
    /// Italian.
    It,
}

/// Cookie-consent level chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentLevel {
    /// All cookies accepted.
    All,
    /// Essential cookies only.
    Essential,
}

/// A recorded cookie-consent decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieConsent {
    /// Chosen level.
    pub level: ConsentLevel,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

/// Smallest accepted font scale, in percent.
pub const MIN_FONT_SCALE: u8 = 80;
/// Largest accepted font scale, in percent.
pub const MAX_FONT_SCALE: u8 = 150;

/// User-interface preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    /// Color theme.
    #[serde(default)]
    pub theme: Theme,
    /// Interface language.
    #[serde(default)]
    pub language: Language,
    /// High-contrast accessibility mode.
    #[serde(default)]
    pub high_contrast: bool,
    /// Font scale in percent, clamped to [`MIN_FONT_SCALE`]..=[`MAX_FONT_SCALE`].
    #[serde(default = "default_font_scale")]
    pub font_scale: u8,
    /// Cookie-consent decision, absent until the user decides.
    #[serde(default)]
    pub cookie_consent: Option<CookieConsent>,
}

const fn default_font_scale() -> u8 {
    100
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: Language::default(),
            high_contrast: false,
            font_scale: default_font_scale(),
            cookie_consent: None,
        }
    }
}

/// Partial update dispatched against the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferencesUpdate {
    /// New theme.
    pub theme: Option<Theme>,
    /// New language.
    pub language: Option<Language>,
    /// New high-contrast flag.
    pub high_contrast: Option<bool>,
    /// New font scale (clamped).
    pub font_scale: Option<u8>,
    /// Cookie-consent decision.
    pub cookie_consent: Option<ConsentLevel>,
}

/// A feedback rating for a resolved report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    /// Star rating, 1..=5.
    pub rating: u8,
    /// Optional free-text comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Tracking code of the rated report.
    pub tracking_code: String,
    /// When the rating was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Outcome of a feedback submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The rating was stored.
    Recorded(FeedbackEntry),
    /// A rating already existed for this report; the stored one is
    /// returned read-only and the submission is ignored.
    AlreadyRated(FeedbackEntry),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefsData {
    #[serde(default)]
    ui: UiPreferences,
    /// Feedback ratings keyed by report ID.
    #[serde(default)]
    feedback: BTreeMap<String, FeedbackEntry>,
}

/// The process-wide preferences store.
#[derive(Clone)]
pub struct PrefsStore {
    path: PathBuf,
    data: Arc<RwLock<PrefsData>>,
    ui_tx: watch::Sender<UiPreferences>,
}

impl PrefsStore {
    /// Load the store from its backing file, falling back to defaults
    /// when the file does not exist yet.
    pub async fn load(path: PathBuf) -> AppResult<Self> {
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<PrefsData>(&bytes)
                .map_err(|e| AppError::Internal(format!("Corrupt preferences file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PrefsData::default(),
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read preferences file: {e}"
                )));
            }
        };

        let (ui_tx, _) = watch::channel(data.ui.clone());

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
            ui_tx,
        })
    }

    /// Current UI preferences.
    pub async fn ui(&self) -> UiPreferences {
        self.data.read().await.ui.clone()
    }

    /// Subscribe to UI preference changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UiPreferences> {
        self.ui_tx.subscribe()
    }

    /// Apply a partial update, persist, and notify subscribers.
    pub async fn dispatch(&self, update: UiPreferencesUpdate) -> AppResult<UiPreferences> {
        let ui = {
            let mut data = self.data.write().await;

            if let Some(theme) = update.theme {
                data.ui.theme = theme;
            }
            if let Some(language) = update.language {
                data.ui.language = language;
            }
            if let Some(high_contrast) = update.high_contrast {
                data.ui.high_contrast = high_contrast;
            }
            if let Some(font_scale) = update.font_scale {
                data.ui.font_scale = font_scale.clamp(MIN_FONT_SCALE, MAX_FONT_SCALE);
            }
            if let Some(level) = update.cookie_consent {
                data.ui.cookie_consent = Some(CookieConsent {
                    level,
                    decided_at: Utc::now(),
                });
            }

            self.persist(&data).await?;
            data.ui.clone()
        };

        // send_replace updates the value even when nobody subscribed yet.
        self.ui_tx.send_replace(ui.clone());
        Ok(ui)
    }

    /// Stored feedback for a report, if any.
    pub async fn feedback_for(&self, report_id: &str) -> Option<FeedbackEntry> {
        self.data.read().await.feedback.get(report_id).cloned()
    }

    /// Record a feedback rating for a report.
    ///
    /// Idempotent per report: once a rating exists, later submissions
    /// return the stored entry untouched.
    pub async fn record_feedback(
        &self,
        report_id: &str,
        entry: FeedbackEntry,
    ) -> AppResult<FeedbackOutcome> {
        let mut data = self.data.write().await;

        if let Some(existing) = data.feedback.get(report_id) {
            return Ok(FeedbackOutcome::AlreadyRated(existing.clone()));
        }

        data.feedback.insert(report_id.to_string(), entry.clone());
        self.persist(&data).await?;

        Ok(FeedbackOutcome::Recorded(entry))
    }

    /// All stored feedback ratings.
    pub async fn all_feedback(&self) -> Vec<FeedbackEntry> {
        self.data.read().await.feedback.values().cloned().collect()
    }

    async fn persist(&self, data: &PrefsData) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| AppError::Internal(format!("Failed to encode preferences: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write preferences file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir().join(format!("komuna-prefs-{}.json", uuid::Uuid::new_v4()))
    }

    fn sample_feedback(rating: u8) -> FeedbackEntry {
        FeedbackEntry {
            rating,
            comment: Some("Rruga u rregullua".to_string()),
            tracking_code: "A1B2C3D4".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn defaults_when_file_missing() {
        let store = PrefsStore::load(temp_store_path()).await.unwrap();
        let ui = store.ui().await;

        assert_eq!(ui.theme, Theme::Dark);
        assert_eq!(ui.language, Language::Sq);
        assert_eq!(ui.font_scale, 100);
        assert!(ui.cookie_consent.is_none());
    }

    #[tokio::test]
    async fn dispatch_persists_and_reloads() {
        let path = temp_store_path();
        let store = PrefsStore::load(path.clone()).await.unwrap();

        store
            .dispatch(UiPreferencesUpdate {
                theme: Some(Theme::Light),
                language: Some(Language::En),
                font_scale: Some(120),
                cookie_consent: Some(ConsentLevel::Essential),
                ..Default::default()
            })
            .await
            .unwrap();

        // A fresh store over the same file sees the persisted state.
        let reloaded = PrefsStore::load(path.clone()).await.unwrap();
        let ui = reloaded.ui().await;
        assert_eq!(ui.theme, Theme::Light);
        assert_eq!(ui.language, Language::En);
        assert_eq!(ui.font_scale, 120);
        assert_eq!(
            ui.cookie_consent.map(|c| c.level),
            Some(ConsentLevel::Essential)
        );

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn font_scale_is_clamped() {
        let path = temp_store_path();
        let store = PrefsStore::load(path.clone()).await.unwrap();

        let ui = store
            .dispatch(UiPreferencesUpdate {
                font_scale: Some(250),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ui.font_scale, MAX_FONT_SCALE);

        let ui = store
            .dispatch(UiPreferencesUpdate {
                font_scale: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ui.font_scale, MIN_FONT_SCALE);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn subscribers_see_dispatched_updates() {
        let path = temp_store_path();
        let store = PrefsStore::load(path.clone()).await.unwrap();
        let mut rx = store.subscribe();

        store
            .dispatch(UiPreferencesUpdate {
                high_contrast: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        rx.changed().await.unwrap();
        assert!(rx.borrow().high_contrast);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn feedback_is_idempotent_per_report() {
        let path = temp_store_path();
        let store = PrefsStore::load(path.clone()).await.unwrap();

        let first = store
            .record_feedback("report-1", sample_feedback(5))
            .await
            .unwrap();
        assert!(matches!(first, FeedbackOutcome::Recorded(ref e) if e.rating == 5));

        // Resubmission is ignored and the stored rating comes back.
        let second = store
            .record_feedback("report-1", sample_feedback(1))
            .await
            .unwrap();
        assert!(matches!(second, FeedbackOutcome::AlreadyRated(ref e) if e.rating == 5));

        assert_eq!(store.feedback_for("report-1").await.map(|e| e.rating), Some(5));
        assert!(store.feedback_for("report-2").await.is_none());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
