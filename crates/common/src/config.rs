//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Instance presentation configuration.
    pub instance: InstanceConfig,
    /// Photo storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Preferences store configuration.
    #[serde(default)]
    pub prefs: PrefsSettings,
    /// Outbound email configuration. Absent disables notifications.
    #[serde(default)]
    pub email: Option<EmailSettings>,
    /// Bootstrap superadmin, applied only when the admin table is empty.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Instance presentation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    /// Municipality / instance name shown in responses and emails.
    pub name: String,
    /// Instance description.
    #[serde(default)]
    pub description: Option<String>,
    /// Privacy policy text served on the privacy route.
    #[serde(default)]
    pub privacy_policy: Option<String>,
    /// Languages offered by the instance.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

/// Photo storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Base path for stored files.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// Base URL for serving files.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
        }
    }
}

/// Preferences store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefsSettings {
    /// Path of the JSON file backing the preferences store.
    #[serde(default = "default_prefs_path")]
    pub path: PathBuf,
}

impl Default for PrefsSettings {
    fn default() -> Self {
        Self {
            path: default_prefs_path(),
        }
    }
}

/// Outbound email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    /// From address for notification emails.
    pub from_address: String,
    /// From display name.
    pub from_name: String,
    /// Resend API key. Takes precedence over SMTP when both are set.
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// SMTP relay settings.
    #[serde(default)]
    pub smtp: Option<SmtpSettings>,
}

/// SMTP relay settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Bootstrap superadmin credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    /// Superadmin email.
    pub email: String,
    /// Superadmin password.
    pub password: String,
    /// Superadmin display name.
    #[serde(default)]
    pub full_name: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    50
}

const fn default_min_connections() -> u32 {
    2
}

fn default_languages() -> Vec<String> {
    vec!["sq".to_string(), "en".to_string(), "it".to_string()]
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./files")
}

fn default_storage_url() -> String {
    "/files".to_string()
}

fn default_prefs_path() -> PathBuf {
    PathBuf::from("./prefs.json")
}

const fn default_smtp_port() -> u16 {
    587
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `KOMUNA_ENV`)
    /// 3. Environment variables with `KOMUNA_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("KOMUNA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("KOMUNA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("KOMUNA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
