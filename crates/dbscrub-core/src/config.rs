//! Settings for the anonymization run.
//!
//! Settings are loaded once at process start from a TOML file and passed by
//! reference into every part of the engine. Every field has a default, so an
//! empty document is a valid configuration; the naming sections only supply
//! the placeholder prefixes used to rebuild display data, and a missing
//! prefix degrades to a deterministic `"{kind} {id}"` fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file cannot be read.
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML.
    #[error("cannot parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target database.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Platform installation settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Audit file settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Placeholder naming templates.
    #[serde(default)]
    pub naming: NamingConfig,
}

impl Config {
    /// Loads the settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses the settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Target database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file holding the platform data.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("platform.db")
}

/// Platform installation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Root directory of the platform installation. When set, the domain
    /// descriptor files under it are rewritten alongside the database; when
    /// unset, only the database is anonymized.
    #[serde(default)]
    pub home: Option<PathBuf>,

    /// Replacement value for the server URL recorded on every domain.
    #[serde(default)]
    pub server_url: Option<String>,

    /// Locale used for rows that do not carry their own language tag.
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            home: None,
            server_url: None,
            default_language: default_language(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Audit file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Directory in which the SSV audit files are created.
    #[serde(default = "default_audit_dir")]
    pub dir: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            dir: default_audit_dir(),
        }
    }
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Placeholder naming templates, one section per entity kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NamingConfig {
    /// Domain display names and technical names.
    #[serde(default)]
    pub domain: SimpleNaming,

    /// User identity placeholders.
    #[serde(default)]
    pub user: UserNaming,

    /// Group display names.
    #[serde(default)]
    pub group: SimpleNaming,

    /// Collaborative space names, per locale.
    #[serde(default)]
    pub space: LocalizedNaming,

    /// Application instance names, per locale.
    #[serde(default)]
    pub app: LocalizedNaming,

    /// Folder node names, per locale.
    #[serde(default)]
    pub folder: LocalizedNaming,

    /// Album node names, per locale.
    #[serde(default)]
    pub album: LocalizedNaming,

    /// Category node names, per locale.
    #[serde(default)]
    pub category: LocalizedNaming,

    /// Publication names, per locale.
    #[serde(default)]
    pub publication: LocalizedNaming,
}

/// A single, locale-independent name prefix.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimpleNaming {
    /// Name prefix; absent means the entity-kind fallback.
    #[serde(default)]
    pub name: Option<String>,
}

/// The placeholder identity given to every user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNaming {
    /// First name prefix.
    #[serde(default = "default_first_name")]
    pub first_name: String,

    /// Last name prefix.
    #[serde(default = "default_last_name")]
    pub last_name: String,

    /// Email address shared by every anonymized user.
    #[serde(default = "default_email")]
    pub email: String,

    /// Plaintext placeholder password. The database receives its digest;
    /// the plaintext goes to the user audit file.
    #[serde(default = "default_password")]
    pub password: String,

    /// Company recorded on every anonymized user.
    #[serde(default = "default_company")]
    pub company: String,
}

impl Default for UserNaming {
    fn default() -> Self {
        Self {
            first_name: default_first_name(),
            last_name: default_last_name(),
            email: default_email(),
            password: default_password(),
            company: default_company(),
        }
    }
}

fn default_first_name() -> String {
    "Firstname".to_string()
}

fn default_last_name() -> String {
    "Lastname".to_string()
}

fn default_email() -> String {
    "no-reply@example.org".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_company() -> String {
    "Example".to_string()
}

/// Per-locale name, description and keyword prefixes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalizedNaming {
    /// Name prefix keyed by locale.
    #[serde(default)]
    pub name: HashMap<String, String>,

    /// Description keyed by locale; absent locales leave the column null.
    #[serde(default)]
    pub description: HashMap<String, String>,

    /// Keywords keyed by locale; only meaningful for publications.
    #[serde(default)]
    pub keywords: HashMap<String, String>,
}

impl LocalizedNaming {
    /// The configured name prefix for `locale`, if any.
    #[must_use]
    pub fn name_prefix(&self, locale: &str) -> Option<&str> {
        self.name.get(locale).map(String::as_str)
    }

    /// The configured description for `locale`, if any.
    #[must_use]
    pub fn description_for(&self, locale: &str) -> Option<&str> {
        self.description.get(locale).map(String::as_str)
    }

    /// The configured keywords for `locale`, if any.
    #[must_use]
    pub fn keywords_for(&self, locale: &str) -> Option<&str> {
        self.keywords.get(locale).map(String::as_str)
    }
}
