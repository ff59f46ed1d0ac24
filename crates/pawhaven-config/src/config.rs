// pawhaven-config/src/config.rs
// ============================================================================
// Module: PawHaven Configuration
// Description: Configuration loading and validation for the shelter site.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pawhaven-core, pawhaven-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file path comes from the caller, then `PAWHAVEN_CONFIG`, then
//! `./pawhaven.toml`; only the last of these may be absent, in which case the
//! defaults apply. Every section validates its own ranges and
//! [`PawhavenConfig::validate`] checks the cross-section rules.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use pawhaven_core::DEFAULT_NEW_ARRIVAL_DAYS;
use pawhaven_core::DEFAULT_PAGE_SIZE;
use pawhaven_core::ShelterSettings;
use pawhaven_core::runtime::DEFAULT_SESSION_TTL_MINUTES;
use pawhaven_store_sqlite::SqliteStoreConfig;
use pawhaven_store_sqlite::SqliteStoreMode;
use pawhaven_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "pawhaven.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PAWHAVEN_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
/// Default request body limit in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Largest accepted request body limit in bytes.
const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default `SQLite` database path.
pub const DEFAULT_DB_PATH: &str = "pawhaven.db";
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Largest accepted busy timeout (ms).
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "pawhaven_session";
/// Maximum session cookie name length.
const MAX_COOKIE_NAME_LENGTH: usize = 64;
/// Longest accepted session lifetime (one year).
const MAX_SESSION_TTL_MINUTES: u32 = 525_600;
/// Longest accepted new-arrival window.
const MAX_NEW_ARRIVAL_DAYS: u32 = 365;
/// Largest accepted listing page size.
const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level shelter site configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawhavenConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Adoption flow and listing configuration.
    #[serde(default)]
    pub adoption: AdoptionConfig,
}

impl PawhavenConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.session.validate()?;
        self.adoption.validate()?;
        let addr = self.server.bind_addr()?;
        if !addr.ip().is_loopback() && !self.session.secure_cookie {
            return Err(ConfigError::Invalid(
                "non-loopback bind requires session.secure_cookie = true".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the service settings derived from this configuration.
    #[must_use]
    pub const fn shelter_settings(&self) -> ShelterSettings {
        ShelterSettings {
            page_size: self.adoption.page_size,
            new_arrival_days: self.adoption.new_arrival_days,
            require_account: self.adoption.require_account,
            session_ttl_minutes: self.session.ttl_minutes,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be at most {MAX_MAX_BODY_BYTES}"
            )));
        }
        self.bind_addr()?;
        self.audit.validate()
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self { enabled: default_audit_enabled(), path: None }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Record store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-memory store; contents are lost on exit.
    Memory,
    /// `SQLite`-backed durable store.
    #[default]
    Sqlite,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path; defaults to `pawhaven.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` settings, or `None` for the memory backend.
    #[must_use]
    pub fn sqlite(&self) -> Option<SqliteStoreConfig> {
        match self.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => Some(SqliteStoreConfig {
                path: self.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                if let Some(path) = &self.path {
                    if path.as_os_str().is_empty() {
                        return Err(ConfigError::Invalid(
                            "store.path must not be empty".to_string(),
                        ));
                    }
                    validate_path(path)?;
                }
                if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::Invalid(format!(
                        "store.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}"
                    )));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Session cookie configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in minutes.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u32,
    /// Adds the `Secure` attribute to the cookie.
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_minutes: default_ttl_minutes(),
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Validates session configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.cookie_name.as_str();
        if name.is_empty() || name.len() > MAX_COOKIE_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "session.cookie_name must be 1 to {MAX_COOKIE_NAME_LENGTH} characters"
            )));
        }
        if !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            return Err(ConfigError::Invalid(
                "session.cookie_name may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.ttl_minutes) {
            return Err(ConfigError::Invalid(format!(
                "session.ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Adoption
// ============================================================================

/// Adoption flow and listing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionConfig {
    /// Anonymous visitors must sign in before applying.
    #[serde(default = "default_require_account")]
    pub require_account: bool,
    /// Days after arrival during which a pet counts as a new arrival.
    #[serde(default = "default_new_arrival_days")]
    pub new_arrival_days: u32,
    /// Pets per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for AdoptionConfig {
    fn default() -> Self {
        Self {
            require_account: default_require_account(),
            new_arrival_days: default_new_arrival_days(),
            page_size: default_page_size(),
        }
    }
}

impl AdoptionConfig {
    /// Validates adoption configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_NEW_ARRIVAL_DAYS).contains(&self.new_arrival_days) {
            return Err(ConfigError::Invalid(format!(
                "adoption.new_arrival_days must be between 1 and {MAX_NEW_ARRIVAL_DAYS}"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Invalid(format!(
                "adoption.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default cookie name.
fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

/// Returns the default session lifetime.
const fn default_ttl_minutes() -> u32 {
    DEFAULT_SESSION_TTL_MINUTES
}

/// Applicants sign in by default.
const fn default_require_account() -> bool {
    true
}

/// Returns the default new-arrival window.
const fn default_new_arrival_days() -> u32 {
    DEFAULT_NEW_ARRIVAL_DAYS
}

/// Returns the default page size.
const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag is false for the implicit default.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid("path component too long".to_string()));
    }
    Ok(())
}

/// Validates a path string from a config field.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    validate_path(Path::new(value)).map_err(|err| match err {
        ConfigError::Invalid(message) => ConfigError::Invalid(format!("{field}: {message}")),
        other => other,
    })
}
