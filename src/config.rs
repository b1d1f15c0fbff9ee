//! Server configuration.

use crate::session::DEFAULT_COOKIE_NAME;
use axum_extra::extract::cookie::Key;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Shortest accepted `session_secret`, in bytes.
pub const SESSION_SECRET_MIN_LEN: usize = 64;

/// Configuration for the lobby server.
///
/// Every field has a default, so an empty TOML file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    cookie_name: String,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Secret for signing session cookies, at least 64 bytes.
    ///
    /// When unset a random key is generated at startup, so sessions end
    /// with the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_secret: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cookie_name: default_cookie_name(),
            log_filter: default_log_filter(),
            session_secret: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Key used to sign session cookies.
    #[instrument(skip(self))]
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        match &self.session_secret {
            Some(secret) if secret.len() < SESSION_SECRET_MIN_LEN => Err(ConfigError::new(format!(
                "session_secret must be at least {} bytes, got {}",
                SESSION_SECRET_MIN_LEN,
                secret.len()
            ))),
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|e| ConfigError::new(format!("Invalid session_secret: {}", e))),
            None => {
                info!("No session_secret configured, generating a key for this run");
                Ok(Key::generate())
            }
        }
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration that could not be loaded or used.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a configuration error located at the caller.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
