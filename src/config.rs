//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file and applies `DB_*`
//! environment overrides on top, so the service can run from a config file,
//! from environment variables alone, or a mix of both. `AppConfig` is the
//! root configuration struct containing all settings.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "pulse=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Cache-Control header value for probe responses.
/// Orchestrators must always see a fresh verdict, never a cached one.
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

// =============================================================================
// Environment Overrides
// =============================================================================
// These mirror the variables the probe has historically been deployed with,
// so existing container manifests keep working without a config file.

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_DATABASE: &str = "DB_DATABASE";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD_FILE: &str = "DB_PASSWORD_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Database connection settings for the probe
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            tls: TlsConfig::default(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }
}

/// TLS mode for the HTTP listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain HTTP (the common case: the probe sits on a pod-local port)
    #[default]
    None,
    /// User-provided certificate and key files
    Manual,
}

/// TLS configuration for the HTTP listener
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub mode: TlsMode,
    /// Path to PEM certificate chain (manual mode)
    pub cert_path: Option<String>,
    /// Path to PEM private key (manual mode)
    pub key_path: Option<String>,
}

/// Database connection settings used by the probe.
///
/// Each probe opens a single connection with these settings and discards it.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database server hostname
    #[serde(default)]
    pub host: String,
    /// Database server port
    #[serde(default = "DatabaseConfig::default_port")]
    pub port: u16,
    /// Database (schema) name
    #[serde(default)]
    pub database: String,
    /// Username for authentication
    #[serde(default)]
    pub user: String,
    /// Path to a file whose contents are the password.
    /// The secret itself never appears in config or environment.
    #[serde(default)]
    pub password_file: PathBuf,
    /// Upper bound on the whole probe (connect + query) in seconds
    #[serde(default = "DatabaseConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: Self::default_port(),
            database: String::new(),
            user: String::new(),
            password_file: PathBuf::new(),
            connect_timeout_seconds: Self::default_connect_timeout(),
        }
    }
}

impl DatabaseConfig {
    fn default_port() -> u16 {
        3306
    }

    fn default_connect_timeout() -> u64 {
        5
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing config file is not an error: defaults are used so the
    /// service can be configured entirely through `DB_*` environment
    /// variables. Validation runs after overrides, so an unusable
    /// configuration is rejected either way.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => toml::from_str::<AppConfig>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Apply `DB_*` overrides from the given lookup (process env in
    /// production; tests pass a closure over a map).
    pub fn apply_overrides(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = get(ENV_DB_HOST) {
            self.database.host = host;
        }
        if let Some(port) = get(ENV_DB_PORT) {
            self.database.port = port.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{} must be a port number, got '{}'",
                    ENV_DB_PORT, port
                ))
            })?;
        }
        if let Some(database) = get(ENV_DB_DATABASE) {
            self.database.database = database;
        }
        if let Some(user) = get(ENV_DB_USER) {
            self.database.user = user;
        }
        if let Some(path) = get(ENV_DB_PASSWORD_FILE) {
            self.database.password_file = PathBuf::from(path);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.is_empty() {
            return Err(ConfigError::Validation(format!(
                "No database host configured. Set [database] host or {}",
                ENV_DB_HOST
            )));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Validation(format!(
                "No database name configured. Set [database] database or {}",
                ENV_DB_DATABASE
            )));
        }
        if self.database.user.is_empty() {
            return Err(ConfigError::Validation(format!(
                "No database user configured. Set [database] user or {}",
                ENV_DB_USER
            )));
        }
        if self.database.password_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!(
                "No password file configured. Set [database] password_file or {}",
                ENV_DB_PASSWORD_FILE
            )));
        }
        if self.http.tls.mode == TlsMode::Manual
            && (self.http.tls.cert_path.is_none() || self.http.tls.key_path.is_none())
        {
            return Err(ConfigError::Validation(
                "TLS mode 'manual' requires both cert_path and key_path".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
