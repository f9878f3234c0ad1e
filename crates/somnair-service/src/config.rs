//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use somnair_core::LookupConfig;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Air-quality lookup settings.
    pub lookup: LookupConfig,
    /// Default tool arguments.
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every problem found.
    ///
    /// # Example
    ///
    /// ```
    /// use somnair_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(validate_lookup(&self.lookup));
        errors.extend(self.defaults.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(FieldError::new("server.bind", "bind address cannot be empty"));
            return errors;
        }

        match self.bind.rsplit_once(':') {
            None => errors.push(FieldError::new(
                "server.bind",
                format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            )),
            Some((_, port)) => match port.parse::<u16>() {
                Ok(0) => errors.push(FieldError::new("server.bind", "port cannot be 0")),
                Err(_) => errors.push(FieldError::new(
                    "server.bind",
                    format!("invalid port '{}': must be a number 1-65535", port),
                )),
                Ok(_) => {}
            },
        }

        errors
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: somnair_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.path.as_os_str().is_empty() {
            errors.push(FieldError::new(
                "storage.path",
                "database path cannot be empty",
            ));
        }
        errors
    }
}

/// Maximum lookup timeout in seconds.
pub const MAX_LOOKUP_TIMEOUT: u64 = 120;

fn validate_lookup(lookup: &LookupConfig) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (field, url) in [
        ("lookup.geocoding_url", &lookup.geocoding_url),
        ("lookup.air_quality_url", &lookup.air_quality_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(FieldError::new(
                field,
                format!("URL must start with http:// or https://, got '{}'", url),
            ));
        }
    }

    if lookup.timeout_secs == 0 || lookup.timeout_secs > MAX_LOOKUP_TIMEOUT {
        errors.push(FieldError::new(
            "lookup.timeout_secs",
            format!(
                "timeout {} is out of range (1-{} seconds)",
                lookup.timeout_secs, MAX_LOOKUP_TIMEOUT
            ),
        ));
    }

    if lookup.language.trim().is_empty() {
        errors.push(FieldError::new("lookup.language", "language cannot be empty"));
    }

    errors
}

/// Defaults applied when a tool call omits optional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Summary window in days.
    pub summary_days: i64,
    /// Number of recent rows included in a summary.
    pub recent_count: i64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            summary_days: 7,
            recent_count: 10,
        }
    }
}

impl DefaultsConfig {
    /// Validate default tool arguments.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.summary_days < 1 {
            errors.push(FieldError::new(
                "defaults.summary_days",
                format!("summary window {} must be at least 1 day", self.summary_days),
            ));
        }
        if self.recent_count < 0 {
            errors.push(FieldError::new(
                "defaults.recent_count",
                format!("recent count {} cannot be negative", self.recent_count),
            ));
        }
        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_field_errors(.0))]
    Validation(Vec<FieldError>),
}

/// A single invalid field.
#[derive(Debug, Clone)]
pub struct FieldError {
    /// The field path (e.g., `server.bind`).
    pub field: String,
    /// Description of the problem.
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("somnair")
        .join("server.toml")
}
