//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use weatherverse_store::{StoreKind, StoreMode};
use weatherverse_types::{DEFAULT_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY};

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Readings store settings.
    pub store: StoreConfig,
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

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - History capacity is within bounds when history mode is selected
    ///
    /// # Example
    ///
    /// ```
    /// use weatherverse_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.store.validate());

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
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
            return errors;
        }

        match self.bind.rsplit_once(':') {
            None => errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            }),
            Some((_, port)) => match port.parse::<u16>() {
                Ok(0) => errors.push(ValidationError {
                    field: "server.bind".to_string(),
                    message: "port cannot be 0".to_string(),
                }),
                Err(_) => errors.push(ValidationError {
                    field: "server.bind".to_string(),
                    message: format!("invalid port '{}': must be a number 1-65535", port),
                }),
                Ok(_) => {}
            },
        }

        errors
    }
}

/// Readings store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Retention mode: `latest` or `history`.
    pub mode: StoreKind,
    /// Number of readings kept in history mode.
    pub history_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: StoreKind::History,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Validate store configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.mode == StoreKind::History {
            if self.history_capacity == 0 {
                errors.push(ValidationError {
                    field: "store.history_capacity".to_string(),
                    message: "history capacity cannot be 0".to_string(),
                });
            } else if self.history_capacity > MAX_HISTORY_CAPACITY {
                errors.push(ValidationError {
                    field: "store.history_capacity".to_string(),
                    message: format!(
                        "history capacity {} is too large (maximum {})",
                        self.history_capacity, MAX_HISTORY_CAPACITY
                    ),
                });
            }
        }

        errors
    }

    /// Resolve the configured retention mode.
    pub fn store_mode(&self) -> Result<StoreMode, weatherverse_store::Error> {
        StoreMode::from_kind(self.mode, self.history_capacity)
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
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `store.history_capacity`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
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
        .join("weatherverse")
        .join("server.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.store.mode, StoreKind::History);
        assert_eq!(config.store.history_capacity, 24);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [server]
            bind = "0.0.0.0:3000"

            [store]
            mode = "latest"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.store.mode, StoreKind::Latest);
        assert_eq!(config.store.history_capacity, 24);
        assert_eq!(config.store.store_mode().unwrap(), StoreMode::Latest);
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[store]\nhistory_capacity = 48\n").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(
            config.store.store_mode().unwrap(),
            StoreMode::History { capacity: 48 }
        );
    }

    #[test]
    fn test_config_rejects_unknown_mode() {
        let result: Result<Config, _> = toml::from_str("[store]\nmode = \"ring\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("server.toml");

        let config = Config {
            server: ServerConfig {
                bind: "0.0.0.0:9090".to_string(),
            },
            store: StoreConfig {
                mode: StoreKind::History,
                history_capacity: 12,
            },
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load_validated(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "0.0.0.0:9090");
        assert_eq!(loaded.store.history_capacity, 12);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/server.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("weatherverse/server.toml"));
    }

    #[test]
    fn test_server_bind_validation() {
        let valid = |bind: &str| {
            ServerConfig {
                bind: bind.to_string(),
            }
            .validate()
        };

        assert!(valid("127.0.0.1:3000").is_empty());
        assert!(valid("[::1]:3000").is_empty());
        assert!(valid("localhost:3000").is_empty());

        let errors = valid("");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be empty"));

        let errors = valid("127.0.0.1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("host:port"));

        let errors = valid("127.0.0.1:0");
        assert!(errors[0].message.contains("cannot be 0"));

        let errors = valid("127.0.0.1:abc");
        assert!(errors[0].message.contains("must be a number"));
    }

    #[test]
    fn test_store_capacity_validation() {
        let zero = StoreConfig {
            mode: StoreKind::History,
            history_capacity: 0,
        };
        let errors = zero.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "store.history_capacity");

        let huge = StoreConfig {
            mode: StoreKind::History,
            history_capacity: MAX_HISTORY_CAPACITY + 1,
        };
        assert!(huge.validate()[0].message.contains("too large"));

        // Capacity is irrelevant in latest mode
        let latest = StoreConfig {
            mode: StoreKind::Latest,
            history_capacity: 0,
        };
        assert!(latest.validate().is_empty());
    }

    #[test]
    fn test_config_validation_error_display() {
        let config = Config {
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
            },
            store: StoreConfig {
                mode: StoreKind::History,
                history_capacity: 0,
            },
        };

        let display = config.validate().unwrap_err().to_string();
        assert!(display.contains("server.bind"));
        assert!(display.contains("store.history_capacity"));
    }
}
