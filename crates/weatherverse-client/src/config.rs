//! Dashboard configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use weatherverse_types::{DEFAULT_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY};

use crate::alert::{
    AlertMode, AlertThresholds, AlertTrigger, DEFAULT_HUMIDITY_MAX, DEFAULT_TEMPERATURE_MAX,
};
use crate::error::NotifyError;
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::poller::PollerOptions;

/// Longest accepted poll interval.
const MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// Dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub dashboard: DashboardConfig,
    pub alerts: AlertConfig,
}

impl ClientConfig {
    /// Load configuration from the default path, falling back to defaults.
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
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.dashboard.validate());
        errors.extend(self.alerts.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the station service.
    pub url: String,
    pub poll_interval_secs: u64,
    pub history_capacity: usize,
    /// Load the service history before the first poll.
    pub seed_from_history: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            poll_interval_secs: 30,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed_from_history: true,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !is_http_url(&self.url) {
            errors.push(ValidationError::new(
                "dashboard.url",
                format!("'{}' must start with http:// or https://", self.url),
            ));
        }
        if !(1..=MAX_POLL_INTERVAL_SECS).contains(&self.poll_interval_secs) {
            errors.push(ValidationError::new(
                "dashboard.poll_interval_secs",
                format!(
                    "poll interval must be between 1 and {} seconds",
                    MAX_POLL_INTERVAL_SECS
                ),
            ));
        }
        if !(1..=MAX_HISTORY_CAPACITY).contains(&self.history_capacity) {
            errors.push(ValidationError::new(
                "dashboard.history_capacity",
                format!(
                    "history capacity must be between 1 and {}",
                    MAX_HISTORY_CAPACITY
                ),
            ));
        }

        errors
    }

    pub fn poller_options(&self) -> PollerOptions {
        PollerOptions::default()
            .poll_interval(Duration::from_secs(self.poll_interval_secs))
            .history_capacity(self.history_capacity)
            .seed_from_history(self.seed_from_history)
    }
}

/// Alert settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    pub temperature_max: f64,
    pub humidity_max: f64,
    pub mode: AlertMode,
    /// Where to post alerts. Alerts are only logged when absent.
    pub webhook: Option<WebhookConfig>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            temperature_max: DEFAULT_TEMPERATURE_MAX,
            humidity_max: DEFAULT_HUMIDITY_MAX,
            mode: AlertMode::Level,
            webhook: None,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.temperature_max.is_finite() {
            errors.push(ValidationError::new(
                "alerts.temperature_max",
                "threshold must be a finite number",
            ));
        }
        if !self.humidity_max.is_finite() {
            errors.push(ValidationError::new(
                "alerts.humidity_max",
                "threshold must be a finite number",
            ));
        }
        if let Some(webhook) = &self.webhook {
            if !is_http_url(&webhook.url) {
                errors.push(ValidationError::new(
                    "alerts.webhook.url",
                    format!("'{}' must start with http:// or https://", webhook.url),
                ));
            }
            if webhook.recipient.trim().is_empty() {
                errors.push(ValidationError::new(
                    "alerts.webhook.recipient",
                    "recipient cannot be empty",
                ));
            }
        }

        errors
    }

    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            temperature_max: self.temperature_max,
            humidity_max: self.humidity_max,
        }
    }

    /// Notifier for the configured destination.
    pub fn notifier(&self) -> Result<Arc<dyn Notifier>, NotifyError> {
        let notifier: Arc<dyn Notifier> = match &self.webhook {
            Some(webhook) => Arc::new(WebhookNotifier::new(
                &webhook.url,
                webhook.recipient.clone(),
            )?),
            None => Arc::new(LogNotifier),
        };
        Ok(notifier)
    }

    /// Alert trigger, or `None` when alerts are disabled.
    pub fn trigger(&self) -> Result<Option<AlertTrigger>, NotifyError> {
        if !self.enabled {
            return Ok(None);
        }
        Ok(Some(AlertTrigger::new(
            self.thresholds(),
            self.mode,
            self.notifier()?,
        )))
    }
}

/// Webhook destination for alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    /// Name the alert is addressed to.
    #[serde(default = "default_recipient")]
    pub recipient: String,
}

fn default_recipient() -> String {
    "Station owner".to_string()
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
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
    /// The field path (e.g., `dashboard.url`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
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
        .join("dashboard.toml")
}
