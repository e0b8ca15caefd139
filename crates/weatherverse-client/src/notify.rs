//! Alert delivery.
//!
//! A [`Notifier`] receives each alert that is due. [`LogNotifier`] only logs
//! it; [`WebhookNotifier`] posts it as JSON to an HTTP endpoint such as an
//! email relay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::alert::{Alert, Breach};
use crate::client::normalize_url;
use crate::error::{ClientError, NotifyError};

/// Timeout for a single webhook delivery.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers alerts somewhere.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one alert. Called at most once per alert.
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Writes alerts to the log at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        warn!("Weather alert: {}", alert);
        Ok(())
    }
}

/// JSON body posted by [`WebhookNotifier`].
#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload<'a> {
    pub to_name: &'a str,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub breaches: &'a [Breach],
}

/// Posts alerts to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    recipient: String,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url` on behalf of `recipient`.
    pub fn new(url: &str, recipient: impl Into<String>) -> Result<Self, NotifyError> {
        let url = normalize_url(url).map_err(|e| match e {
            ClientError::InvalidUrl(msg) => NotifyError::InvalidUrl(msg),
            other => NotifyError::InvalidUrl(other.to_string()),
        })?;
        let client = Client::builder().timeout(NOTIFY_TIMEOUT).build()?;

        Ok(Self {
            client,
            url,
            recipient: recipient.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Body that will be posted for `alert`.
    pub fn payload<'a>(&'a self, alert: &'a Alert) -> AlertPayload<'a> {
        AlertPayload {
            to_name: &self.recipient,
            temperature: alert.reading.temperature(),
            humidity: alert.reading.humidity(),
            timestamp: alert.reading.timestamp(),
            breaches: &alert.breaches,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(alert))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        info!("Alert sent to {}", self.recipient);
        Ok(())
    }
}
