//! HTTP client for the weatherverse-service REST API.
//!
//! # Example
//!
//! ```no_run
//! use weatherverse_client::{StationClient, SubmitReading};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StationClient::new("http://127.0.0.1:3000")?;
//!
//! client.submit(&SubmitReading::new(26.0, 40.0)).await?;
//!
//! if let Some(reading) = client.latest().await? {
//!     println!("Latest: {reading}");
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use weatherverse_types::Reading;

use crate::error::{ClientError, Result};
use crate::source::ReadingSource;

/// Request timeout applied to every call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the station service.
#[derive(Debug, Clone)]
pub struct StationClient {
    client: Client,
    base_url: String,
}

/// A reading to submit to the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubmitReading {
    pub temperature: f64,
    pub humidity: f64,
    /// Device timestamp; the server stamps the reading when omitted.
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl SubmitReading {
    /// A reading without a device timestamp.
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
            timestamp: None,
        }
    }

    /// Attach a device timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Acknowledgement returned by `POST /api/readings`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub status: String,
    /// Timestamp the reading was stored with.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl StationClient {
    /// Create a new client for the service at `base_url`
    /// (e.g. `"http://127.0.0.1:3000"`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Request)?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the liveness route. Any failure counts as down.
    pub async fn is_up(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Get service health.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/api/health", self.base_url);
        self.get(&url).await
    }

    /// Submit a reading.
    pub async fn submit(&self, reading: &SubmitReading) -> Result<SubmitResponse> {
        let url = format!("{}/api/readings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(reading)
            .send()
            .await
            .map_err(|e| ClientError::NotReachable { url, source: e })?;

        handle_response(response).await
    }

    /// Latest reading, or `None` if the service has not received any yet.
    pub async fn latest(&self) -> Result<Option<Reading>> {
        let url = format!("{}/api/readings/latest", self.base_url);
        self.get(&url).await
    }

    /// Readings retained by the service, oldest first.
    pub async fn history(&self) -> Result<Vec<Reading>> {
        let url = format!("{}/api/readings/history", self.base_url);
        self.get(&url).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ClientError::NotReachable {
                    url: url.to_string(),
                    source: e,
                })?;

        handle_response(response).await
    }
}

#[async_trait]
impl ReadingSource for StationClient {
    async fn latest(&self) -> Result<Option<Reading>> {
        StationClient::latest(self).await
    }

    async fn history(&self) -> Result<Vec<Reading>> {
        StationClient::history(self).await
    }
}

/// Trim a trailing slash and require an http(s) scheme.
pub(crate) fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/').to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            url
        )));
    }

    Ok(url)
}

async fn handle_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        response.json().await.map_err(ClientError::Request)
    } else {
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
