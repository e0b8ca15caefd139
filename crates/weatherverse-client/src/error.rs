//! Error types for the station client and alert notifiers.

use thiserror::Error;

/// Errors from talking to the station service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The service is not reachable.
    #[error("Service not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed after the connection was made (bad body, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The base URL is not an http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from delivering an alert notification.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotifyError {
    /// The notification request could not be sent.
    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The notification endpoint answered with a non-success status.
    #[error("Notification rejected with status {status}")]
    Rejected { status: u16 },

    /// The webhook URL is not an http(s) URL.
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),
}
