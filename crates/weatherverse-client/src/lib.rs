//! Dashboard, alerting and HTTP client for the WeatherVerse station.
//!
//! This crate provides:
//! - [`StationClient`], a typed client for the weatherverse-service REST API
//! - [`DashboardPoller`], a cancellable background task that polls the latest
//!   reading, keeps the last readings in a capped buffer and publishes
//!   [`Snapshot`]s with trends and display cues
//! - [`AlertTrigger`], which raises an alert when a reading exceeds the
//!   configured limits and hands it to a [`Notifier`] without blocking polling
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use weatherverse_client::{ClientConfig, DashboardPoller, StationClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::load_default()?;
//! let client = Arc::new(StationClient::new(&config.dashboard.url)?);
//!
//! let poller = DashboardPoller::spawn(
//!     client,
//!     config.dashboard.poller_options(),
//!     config.alerts.trigger()?,
//! );
//!
//! let mut snapshots = poller.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     if let Some(snapshot) = snapshots.borrow().clone() {
//!         println!("{}", snapshot.current);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod buffer;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod mock;
pub mod notify;
pub mod poller;
pub mod source;

pub use alert::{Alert, AlertMode, AlertThresholds, AlertTrigger, Breach};
pub use buffer::ReadingBuffer;
pub use client::{HealthResponse, StationClient, SubmitReading, SubmitResponse};
pub use config::{AlertConfig, ClientConfig, ConfigError, DashboardConfig, WebhookConfig};
pub use dashboard::{Dashboard, Snapshot};
pub use display::{TemperatureBand, TimeOfDay, Trend};
pub use error::{ClientError, NotifyError, Result};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use poller::{DashboardPoller, PollerHandle, PollerOptions};
pub use source::ReadingSource;
