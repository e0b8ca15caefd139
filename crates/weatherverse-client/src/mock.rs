//! Scripted reading source and recording notifier for testing.
//!
//! [`MockSource`] implements [`ReadingSource`] from a queue of scripted
//! responses, and [`RecordingNotifier`] implements [`Notifier`] by keeping
//! every alert it is given. Both let the poller and alert trigger be tested
//! without a running service.
//!
//! # Example
//!
//! ```
//! use weatherverse_client::{ReadingSource, mock::MockSource};
//! use weatherverse_types::Reading;
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = MockSource::new();
//!     source.push_failure("connection refused");
//!     source.push_reading(Reading::now(26.0, 40.0));
//!
//!     assert!(source.latest().await.is_err());
//!     assert!(source.latest().await.unwrap().is_some());
//!     assert_eq!(source.latest_calls(), 2);
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use weatherverse_types::Reading;

use crate::alert::Alert;
use crate::error::{ClientError, NotifyError, Result};
use crate::notify::Notifier;
use crate::source::ReadingSource;

#[derive(Debug, Clone)]
enum Scripted {
    Reading(Reading),
    Empty,
    Failure(String),
}

/// A [`ReadingSource`] that replays scripted responses.
///
/// Each call to `latest()` consumes the next scripted response. Once the
/// script is exhausted the last reading returned is repeated (or `None` if
/// there was none), which is what a live service does between posts.
#[derive(Debug, Default)]
pub struct MockSource {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<Reading>>,
    history: Mutex<Vec<Reading>>,
    fail_history: AtomicBool,
    latest_calls: AtomicU32,
    history_calls: AtomicU32,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the readings returned by `history()`.
    #[must_use]
    pub fn with_history(self, history: Vec<Reading>) -> Self {
        if let Ok(mut h) = self.history.lock() {
            *h = history;
        }
        self
    }

    /// Make `history()` fail.
    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::Relaxed);
    }

    /// Queue a reading for `latest()`.
    pub fn push_reading(&self, reading: Reading) {
        self.push(Scripted::Reading(reading));
    }

    /// Queue a `None` response for `latest()`.
    pub fn push_empty(&self) {
        self.push(Scripted::Empty);
    }

    /// Queue a failed `latest()` call.
    pub fn push_failure(&self, message: &str) {
        self.push(Scripted::Failure(message.to_string()));
    }

    /// Number of `latest()` calls made.
    pub fn latest_calls(&self) -> u32 {
        self.latest_calls.load(Ordering::Relaxed)
    }

    /// Number of `history()` calls made.
    pub fn history_calls(&self) -> u32 {
        self.history_calls.load(Ordering::Relaxed)
    }

    fn push(&self, item: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(item);
        }
    }
}

fn mock_failure(message: String) -> ClientError {
    ClientError::Api {
        status: 503,
        message,
    }
}

#[async_trait]
impl ReadingSource for MockSource {
    async fn latest(&self) -> Result<Option<Reading>> {
        self.latest_calls.fetch_add(1, Ordering::Relaxed);

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = self
            .last
            .lock()
            .map_err(|_| mock_failure("mock state poisoned".to_string()))?;

        match next {
            Some(Scripted::Reading(reading)) => {
                *last = Some(reading);
                Ok(Some(reading))
            }
            Some(Scripted::Empty) => Ok(None),
            Some(Scripted::Failure(message)) => Err(mock_failure(message)),
            None => Ok(*last),
        }
    }

    async fn history(&self) -> Result<Vec<Reading>> {
        self.history_calls.fetch_add(1, Ordering::Relaxed);

        if self.fail_history.load(Ordering::Relaxed) {
            return Err(mock_failure("history unavailable".to_string()));
        }
        self.history
            .lock()
            .map(|h| h.clone())
            .map_err(|_| mock_failure("mock state poisoned".to_string()))
    }
}

/// A [`Notifier`] that records every alert it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
    should_fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records alerts and then reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of delivery attempts.
    pub fn count(&self) -> usize {
        self.alerts.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// Alerts received so far.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, alert: &Alert) -> std::result::Result<(), NotifyError> {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert.clone());
        }
        if self.should_fail {
            return Err(NotifyError::Rejected { status: 500 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_replayed_in_order() {
        let source = MockSource::new();
        source.push_empty();
        source.push_reading(Reading::now(26.0, 40.0));
        source.push_failure("boom");

        assert!(source.latest().await.unwrap().is_none());
        assert_eq!(source.latest().await.unwrap().unwrap().temperature(), 26.0);
        assert!(source.latest().await.is_err());
        assert_eq!(source.latest_calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_script_repeats_last_reading() {
        let source = MockSource::new();
        assert!(source.latest().await.unwrap().is_none());

        let reading = Reading::now(26.0, 40.0);
        source.push_reading(reading);
        source.latest().await.unwrap();

        assert_eq!(source.latest().await.unwrap(), Some(reading));
    }

    #[tokio::test]
    async fn test_history() {
        let source = MockSource::new().with_history(vec![Reading::now(20.0, 30.0)]);
        assert_eq!(source.history().await.unwrap().len(), 1);

        source.fail_history(true);
        assert!(source.history().await.is_err());
        assert_eq!(source.history_calls(), 2);
    }
}
