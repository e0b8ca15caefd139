//! Background polling of the station service.
//!
//! [`DashboardPoller::spawn`] starts a task that asks a [`ReadingSource`] for
//! the latest reading once per interval, feeds it into a [`Dashboard`] and
//! publishes the resulting [`Snapshot`] on a `watch` channel. Failed polls
//! are logged and skipped; the next tick simply tries again.
//!
//! ```ignore
//! let client = Arc::new(StationClient::new("http://127.0.0.1:3000")?);
//! let mut poller = DashboardPoller::spawn(client, PollerOptions::default(), None);
//! let mut snapshots = poller.subscribe();
//!
//! while snapshots.changed().await.is_ok() {
//!     if let Some(snapshot) = snapshots.borrow().clone() {
//!         println!("{}", snapshot.current);
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use time::UtcOffset;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use weatherverse_types::DEFAULT_HISTORY_CAPACITY;

use crate::alert::AlertTrigger;
use crate::dashboard::{Dashboard, Snapshot};
use crate::source::ReadingSource;

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Failures logged at `warn` before the poller reports the outage once at `error`.
const WARN_FAILURES: u32 = 3;

/// Options for the dashboard poller.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerOptions {
    /// Time between polls. Default: 30 seconds.
    pub poll_interval: Duration,
    /// Readings kept by the dashboard. Default: 24.
    pub history_capacity: usize,
    /// Fill the dashboard from the service history before the first poll.
    /// Default: true.
    pub seed_from_history: bool,
    /// Offset used for the time of day on snapshots. Default: UTC.
    pub utc_offset: UtcOffset,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed_from_history: true,
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl PollerOptions {
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    #[must_use]
    pub fn seed_from_history(mut self, seed: bool) -> Self {
        self.seed_from_history = seed;
        self
    }

    #[must_use]
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

/// Spawns the dashboard polling task.
pub struct DashboardPoller;

impl DashboardPoller {
    /// Start polling `source`. Must be called from within a tokio runtime.
    ///
    /// A zero `poll_interval` is raised to one millisecond.
    pub fn spawn<S>(
        source: Arc<S>,
        options: PollerOptions,
        mut alert: Option<AlertTrigger>,
    ) -> PollerHandle
    where
        S: ReadingSource + ?Sized + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut dashboard =
                Dashboard::new(options.history_capacity).with_offset(options.utc_offset);

            if options.seed_from_history {
                tokio::select! {
                    _ = task_token.cancelled() => return,
                    result = source.history() => match result {
                        Ok(history) => {
                            let seeded = dashboard.seed(history);
                            debug!("Seeded dashboard with {} readings", seeded);
                            if let Some(snapshot) = dashboard.snapshot() {
                                if let Some(trigger) = alert.as_mut() {
                                    trigger.check(&snapshot.current);
                                }
                                tx.send_replace(Some(snapshot));
                            }
                        }
                        Err(e) => warn!("Could not load history, starting empty: {}", e),
                    },
                }
            }

            let period = options.poll_interval.max(Duration::from_millis(1));
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut failures = FailureTracker::default();

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("Poller cancelled, stopping");
                        break;
                    }
                    _ = timer.tick() => {
                        let result = source.latest().await;
                        if result.is_ok()
                            && let Some(count) = failures.recovered()
                        {
                            info!("Service reachable again after {} failed polls", count);
                        }

                        match result {
                            Ok(Some(reading)) => {
                                if !dashboard.push(reading) {
                                    debug!("No new reading since last poll");
                                    continue;
                                }
                                if let Some(trigger) = alert.as_mut() {
                                    trigger.check(&reading);
                                }
                                if let Some(snapshot) = dashboard.snapshot() {
                                    tx.send_replace(Some(snapshot));
                                }
                            }
                            Ok(None) => debug!("No data yet"),
                            Err(e) => match failures.failed() {
                                FailureLevel::Warn => {
                                    warn!("Poll failed (attempt {}): {}", failures.count(), e);
                                }
                                FailureLevel::Error => error!(
                                    "Poll failed {} times in a row, suppressing further warnings: {}",
                                    failures.count(),
                                    e
                                ),
                                FailureLevel::Silent => {}
                            },
                        }
                    }
                }
            }
        });

        PollerHandle {
            handle: Some(handle),
            cancel_token,
            snapshots: rx,
        }
    }
}

/// How a failed poll should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureLevel {
    Warn,
    Error,
    Silent,
}

/// Counts consecutive failed polls.
#[derive(Debug, Default)]
struct FailureTracker {
    consecutive: u32,
}

impl FailureTracker {
    fn failed(&mut self) -> FailureLevel {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive <= WARN_FAILURES {
            FailureLevel::Warn
        } else if self.consecutive == WARN_FAILURES + 1 {
            FailureLevel::Error
        } else {
            FailureLevel::Silent
        }
    }

    /// Reset after any poll that reached the service, with or without data.
    ///
    /// Returns the failure count if the outage had been escalated to `error`.
    fn recovered(&mut self) -> Option<u32> {
        let count = std::mem::take(&mut self.consecutive);
        (count > WARN_FAILURES).then_some(count)
    }

    fn count(&self) -> u32 {
        self.consecutive
    }
}

/// Handle to a running poller.
///
/// Dropping the handle cancels the poller.
#[derive(Debug)]
pub struct PollerHandle {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
    snapshots: watch::Receiver<Option<Snapshot>>,
}

impl PollerHandle {
    /// Receiver of snapshots; `None` until the first reading is available.
    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Token that stops the poller when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Check if the polling task is still running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Cancel the poller and wait for the task to finish.
    ///
    /// A poll already in flight completes first (bounded by the request timeout).
    pub async fn stop(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!("Poller task ended abnormally: {}", e);
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
