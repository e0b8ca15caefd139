//! Threshold alerts on incoming readings.
//!
//! [`AlertThresholds`] decides which limits a reading breaches.
//! [`AlertTrigger`] adds the firing policy and hands alerts that are due to a
//! [`Notifier`] as fire-and-forget tasks.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use weatherverse_client::{AlertMode, AlertThresholds, AlertTrigger, LogNotifier};
//! use weatherverse_types::Reading;
//!
//! let mut trigger = AlertTrigger::new(
//!     AlertThresholds::default(),
//!     AlertMode::Level,
//!     Arc::new(LogNotifier),
//! );
//!
//! assert!(trigger.evaluate(&Reading::now(41.0, 50.0)).is_some());
//! assert!(trigger.evaluate(&Reading::now(39.0, 50.0)).is_none());
//! ```

use core::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use weatherverse_types::Reading;

use crate::notify::Notifier;

/// Temperature above which an alert is raised.
pub const DEFAULT_TEMPERATURE_MAX: f64 = 40.0;

/// Humidity above which an alert is raised.
pub const DEFAULT_HUMIDITY_MAX: f64 = 80.0;

/// Upper limits for temperature and humidity. Values strictly above a limit breach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub temperature_max: f64,
    pub humidity_max: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_max: DEFAULT_TEMPERATURE_MAX,
            humidity_max: DEFAULT_HUMIDITY_MAX,
        }
    }
}

/// A limit exceeded by a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "metric", rename_all = "lowercase")]
pub enum Breach {
    Temperature { value: f64, limit: f64 },
    Humidity { value: f64, limit: f64 },
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breach::Temperature { value, limit } => {
                write!(f, "temperature {:.1}°C above {:.1}°C", value, limit)
            }
            Breach::Humidity { value, limit } => {
                write!(f, "humidity {:.1}% above {:.1}%", value, limit)
            }
        }
    }
}

impl AlertThresholds {
    /// Limits breached by `reading`, temperature first.
    pub fn breaches(&self, reading: &Reading) -> Vec<Breach> {
        let mut breaches = Vec::new();
        if reading.temperature() > self.temperature_max {
            breaches.push(Breach::Temperature {
                value: reading.temperature(),
                limit: self.temperature_max,
            });
        }
        if reading.humidity() > self.humidity_max {
            breaches.push(Breach::Humidity {
                value: reading.humidity(),
                limit: self.humidity_max,
            });
        }
        breaches
    }

    /// Whether `reading` breaches any limit.
    pub fn is_breached(&self, reading: &Reading) -> bool {
        !self.breaches(reading).is_empty()
    }
}

/// When an alert fires for a reading that breaches a limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertMode {
    /// Fire for every evaluated reading that breaches a limit.
    #[default]
    Level,
    /// Fire only on the transition from normal to breached; re-arm once a
    /// reading is back within limits.
    Edge,
}

impl AlertMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertMode::Level => "level",
            AlertMode::Edge => "edge",
        }
    }
}

impl fmt::Display for AlertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "level" => Ok(AlertMode::Level),
            "edge" => Ok(AlertMode::Edge),
            other => Err(format!(
                "Unknown alert mode '{}', expected 'level' or 'edge'",
                other
            )),
        }
    }
}

/// An alert that is due for a reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub reading: Reading,
    pub breaches: Vec<Breach>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let breaches: Vec<String> = self.breaches.iter().map(ToString::to_string).collect();
        write!(f, "{} ({})", breaches.join(", "), self.reading.timestamp())
    }
}

/// Applies thresholds and a firing policy to readings, and dispatches alerts.
pub struct AlertTrigger {
    thresholds: AlertThresholds,
    mode: AlertMode,
    notifier: Arc<dyn Notifier>,
    in_breach: bool,
    fired: u64,
}

impl fmt::Debug for AlertTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertTrigger")
            .field("thresholds", &self.thresholds)
            .field("mode", &self.mode)
            .field("notifier", &self.notifier.name())
            .field("in_breach", &self.in_breach)
            .field("fired", &self.fired)
            .finish()
    }
}

impl AlertTrigger {
    pub fn new(thresholds: AlertThresholds, mode: AlertMode, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            thresholds,
            mode,
            notifier,
            in_breach: false,
            fired: 0,
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn mode(&self) -> AlertMode {
        self.mode
    }

    /// Number of alerts that have been due so far.
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// Decide whether `reading` raises an alert.
    ///
    /// Only the edge-tracking state changes; nothing is sent.
    pub fn evaluate(&mut self, reading: &Reading) -> Option<Alert> {
        let breaches = self.thresholds.breaches(reading);
        let breached = !breaches.is_empty();
        let was_in_breach = std::mem::replace(&mut self.in_breach, breached);

        let due = match self.mode {
            AlertMode::Level => breached,
            AlertMode::Edge => breached && !was_in_breach,
        };

        if !due {
            if breached {
                debug!("Limits still exceeded, alert already sent");
            }
            return None;
        }

        self.fired += 1;
        Some(Alert {
            reading: *reading,
            breaches,
        })
    }

    /// Evaluate `reading` and, if an alert is due, spawn one notification attempt.
    ///
    /// The attempt is not retried; its failure is only logged. The returned
    /// handle may be dropped without affecting delivery. Must be called from
    /// within a tokio runtime.
    pub fn check(&mut self, reading: &Reading) -> Option<JoinHandle<()>> {
        let alert = self.evaluate(reading)?;
        let notifier = Arc::clone(&self.notifier);

        Some(tokio::spawn(async move {
            match notifier.notify(&alert).await {
                Ok(()) => debug!("Alert delivered via {}", notifier.name()),
                Err(e) => warn!("Failed to send alert via {}: {}", notifier.name(), e),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingNotifier;

    fn trigger(mode: AlertMode) -> (AlertTrigger, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let trigger = AlertTrigger::new(AlertThresholds::default(), mode, notifier.clone());
        (trigger, notifier)
    }

    #[test]
    fn test_breaches_are_strict() {
        let thresholds = AlertThresholds::default();
        assert!(thresholds.breaches(&Reading::now(40.0, 80.0)).is_empty());

        let breaches = thresholds.breaches(&Reading::now(40.5, 80.5));
        assert_eq!(
            breaches,
            vec![
                Breach::Temperature {
                    value: 40.5,
                    limit: 40.0
                },
                Breach::Humidity {
                    value: 80.5,
                    limit: 80.0
                },
            ]
        );
    }

    #[test]
    fn test_either_limit_breaches() {
        let thresholds = AlertThresholds::default();
        assert!(thresholds.is_breached(&Reading::now(41.0, 50.0)));
        assert!(thresholds.is_breached(&Reading::now(20.0, 85.0)));
        assert!(!thresholds.is_breached(&Reading::now(39.0, 50.0)));
    }

    #[test]
    fn test_level_mode_fires_while_breached() {
        let (mut trigger, _) = trigger(AlertMode::Level);

        assert!(trigger.evaluate(&Reading::now(41.0, 50.0)).is_some());
        assert!(trigger.evaluate(&Reading::now(42.0, 50.0)).is_some());
        assert!(trigger.evaluate(&Reading::now(39.0, 50.0)).is_none());
        assert_eq!(trigger.fired_count(), 2);
    }

    #[test]
    fn test_edge_mode_fires_once_per_crossing() {
        let (mut trigger, _) = trigger(AlertMode::Edge);

        assert!(trigger.evaluate(&Reading::now(41.0, 50.0)).is_some());
        assert!(trigger.evaluate(&Reading::now(42.0, 50.0)).is_none());
        assert!(trigger.evaluate(&Reading::now(39.0, 50.0)).is_none());
        assert!(trigger.evaluate(&Reading::now(41.0, 50.0)).is_some());
        assert_eq!(trigger.fired_count(), 2);
    }

    #[test]
    fn test_alert_mode_parse() {
        assert_eq!("level".parse::<AlertMode>().unwrap(), AlertMode::Level);
        assert_eq!("EDGE".parse::<AlertMode>().unwrap(), AlertMode::Edge);
        assert!("sometimes".parse::<AlertMode>().is_err());
        assert_eq!(AlertMode::default(), AlertMode::Level);
    }

    #[test]
    fn test_alert_display() {
        let alert = Alert {
            reading: Reading::now(41.0, 50.0),
            breaches: AlertThresholds::default().breaches(&Reading::now(41.0, 50.0)),
        };
        assert!(alert.to_string().contains("temperature 41.0°C above 40.0°C"));
    }

    #[tokio::test]
    async fn test_check_sends_one_notification() {
        let (mut trigger, notifier) = trigger(AlertMode::Level);

        let handle = trigger.check(&Reading::now(41.0, 50.0)).unwrap();
        handle.await.unwrap();

        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.alerts()[0].reading.temperature(), 41.0);
    }

    #[tokio::test]
    async fn test_check_below_limits_sends_nothing() {
        let (mut trigger, notifier) = trigger(AlertMode::Level);

        assert!(trigger.check(&Reading::now(39.0, 50.0)).is_none());
        tokio::task::yield_now().await;
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_failed_notification_is_not_retried() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let mut trigger =
            AlertTrigger::new(AlertThresholds::default(), AlertMode::Level, notifier.clone());

        trigger.check(&Reading::now(41.0, 50.0)).unwrap().await.unwrap();

        assert_eq!(notifier.count(), 1);
    }
}
