//! The reading entity.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One temperature/humidity observation.
///
/// A reading is immutable: fields are only reachable through getters, and
/// stores hand out clones rather than references into their storage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Temperature in degrees Celsius.
    temperature: f64,
    /// Relative humidity percentage.
    humidity: f64,
    /// When the reading was taken (device clock) or received (server clock).
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    timestamp: OffsetDateTime,
}

impl Reading {
    /// Create a reading with an explicit timestamp.
    #[must_use]
    pub fn new(temperature: f64, humidity: f64, timestamp: OffsetDateTime) -> Self {
        Self {
            temperature,
            humidity,
            timestamp,
        }
    }

    /// Create a reading stamped with the current UTC time.
    #[must_use]
    pub fn now(temperature: f64, humidity: f64) -> Self {
        Self::new(temperature, humidity, OffsetDateTime::now_utc())
    }

    /// Create a reading, stamping it with the current UTC time if `timestamp` is `None`.
    #[must_use]
    pub fn stamped(temperature: f64, humidity: f64, timestamp: Option<OffsetDateTime>) -> Self {
        Self::new(
            temperature,
            humidity,
            timestamp.unwrap_or_else(OffsetDateTime::now_utc),
        )
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity percentage.
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Timestamp of the reading.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}°C, {:.1}% at {}",
            self.temperature, self.humidity, self.timestamp
        )
    }
}
