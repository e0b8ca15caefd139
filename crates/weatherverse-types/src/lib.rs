//! Shared types for the WeatherVerse weather station.
//!
//! This crate provides the reading entity and the input coercion rules used
//! by both the HTTP service (weatherverse-service) and the dashboard client
//! (weatherverse-client).
//!
//! # Example
//!
//! ```
//! use weatherverse_types::{Reading, parse_numeric, parse_optional_timestamp};
//!
//! let temperature = parse_numeric("temperature", "26")?;
//! let humidity = parse_numeric("humidity", "40.5")?;
//! let timestamp = parse_optional_timestamp(Some("2025-04-22T09:00:00"))?;
//!
//! let reading = Reading::stamped(temperature, humidity, timestamp);
//! assert_eq!(reading.humidity(), 40.5);
//! # Ok::<(), weatherverse_types::ParseError>(())
//! ```

pub mod coerce;
pub mod error;
pub mod reading;

pub use coerce::{
    coerce_optional, ensure_finite, parse_numeric, parse_optional_timestamp, parse_timestamp,
};
pub use error::{ParseError, ParseResult};
pub use reading::Reading;

/// Number of readings kept by the history store and the dashboard buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 24;

/// Upper bound accepted for a configured history capacity.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;
