//! Ingest payloads and their validation.
//!
//! Devices send readings either as a JSON body (canonical) or as query-string
//! parameters (older firmware). Both decode into loosely typed payloads that
//! are validated into a [`ValidReading`] before the store is touched.

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use weatherverse_types::{
    ParseError, ParseResult, coerce_optional, ensure_finite, parse_numeric,
    parse_optional_timestamp,
};

/// JSON body accepted by `POST /api/readings`.
///
/// Fields are kept as raw JSON values so that numbers sent as strings can be
/// coerced and anything else reported with a precise message.
#[derive(Debug, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub humidity: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Query parameters accepted by the legacy `GET /update` route.
#[derive(Debug, Default, Deserialize)]
pub struct IngestQuery {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub timestamp: Option<String>,
}

/// A reading that passed validation and can be recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidReading {
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: Option<OffsetDateTime>,
}

impl IngestRequest {
    /// Validate and coerce the payload.
    ///
    /// Fields are checked in the order temperature, humidity, timestamp; the
    /// first failure is returned.
    pub fn validate(&self) -> ParseResult<ValidReading> {
        let temperature = coerce_value("temperature", self.temperature.as_ref())?;
        let humidity = coerce_value("humidity", self.humidity.as_ref())?;
        let timestamp = match &self.timestamp {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => parse_optional_timestamp(Some(s.as_str()))?,
            Some(other) => return Err(ParseError::InvalidTimestamp(other.to_string())),
        };

        Ok(ValidReading {
            temperature,
            humidity,
            timestamp,
        })
    }
}

impl IngestQuery {
    /// Validate and coerce the query parameters.
    pub fn validate(&self) -> ParseResult<ValidReading> {
        Ok(ValidReading {
            temperature: coerce_optional("temperature", self.temperature.as_deref())?,
            humidity: coerce_optional("humidity", self.humidity.as_deref())?,
            timestamp: parse_optional_timestamp(self.timestamp.as_deref())?,
        })
    }
}

/// Coerce a raw JSON value to a finite number.
fn coerce_value(field: &'static str, value: Option<&Value>) -> ParseResult<f64> {
    match value {
        None | Some(Value::Null) => Err(ParseError::MissingField(field)),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => ensure_finite(field, v),
            None => Err(ParseError::NotNumeric {
                field,
                value: n.to_string(),
            }),
        },
        Some(Value::String(s)) => parse_numeric(field, s),
        Some(other) => Err(ParseError::NotNumeric {
            field,
            value: other.to_string(),
        }),
    }
}
