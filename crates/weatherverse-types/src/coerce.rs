//! Coercion of loosely typed device input.
//!
//! Sensor firmware is not consistent about encoding: the same field may arrive
//! as a JSON number, as a quoted string, or as a query-string parameter. All
//! of them are normalized here, at the ingest boundary, so nothing downstream
//! compares strings against numbers.

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{ParseError, ParseResult};

/// Parse a textual field into a finite `f64`.
///
/// Leading and trailing whitespace is ignored. An empty or blank string is
/// treated as a missing field.
///
/// # Examples
///
/// ```
/// use weatherverse_types::{ParseError, parse_numeric};
///
/// assert_eq!(parse_numeric("temperature", " 26.5 "), Ok(26.5));
/// assert_eq!(parse_numeric("humidity", ""), Err(ParseError::MissingField("humidity")));
/// assert!(parse_numeric("humidity", "wet").is_err());
/// ```
pub fn parse_numeric(field: &'static str, raw: &str) -> ParseResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::MissingField(field));
    }

    let value: f64 = trimmed.parse().map_err(|_| ParseError::NotNumeric {
        field,
        value: raw.to_string(),
    })?;

    ensure_finite(field, value)
}

/// Coerce an optional textual field, treating `None` as missing.
pub fn coerce_optional(field: &'static str, raw: Option<&str>) -> ParseResult<f64> {
    match raw {
        Some(raw) => parse_numeric(field, raw),
        None => Err(ParseError::MissingField(field)),
    }
}

/// Reject NaN and infinities.
pub fn ensure_finite(field: &'static str, value: f64) -> ParseResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::NonFinite { field })
    }
}

/// Parse a device-supplied timestamp.
///
/// RFC 3339 strings and ISO 8601 date-times carrying an offset keep that
/// offset, including reduced-precision forms such as `2025-04-22T11:00+02:00`.
/// Offset-less ISO 8601 date-times (`2025-04-22T09:00:00`) are interpreted as
/// UTC.
///
/// # Examples
///
/// ```
/// use weatherverse_types::parse_timestamp;
///
/// let with_offset = parse_timestamp("2025-04-22T09:00:00Z").unwrap();
/// let naive = parse_timestamp("2025-04-22T09:00:00").unwrap();
/// assert_eq!(with_offset, naive);
/// ```
pub fn parse_timestamp(raw: &str) -> ParseResult<OffsetDateTime> {
    let trimmed = raw.trim();

    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(ts);
    }
    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Iso8601::DEFAULT) {
        return Ok(ts);
    }

    PrimitiveDateTime::parse(trimmed, &Iso8601::DEFAULT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| ParseError::InvalidTimestamp(raw.to_string()))
}

/// Parse an optional timestamp; absent or blank yields `None`.
pub fn parse_optional_timestamp(raw: Option<&str>) -> ParseResult<Option<OffsetDateTime>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(raw).map(Some),
        _ => Ok(None),
    }
}
