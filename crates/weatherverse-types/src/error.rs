//! Error types for input parsing in weatherverse-types.

use thiserror::Error;

/// Errors that can occur when turning raw device input into a reading.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A required field was absent, null, or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field was present but could not be read as a number.
    #[error("{field} must be numeric, got {value:?}")]
    NotNumeric {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value as received.
        value: String,
    },

    /// A field parsed to NaN or infinity.
    #[error("{field} must be a finite number")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A timestamp was present but was not ISO 8601.
    #[error("invalid timestamp {0:?}: expected ISO 8601, e.g. 2025-04-22T09:00:00Z")]
    InvalidTimestamp(String),
}

impl ParseError {
    /// Returns the name of the field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ParseError::MissingField(field)
            | ParseError::NotNumeric { field, .. }
            | ParseError::NonFinite { field } => field,
            ParseError::InvalidTimestamp(_) => "timestamp",
        }
    }

    /// Returns `true` if the error is a missing field.
    pub fn is_missing(&self) -> bool {
        matches!(self, ParseError::MissingField(_))
    }
}

/// Result type alias using weatherverse-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
