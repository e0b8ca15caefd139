//! Error types for weatherverse-store.

/// Result type for weatherverse-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in weatherverse-store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// History capacity outside the accepted range.
    #[error("Invalid history capacity {capacity}: must be between 1 and {max}")]
    InvalidCapacity { capacity: usize, max: usize },
}
