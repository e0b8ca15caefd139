//! Retention modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use weatherverse_types::{DEFAULT_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY};

use crate::error::{Error, Result};

/// Which retention discipline a deployment uses, without its parameters.
///
/// This is the form used in configuration files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Keep only the most recent reading.
    Latest,
    /// Keep a bounded FIFO history.
    #[default]
    History,
}

impl StoreKind {
    /// Lowercase name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Latest => "latest",
            StoreKind::History => "history",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" | "latest-only" => Ok(StoreKind::Latest),
            "history" => Ok(StoreKind::History),
            other => Err(format!(
                "unknown store mode '{}': expected 'latest' or 'history'",
                other
            )),
        }
    }
}

/// Retention mode of a [`Store`](crate::Store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Exactly one slot, replaced on every write.
    Latest,
    /// Ordered history of at most `capacity` readings; the oldest is evicted first.
    History { capacity: usize },
}

impl StoreMode {
    /// History mode with the given capacity, validated.
    pub fn history(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_HISTORY_CAPACITY {
            return Err(Error::InvalidCapacity {
                capacity,
                max: MAX_HISTORY_CAPACITY,
            });
        }
        Ok(StoreMode::History { capacity })
    }

    /// Check that a history capacity is within bounds.
    ///
    /// Needed for modes built directly from the `History` variant rather than
    /// through [`StoreMode::history`].
    pub fn validate(&self) -> Result<()> {
        match *self {
            StoreMode::Latest => Ok(()),
            StoreMode::History { capacity } => Self::history(capacity).map(|_| ()),
        }
    }

    /// Build a mode from its configured kind and capacity.
    ///
    /// The capacity is ignored for [`StoreKind::Latest`].
    pub fn from_kind(kind: StoreKind, capacity: usize) -> Result<Self> {
        match kind {
            StoreKind::Latest => Ok(StoreMode::Latest),
            StoreKind::History => Self::history(capacity),
        }
    }

    /// The kind of this mode.
    pub fn kind(&self) -> StoreKind {
        match self {
            StoreMode::Latest => StoreKind::Latest,
            StoreMode::History { .. } => StoreKind::History,
        }
    }

    /// Maximum number of readings retained.
    pub fn capacity(&self) -> usize {
        match self {
            StoreMode::Latest => 1,
            StoreMode::History { capacity } => *capacity,
        }
    }
}

impl Default for StoreMode {
    fn default() -> Self {
        StoreMode::History {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
