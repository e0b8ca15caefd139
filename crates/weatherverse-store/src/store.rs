//! Main store implementation.

use std::collections::VecDeque;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use weatherverse_types::Reading;

use crate::error::Result;
use crate::mode::{StoreKind, StoreMode};

/// In-memory store for the station's readings.
///
/// The store is volatile: it lives exactly as long as the process that owns
/// it. It performs no locking of its own; callers sharing it across tasks
/// wrap it in a single mutex.
#[derive(Debug)]
pub struct Store {
    mode: StoreMode,
    readings: VecDeque<Reading>,
    total_recorded: u64,
    evicted: u64,
}

/// Point-in-time counters describing a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Retention mode.
    pub mode: StoreKind,
    /// Readings currently held.
    pub len: usize,
    /// Maximum readings held.
    pub capacity: usize,
    /// Readings recorded since the store was created.
    pub total_recorded: u64,
    /// Readings dropped by eviction or replacement.
    pub evicted: u64,
}

impl Store {
    /// Create a store with the given retention mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) for a
    /// history capacity of zero or above the maximum.
    pub fn new(mode: StoreMode) -> Result<Self> {
        mode.validate()?;
        Ok(Self::with_valid_mode(mode))
    }

    /// Create a store that keeps only the most recent reading.
    pub fn latest_only() -> Self {
        Self::with_valid_mode(StoreMode::Latest)
    }

    /// Create a store that keeps up to `capacity` readings.
    pub fn with_history(capacity: usize) -> Result<Self> {
        Ok(Self::with_valid_mode(StoreMode::history(capacity)?))
    }

    fn with_valid_mode(mode: StoreMode) -> Self {
        Self {
            mode,
            readings: VecDeque::with_capacity(mode.capacity()),
            total_recorded: 0,
            evicted: 0,
        }
    }

    /// The store's retention mode.
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    // === Writes ===

    /// Record a reading, stamping it with the current time if `timestamp` is `None`.
    ///
    /// Input is expected to be validated already; this never fails.
    pub fn record_reading(
        &mut self,
        temperature: f64,
        humidity: f64,
        timestamp: Option<OffsetDateTime>,
    ) -> Reading {
        self.record(Reading::stamped(temperature, humidity, timestamp))
    }

    /// Record an already constructed reading.
    ///
    /// In latest mode the single slot is replaced. In history mode the oldest
    /// reading is evicted first if the store is full, then the new reading is
    /// appended.
    pub fn record(&mut self, reading: Reading) -> Reading {
        let capacity = self.mode.capacity();

        // At most one reading is over capacity at a time.
        if self.readings.len() >= capacity
            && let Some(old) = self.readings.pop_front()
        {
            self.evicted += 1;
            debug!("Evicted reading from {}", old.timestamp());
        }

        self.readings.push_back(reading);
        self.total_recorded += 1;
        reading
    }

    // === Reads ===

    /// The most recently recorded reading, if any.
    pub fn latest(&self) -> Option<Reading> {
        self.readings.back().copied()
    }

    /// All retained readings, oldest first.
    ///
    /// Always empty in latest mode.
    pub fn history(&self) -> Vec<Reading> {
        match self.mode {
            StoreMode::Latest => Vec::new(),
            StoreMode::History { .. } => self.readings.iter().copied().collect(),
        }
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Current counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            mode: self.mode.kind(),
            len: self.readings.len(),
            capacity: self.mode.capacity(),
            total_recorded: self.total_recorded,
            evicted: self.evicted,
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::with_valid_mode(StoreMode::default())
    }
}
