//! Capped buffer of the readings shown on the dashboard.

use std::collections::VecDeque;

use weatherverse_types::{DEFAULT_HISTORY_CAPACITY, Reading};

/// FIFO of the most recent readings, oldest first.
///
/// Holds at most `capacity` readings; pushing onto a full buffer evicts the
/// oldest. A reading with the same timestamp as the newest entry is the one
/// already shown and is ignored, so polling faster than the device reports
/// does not duplicate points.
#[derive(Debug, Clone)]
pub struct ReadingBuffer {
    capacity: usize,
    readings: VecDeque<Reading>,
}

impl Default for ReadingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ReadingBuffer {
    /// Create a buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a reading. Returns `false` if it was a duplicate of the newest entry.
    pub fn push(&mut self, reading: Reading) -> bool {
        if self
            .readings
            .back()
            .is_some_and(|newest| newest.timestamp() == reading.timestamp())
        {
            return false;
        }

        while self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
        true
    }

    /// Push every reading in order; returns how many were accepted.
    pub fn seed<I>(&mut self, readings: I) -> usize
    where
        I: IntoIterator<Item = Reading>,
    {
        readings
            .into_iter()
            .filter(|reading| self.push(*reading))
            .count()
    }

    /// The newest reading.
    pub fn current(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// The reading before the newest one.
    pub fn previous(&self) -> Option<&Reading> {
        self.readings.len().checked_sub(2).and_then(|i| self.readings.get(i))
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
