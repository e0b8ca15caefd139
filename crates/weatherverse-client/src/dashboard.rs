//! Dashboard model: the reading buffer and the snapshot rendered from it.

use serde::Serialize;
use time::UtcOffset;

use weatherverse_types::Reading;

use crate::buffer::ReadingBuffer;
use crate::display::{TemperatureBand, TimeOfDay, Trend, is_heat_wave, is_high_humidity};

/// Everything the dashboard shows for its newest reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub current: Reading,
    pub previous: Option<Reading>,
    /// `None` until there are two readings.
    pub temperature_trend: Option<Trend>,
    pub humidity_trend: Option<Trend>,
    pub temperature_band: TemperatureBand,
    pub heat_wave: bool,
    pub high_humidity: bool,
    pub time_of_day: TimeOfDay,
    /// Number of readings in the buffer.
    pub history_len: usize,
}

impl Snapshot {
    /// Derive a snapshot from the current and previous readings.
    ///
    /// The time of day is taken at `offset`, normally the viewer's local one.
    pub fn new(
        current: Reading,
        previous: Option<Reading>,
        history_len: usize,
        offset: UtcOffset,
    ) -> Self {
        Self {
            current,
            previous,
            temperature_trend: previous
                .map(|p| Trend::between(current.temperature(), p.temperature())),
            humidity_trend: previous.map(|p| Trend::between(current.humidity(), p.humidity())),
            temperature_band: TemperatureBand::from_celsius(current.temperature()),
            heat_wave: is_heat_wave(current.temperature()),
            high_humidity: is_high_humidity(current.humidity()),
            time_of_day: TimeOfDay::at_offset(current.timestamp(), offset),
            history_len,
        }
    }
}

/// Client-side dashboard state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    buffer: ReadingBuffer,
    offset: UtcOffset,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            buffer: ReadingBuffer::default(),
            offset: UtcOffset::UTC,
        }
    }
}

impl Dashboard {
    /// Dashboard keeping `capacity` readings, showing times of day in UTC.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: ReadingBuffer::new(capacity),
            offset: UtcOffset::UTC,
        }
    }

    /// Show times of day at `offset` instead of UTC.
    #[must_use]
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Fill the buffer from the service history. Returns how many were accepted.
    pub fn seed(&mut self, readings: Vec<Reading>) -> usize {
        self.buffer.seed(readings)
    }

    /// Add a polled reading. Returns `false` if it was already shown.
    pub fn push(&mut self, reading: Reading) -> bool {
        self.buffer.push(reading)
    }

    /// Snapshot of the newest reading, or `None` while the buffer is empty.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let current = *self.buffer.current()?;
        let previous = self.buffer.previous().copied();
        Some(Snapshot::new(
            current,
            previous,
            self.buffer.len(),
            self.offset,
        ))
    }

    pub fn buffer(&self) -> &ReadingBuffer {
        &self.buffer
    }
}
