//! Values derived from readings for presentation.
//!
//! These mirror the cues the dashboard shows next to each reading: the change
//! since the previous reading, a colour band for temperature, heat-wave and
//! high-humidity indicators, and the time of day the reading falls in.

use core::fmt;

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

/// Temperatures below this are shown as cool.
pub const COOL_BELOW: f64 = 28.0;

/// Temperatures above this are shown as hot, with a heat-wave cue.
pub const HOT_ABOVE: f64 = 32.0;

/// Humidity above this shows the high-humidity cue.
pub const HIGH_HUMIDITY_ABOVE: f64 = 40.0;

/// Change of a value between two consecutive readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "direction", content = "delta", rename_all = "lowercase")]
pub enum Trend {
    /// Value went up by the given (positive) amount.
    Increase(f64),
    /// Value went down by the given (positive) amount.
    Decrease(f64),
    NoChange,
}

impl Trend {
    /// Compare a value with its previous value.
    ///
    /// The difference is rounded to one decimal, the precision it is shown
    /// with, so a change too small to display is reported as no change.
    pub fn between(current: f64, previous: f64) -> Self {
        let diff = ((current - previous) * 10.0).round() / 10.0;
        if diff > 0.0 {
            Trend::Increase(diff)
        } else if diff < 0.0 {
            Trend::Decrease(-diff)
        } else {
            Trend::NoChange
        }
    }

    /// Signed difference (`0.0` for no change).
    pub fn delta(&self) -> f64 {
        match self {
            Trend::Increase(d) => *d,
            Trend::Decrease(d) => -*d,
            Trend::NoChange => 0.0,
        }
    }

    /// Label such as `+1.5°C`, `-2.0%` or `No change`.
    pub fn label(&self, unit: &str) -> String {
        match self {
            Trend::Increase(d) => format!("+{:.1}{}", d, unit),
            Trend::Decrease(d) => format!("-{:.1}{}", d, unit),
            Trend::NoChange => "No change".to_string(),
        }
    }
}

/// Colour band of a temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Cool,
    Mild,
    Hot,
}

impl TemperatureBand {
    pub fn from_celsius(celsius: f64) -> Self {
        if celsius < COOL_BELOW {
            TemperatureBand::Cool
        } else if celsius > HOT_ABOVE {
            TemperatureBand::Hot
        } else {
            TemperatureBand::Mild
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureBand::Cool => "cool",
            TemperatureBand::Mild => "mild",
            TemperatureBand::Hot => "hot",
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a temperature warrants the heat-wave cue.
pub fn is_heat_wave(celsius: f64) -> bool {
    celsius > HOT_ABOVE
}

/// Whether a humidity warrants the high-humidity cue.
pub fn is_high_humidity(percent: f64) -> bool {
    percent > HIGH_HUMIDITY_ABOVE
}

/// Part of the day a reading falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 to 16:59.
    Day,
    /// 17:00 to 19:59.
    Sunset,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            6..=16 => TimeOfDay::Day,
            17..=19 => TimeOfDay::Sunset,
            _ => TimeOfDay::Night,
        }
    }

    /// Time of day of a timestamp, in that timestamp's own offset.
    pub fn at(timestamp: OffsetDateTime) -> Self {
        Self::from_hour(timestamp.hour())
    }

    /// Time of day of a timestamp as seen from `offset`.
    ///
    /// Readings are stamped in UTC, so the dashboard passes the viewer's
    /// local offset here.
    pub fn at_offset(timestamp: OffsetDateTime, offset: UtcOffset) -> Self {
        Self::at(timestamp.to_offset(offset))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Sunset => "sunset",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn test_trend_between() {
        assert_eq!(Trend::between(26.0, 24.5), Trend::Increase(1.5));
        assert_eq!(Trend::between(38.0, 40.0), Trend::Decrease(2.0));
        assert_eq!(Trend::between(26.0, 26.0), Trend::NoChange);
    }

    #[test]
    fn test_trend_below_display_precision() {
        assert_eq!(Trend::between(26.02, 26.0), Trend::NoChange);
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(Trend::between(26.0, 24.5).label("°C"), "+1.5°C");
        assert_eq!(Trend::between(38.0, 40.0).label("%"), "-2.0%");
        assert_eq!(Trend::NoChange.label("°C"), "No change");
    }

    #[test]
    fn test_trend_delta() {
        assert_eq!(Trend::Increase(1.5).delta(), 1.5);
        assert_eq!(Trend::Decrease(2.0).delta(), -2.0);
        assert_eq!(Trend::NoChange.delta(), 0.0);
    }

    #[test]
    fn test_temperature_bands() {
        assert_eq!(TemperatureBand::from_celsius(27.9), TemperatureBand::Cool);
        assert_eq!(TemperatureBand::from_celsius(28.0), TemperatureBand::Mild);
        assert_eq!(TemperatureBand::from_celsius(32.0), TemperatureBand::Mild);
        assert_eq!(TemperatureBand::from_celsius(32.1), TemperatureBand::Hot);
    }

    #[test]
    fn test_indicators() {
        assert!(!is_heat_wave(32.0));
        assert!(is_heat_wave(33.0));
        assert!(!is_high_humidity(40.0));
        assert!(is_high_humidity(41.0));
    }

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Sunset);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Sunset);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn test_time_of_day_at() {
        assert_eq!(TimeOfDay::at(datetime!(2025-04-22 09:00:00 UTC)), TimeOfDay::Day);
        assert_eq!(
            TimeOfDay::at(datetime!(2025-04-22 18:30:00 +02:00)),
            TimeOfDay::Sunset
        );
    }

    #[test]
    fn test_time_of_day_in_viewer_offset() {
        let ts = datetime!(2025-04-22 16:30:00 UTC);
        assert_eq!(TimeOfDay::at(ts), TimeOfDay::Day);
        assert_eq!(TimeOfDay::at_offset(ts, offset!(+02:00)), TimeOfDay::Sunset);
        assert_eq!(TimeOfDay::at_offset(ts, offset!(-08:00)), TimeOfDay::Day);
        assert_eq!(TimeOfDay::at_offset(ts, offset!(+05:00)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::at_offset(ts, UtcOffset::UTC), TimeOfDay::Day);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_value(TemperatureBand::Hot).unwrap(),
            serde_json::json!("hot")
        );
        assert_eq!(
            serde_json::to_value(Trend::Increase(1.5)).unwrap(),
            serde_json::json!({"direction": "increase", "delta": 1.5})
        );
    }
}
