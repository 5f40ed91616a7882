//! Clock times and time-of-day fare/duration bands.
//!
//! Quoted durations and fares are scaled by the traffic band of the
//! requested clock time: morning and evening peaks slow journeys down and
//! cost a surcharge, late-night off-peak runs faster with a discount.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day: {reason}")]
pub struct InvalidTimeOfDay {
    reason: &'static str,
}

/// A clock time of day, used to adjust quoted durations and fares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Parse an `HH:MM` clock time.
    pub fn parse_hhmm(s: &str) -> Result<Self, InvalidTimeOfDay> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| InvalidTimeOfDay {
                reason: "expected HH:MM",
            })
    }

    /// Build from an hour and minute, if in range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// The hour component (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// The minute component (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// The traffic band this time falls into.
    ///
    /// Bands are decided by the hour component: 7-9 and 17-19 are peak,
    /// 22 onward and up to 5 are off-peak, everything else is normal.
    pub fn band(&self) -> TimeBand {
        let hour = self.0.hour();
        if (7..=9).contains(&hour) || (17..=19).contains(&hour) {
            TimeBand::Peak
        } else if hour >= 22 || hour <= 5 {
            TimeBand::OffPeak
        } else {
            TimeBand::Normal
        }
    }

    /// The duration/fare multipliers for this time.
    pub fn adjustment(&self) -> Adjustment {
        self.band().adjustment()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Traffic band for a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    /// Morning and evening rush hours.
    Peak,
    /// Late night and early morning.
    OffPeak,
    /// Everything else.
    Normal,
}

impl TimeBand {
    /// Duration and fare multipliers for this band.
    pub fn adjustment(&self) -> Adjustment {
        match self {
            TimeBand::Peak => Adjustment {
                duration: 1.3,
                fare: 1.1,
            },
            TimeBand::OffPeak => Adjustment {
                duration: 1.1,
                fare: 0.9,
            },
            TimeBand::Normal => Adjustment {
                duration: 1.0,
                fare: 1.0,
            },
        }
    }
}

/// Multipliers applied to a path's quoted totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub duration: f64,
    pub fare: f64,
}

impl Adjustment {
    /// Scale a duration, rounding to whole minutes.
    pub fn apply_duration(&self, minutes: f64) -> f64 {
        (minutes * self.duration).round()
    }

    /// Scale a fare, rounding to whole currency units.
    pub fn apply_fare(&self, fare: f64) -> f64 {
        (fare * self.fare).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid() {
        assert_eq!(t("08:30").hour(), 8);
        assert_eq!(t("08:30").minute(), 30);
        assert_eq!(t("00:00").hour(), 0);
        assert_eq!(t("23:59").minute(), 59);
    }

    #[test]
    fn parse_invalid() {
        assert!(TimeOfDay::parse_hhmm("24:00").is_err());
        assert!(TimeOfDay::parse_hhmm("12:60").is_err());
        assert!(TimeOfDay::parse_hhmm("noon").is_err());
        assert!(TimeOfDay::parse_hhmm("").is_err());
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(t("07:00").band(), TimeBand::Peak);
        assert_eq!(t("09:59").band(), TimeBand::Peak);
        assert_eq!(t("10:00").band(), TimeBand::Normal);
        assert_eq!(t("17:00").band(), TimeBand::Peak);
        assert_eq!(t("19:30").band(), TimeBand::Peak);
        assert_eq!(t("20:00").band(), TimeBand::Normal);
        assert_eq!(t("22:00").band(), TimeBand::OffPeak);
        assert_eq!(t("02:15").band(), TimeBand::OffPeak);
        assert_eq!(t("05:59").band(), TimeBand::OffPeak);
        assert_eq!(t("06:30").band(), TimeBand::Normal);
    }

    #[test]
    fn peak_adjustment() {
        let adj = t("08:00").adjustment();
        assert_eq!(adj.apply_duration(100.0), 130.0);
        assert_eq!(adj.apply_fare(100.0), 110.0);
    }

    #[test]
    fn off_peak_adjustment() {
        let adj = t("23:00").adjustment();
        assert_eq!(adj.apply_duration(100.0), 110.0);
        assert_eq!(adj.apply_fare(100.0), 90.0);
    }

    #[test]
    fn normal_adjustment() {
        let adj = t("12:00").adjustment();
        assert_eq!(adj.apply_duration(100.0), 100.0);
        assert_eq!(adj.apply_fare(100.0), 100.0);
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(t("08:05").to_string(), "08:05");
        assert_eq!(t("23:59").to_string(), "23:59");
    }
}
