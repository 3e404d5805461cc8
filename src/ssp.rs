//! `ScheduleStopPair` records as transitland exports them, and the
//! conjunctive service filters used to cut the extract down to the window
//! the animation plays (one weekday, 4pm-8pm).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, ser, Deserialize, Serialize};

/// A local time within a service day. The hour runs past 23 so that
/// after-midnight stops stay on the schedule day they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    seconds_since_midnight: u32,
}

impl TimeOfDay {
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> TimeOfDay {
        TimeOfDay {
            seconds_since_midnight: (hours * 60 + minutes) * 60 + seconds,
        }
    }

    /// The clock hour; can be 24 or more.
    pub fn hour(self) -> u32 {
        self.seconds_since_midnight / 3600
    }

    fn minute(self) -> u32 {
        (self.seconds_since_midnight / 60) % 60
    }

    fn second(self) -> u32 {
        self.seconds_since_midnight % 60
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        let (hh, mm, ss) = if s.len() == 8 {
            if s[2] != b':' || s[5] != b':' {
                return Err(TimeParseError::InvalidFormat);
            }
            (&s[0..2], &s[3..5], &s[6..8])
        } else if s.len() == 7 {
            if s[1] != b':' || s[4] != b':' {
                return Err(TimeParseError::InvalidFormat);
            }
            (&s[0..1], &s[2..4], &s[5..7])
        } else {
            return Err(TimeParseError::InvalidFormat);
        };
        use std::str::from_utf8;
        let hours: u32 = from_utf8(hh)?.parse()?;
        let minutes: u32 = from_utf8(mm)?.parse()?;
        let seconds: u32 = from_utf8(ss)?.parse()?;
        if seconds > 59 || minutes > 59 {
            return Err(TimeParseError::TooManySecondsOrMinutes);
        }
        Ok(TimeOfDay::from_hms(hours, minutes, seconds))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl ser::Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> de::Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<TimeOfDay, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    InvalidFormat,
    TooManySecondsOrMinutes,
    ParseIntError(std::num::ParseIntError),
    Utf8Error(std::str::Utf8Error),
}

impl From<std::num::ParseIntError> for TimeParseError {
    fn from(error: std::num::ParseIntError) -> Self {
        TimeParseError::ParseIntError(error)
    }
}

impl From<std::str::Utf8Error> for TimeParseError {
    fn from(error: std::str::Utf8Error) -> Self {
        TimeParseError::Utf8Error(error)
    }
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeParseError::InvalidFormat => write!(f, "expected H:MM:SS or HH:MM:SS"),
            TimeParseError::TooManySecondsOrMinutes => {
                write!(f, "minutes and seconds must be below 60")
            }
            TimeParseError::ParseIntError(error) => error.fmt(f),
            TimeParseError::Utf8Error(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for TimeParseError {}

/// The fields of a transitland `ScheduleStopPair` the filters read. The
/// extract lines carry much more; binaries echo the original line through
/// untouched, so nothing is lost by not modelling the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStopPair {
    pub origin_onestop_id: String,
    pub destination_onestop_id: String,
    pub route_onestop_id: String,
    #[serde(default)]
    pub route_stop_pattern_onestop_id: Option<String>,
    #[serde(default)]
    pub operator_onestop_id: Option<String>,
    pub origin_departure_time: TimeOfDay,
    pub destination_arrival_time: TimeOfDay,
    /// Monday-first, as transitland orders it.
    #[serde(default)]
    pub service_days_of_week: [bool; 7],
    #[serde(default)]
    pub service_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub service_end_date: Option<NaiveDate>,
}

/// Conjunction of optional service clauses; an unset clause constrains
/// nothing. A record missing the data a set clause needs does not match —
/// it cannot demonstrate the service.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SspFilter {
    /// 0 is Monday, 6 is Sunday.
    pub day_of_week: Option<usize>,
    /// Origin departure hour >= this.
    pub start_hour: Option<u32>,
    /// Origin departure hour < this (non-inclusive).
    pub end_hour: Option<u32>,
    /// service_start_date <= this < service_end_date.
    pub service_date: Option<NaiveDate>,
}

impl SspFilter {
    pub fn matches(&self, ssp: &ScheduleStopPair) -> bool {
        if let Some(day) = self.day_of_week {
            if !ssp.service_days_of_week.get(day).copied().unwrap_or(false) {
                return false;
            }
        }
        if let Some(start) = self.start_hour {
            if ssp.origin_departure_time.hour() < start {
                return false;
            }
        }
        if let Some(end) = self.end_hour {
            if ssp.origin_departure_time.hour() >= end {
                return false;
            }
        }
        if let Some(date) = self.service_date {
            match (ssp.service_start_date, ssp.service_end_date) {
                (Some(start), Some(end)) => {
                    if date < start || date >= end {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    pub fn is_unconstrained(&self) -> bool {
        *self == SspFilter::default()
    }
}
