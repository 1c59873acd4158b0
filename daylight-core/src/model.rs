use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.4}, lon={:.4}", self.latitude, self.longitude)
    }
}

/// Outcome of a geocoding lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geocoded {
    Found(Coordinates),
    NotFound,
}

/// UTC sunrise/sunset pair for one date. `sunset_utc` is always after `sunrise_utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunWindow {
    pub date: NaiveDate,
    pub sunrise_utc: DateTime<Utc>,
    pub sunset_utc: DateTime<Utc>,
}

impl SunWindow {
    /// Builds a window, rejecting pairs where sunset does not follow sunrise
    /// or the span exceeds a full day.
    pub fn new(
        date: NaiveDate,
        sunrise_utc: DateTime<Utc>,
        sunset_utc: DateTime<Utc>,
    ) -> Option<Self> {
        let span = sunset_utc - sunrise_utc;
        if span <= TimeDelta::zero() || span > TimeDelta::days(1) {
            return None;
        }

        Some(Self {
            date,
            sunrise_utc,
            sunset_utc,
        })
    }

    pub fn day_length(&self) -> HoursMinutes {
        HoursMinutes::from_delta(self.sunset_utc - self.sunrise_utc)
    }
}

/// Outcome of a sun data lookup for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunData {
    Window(SunWindow),
    Empty,
}

/// Local wall-clock sunrise and sunset in the target zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSunTimes {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

/// A duration truncated to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HoursMinutes {
    pub hours: i64,
    pub minutes: i64,
}

impl HoursMinutes {
    pub const fn new(hours: i64, minutes: i64) -> Self {
        Self { hours, minutes }
    }

    pub fn from_delta(delta: TimeDelta) -> Self {
        let total = delta.num_minutes();
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for HoursMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hours {} minutes", self.hours, self.minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLengthEntry {
    pub date: NaiveDate,
    pub duration: HoursMinutes,
}

/// Whether today's sunset is still ahead or already behind the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SunsetStatus {
    Upcoming { remaining: HoursMinutes },
    Passed { elapsed_minutes: i64 },
}

impl SunsetStatus {
    pub fn at(sunset_utc: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < sunset_utc {
            SunsetStatus::Upcoming {
                remaining: HoursMinutes::from_delta(sunset_utc - now),
            }
        } else {
            SunsetStatus::Passed {
                elapsed_minutes: (now - sunset_utc).num_minutes(),
            }
        }
    }
}

impl fmt::Display for SunsetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SunsetStatus::Upcoming { remaining } => write!(
                f,
                "{} hours {} minutes left for today's sunset",
                remaining.hours, remaining.minutes
            ),
            SunsetStatus::Passed { elapsed_minutes } => {
                write!(f, "Sunset has passed {elapsed_minutes} minutes ago.")
            }
        }
    }
}

/// Today's local sun times plus the sunset status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodaySun {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub sunset_status: SunsetStatus,
}

/// Per-date day lengths plus today's data, before the city name is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaylightComputation {
    pub day_lengths: Vec<DayLengthEntry>,
    /// `None` when today's sun data could not be fetched.
    pub today: Option<TodaySun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaylightReport {
    pub city_name: String,
    pub day_lengths: Vec<DayLengthEntry>,
    pub today: Option<TodaySun>,
}

impl DaylightReport {
    pub fn new(city_name: impl Into<String>, computation: DaylightComputation) -> Self {
        Self {
            city_name: city_name.into(),
            day_lengths: computation.day_lengths,
            today: computation.today,
        }
    }

    /// A degraded report lacks today's sunrise/sunset.
    pub fn is_degraded(&self) -> bool {
        self.today.is_none()
    }
}
