use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::model::{LocalSunTimes, SunWindow};

/// Converts UTC instants to wall-clock time in one fixed zone.
///
/// Offsets come from the tz database, so daylight-saving transitions are
/// applied per instant rather than with a static offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneConverter {
    zone: Tz,
}

impl TimeZoneConverter {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.zone)
    }

    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveTime {
        self.to_local(instant).time()
    }

    /// Maps a local wall-clock reading back to UTC.
    ///
    /// During the repeated hour of a fall-back transition the earlier instant
    /// is returned; readings inside a spring-forward gap have no instant.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.zone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn local_sun_times(&self, window: &SunWindow) -> LocalSunTimes {
        LocalSunTimes {
            sunrise: self.local_time(window.sunrise_utc),
            sunset: self.local_time(window.sunset_utc),
        }
    }
}
