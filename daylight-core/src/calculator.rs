//! Yearly daylight curve plus today's sunset status for one location.
//!
//! The calculator queries the first day of every month of a reference year
//! and then today. All thirteen lookups run concurrently, each bounded by its
//! own timeout. A date whose lookup fails, times out or comes back empty is
//! simply left out; the report is never aborted because of a single date.

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join_all;
use std::{collections::BTreeMap, time::Duration};

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    model::{
        Coordinates, DayLengthEntry, DaylightComputation, SunData, SunWindow, SunsetStatus,
        TodaySun,
    },
    provider::SunDataClient,
    timezone::TimeZoneConverter,
};

#[derive(Debug)]
pub struct DaylightCalculator {
    sun: Box<dyn SunDataClient>,
    converter: TimeZoneConverter,
    reference_year: i32,
    fetch_timeout: Duration,
}

impl DaylightCalculator {
    pub fn new(
        sun: Box<dyn SunDataClient>,
        converter: TimeZoneConverter,
        reference_year: i32,
    ) -> Self {
        Self {
            sun,
            converter,
            reference_year,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn converter(&self) -> &TimeZoneConverter {
        &self.converter
    }

    /// Month-firsts of the reference year, then `today` last.
    pub fn dates_to_check(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (1..=12)
            .filter_map(|month| NaiveDate::from_ymd_opt(self.reference_year, month, 1))
            .chain(std::iter::once(today))
            .collect()
    }

    /// Day lengths come back sorted by date with one entry per date, even when
    /// today falls inside the reference year.
    pub async fn compute(
        &self,
        coordinates: Coordinates,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> DaylightComputation {
        let dates = self.dates_to_check(today);
        let today_index = dates.len() - 1;

        let fetches = dates
            .iter()
            .map(|&date| self.fetch_window(coordinates, date));
        let windows = join_all(fetches).await;

        let mut by_date: BTreeMap<NaiveDate, DayLengthEntry> = BTreeMap::new();
        let mut today_sun = None;

        for (index, (date, window)) in dates.into_iter().zip(windows).enumerate() {
            let Some(window) = window else {
                continue;
            };

            by_date.entry(date).or_insert(DayLengthEntry {
                date,
                duration: window.day_length(),
            });

            if index == today_index {
                today_sun = Some(self.today_sun(&window, now));
            }
        }

        if today_sun.is_none() {
            tracing::warn!(%today, "no sun data for today, report is degraded");
        }

        DaylightComputation {
            day_lengths: by_date.into_values().collect(),
            today: today_sun,
        }
    }

    fn today_sun(&self, window: &SunWindow, now: DateTime<Utc>) -> TodaySun {
        let local = self.converter.local_sun_times(window);

        TodaySun {
            sunrise: local.sunrise,
            sunset: local.sunset,
            // Compared in UTC so no zone shift is applied twice.
            sunset_status: SunsetStatus::at(window.sunset_utc, now),
        }
    }

    async fn fetch_window(&self, coordinates: Coordinates, date: NaiveDate) -> Option<SunWindow> {
        let fetch = self.sun.fetch(coordinates, date);

        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(SunData::Window(window))) => Some(window),
            Ok(Ok(SunData::Empty)) => {
                tracing::debug!(%date, "no sun data, skipping date");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    %date,
                    error = %format!("{e:#}"),
                    "sun data fetch failed, skipping date"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    %date,
                    timeout = ?self.fetch_timeout,
                    "sun data fetch timed out, skipping date"
                );
                None
            }
        }
    }
}
