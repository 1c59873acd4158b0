use chrono::{DateTime, Utc};

use crate::{
    Config,
    calculator::DaylightCalculator,
    error::{DaylightError, Result},
    model::{DaylightReport, Geocoded},
    provider::{GeocodingClient, geocoder_from_config, sun_data_from_config},
    timezone::TimeZoneConverter,
};

/// Entry point: city name in, daylight report out.
#[derive(Debug)]
pub struct DaylightService {
    geocoder: Box<dyn GeocodingClient>,
    calculator: DaylightCalculator,
}

impl DaylightService {
    pub fn new(geocoder: Box<dyn GeocodingClient>, calculator: DaylightCalculator) -> Self {
        Self {
            geocoder,
            calculator,
        }
    }

    /// Wire up the real providers from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let geocoder = geocoder_from_config(config)?;
        let sun = sun_data_from_config(config)?;
        let converter = TimeZoneConverter::new(config.target_zone()?);

        let calculator = DaylightCalculator::new(sun, converter, config.reference_year)
            .with_fetch_timeout(config.request_timeout());

        Ok(Self::new(geocoder, calculator))
    }

    pub async fn get_report(&self, city_name: &str) -> Result<DaylightReport> {
        self.get_report_at(city_name, Utc::now()).await
    }

    /// Like [`get_report`](Self::get_report) with an explicit clock.
    ///
    /// "Today" is the calendar date of `now` in the target zone.
    pub async fn get_report_at(
        &self,
        city_name: &str,
        now: DateTime<Utc>,
    ) -> Result<DaylightReport> {
        let city_name = city_name.trim();
        if city_name.is_empty() {
            return Err(DaylightError::CityNotFound(city_name.to_string()));
        }

        let coordinates = match self.geocoder.resolve(city_name).await {
            Ok(Geocoded::Found(coordinates)) => coordinates,
            Ok(Geocoded::NotFound) => {
                tracing::info!(city = city_name, "city not found");
                return Err(DaylightError::CityNotFound(city_name.to_string()));
            }
            Err(e) => return Err(DaylightError::ProviderUnreachable(e)),
        };

        let today = self.calculator.converter().to_local(now).date_naive();
        let computation = self.calculator.compute(coordinates, today, now).await;

        tracing::info!(
            city = city_name,
            %coordinates,
            %today,
            entries = computation.day_lengths.len(),
            degraded = computation.today.is_none(),
            "daylight report assembled"
        );

        Ok(DaylightReport::new(city_name, computation))
    }
}
