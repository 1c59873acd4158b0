use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    Config,
    model::{Coordinates, Geocoded, SunData},
    provider::{geocode_maps::GeocodeMapsClient, sunrise_sunset::SunriseSunsetClient},
};

pub mod geocode_maps;
pub mod sunrise_sunset;

/// Resolves a free-text city name to coordinates.
///
/// `Err` means the provider could not be reached or answered with an HTTP
/// error; an unknown city is `Ok(Geocoded::NotFound)`.
#[async_trait]
pub trait GeocodingClient: Send + Sync + Debug {
    async fn resolve(&self, city_name: &str) -> anyhow::Result<Geocoded>;
}

/// Retrieves the UTC sunrise/sunset pair for a date at some coordinates.
#[async_trait]
pub trait SunDataClient: Send + Sync + Debug {
    async fn fetch(&self, coordinates: Coordinates, date: NaiveDate) -> anyhow::Result<SunData>;
}

#[async_trait]
impl<T: GeocodingClient + ?Sized> GeocodingClient for Arc<T> {
    async fn resolve(&self, city_name: &str) -> anyhow::Result<Geocoded> {
        (**self).resolve(city_name).await
    }
}

#[async_trait]
impl<T: SunDataClient + ?Sized> SunDataClient for Arc<T> {
    async fn fetch(&self, coordinates: Coordinates, date: NaiveDate) -> anyhow::Result<SunData> {
        (**self).fetch(coordinates, date).await
    }
}

/// Construct the geocoding client from config.
pub fn geocoder_from_config(config: &Config) -> anyhow::Result<Box<dyn GeocodingClient>> {
    let api_key = config.geocode_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No geocoding API key configured.\n\
                 Hint: run `daylight configure` or set DAYLIGHT_GEOCODE_API_KEY."
        )
    })?;

    let client = GeocodeMapsClient::new(api_key, config.request_timeout())?;
    Ok(Box::new(client))
}

/// Construct the sun data client from config.
pub fn sun_data_from_config(config: &Config) -> anyhow::Result<Box<dyn SunDataClient>> {
    let client = SunriseSunsetClient::new(config.request_timeout())?;
    Ok(Box::new(client))
}

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
