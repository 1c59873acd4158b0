use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    model::{Coordinates, Geocoded},
    provider::{http_client, truncate_body},
};

use super::GeocodingClient;

const DEFAULT_BASE_URL: &str = "https://geocode.maps.co";

/// Client for the geocode.maps.co search endpoint.
#[derive(Debug, Clone)]
pub struct GeocodeMapsClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeocodeMapsClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: http_client(timeout)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl GeocodingClient for GeocodeMapsClient {
    async fn resolve(&self, city_name: &str) -> Result<Geocoded> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!(city = city_name, "requesting coordinates");

        // The request URL carries the API key, so it is stripped from errors.
        let res = self
            .http
            .get(&url)
            .query(&[("q", city_name), ("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to geocode.maps.co")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read geocode.maps.co response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "geocode.maps.co request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(parse_search_body(&body))
    }
}

/// The provider sends degrees as strings, but numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GmDegrees {
    Text(String),
    Number(f64),
}

impl GmDegrees {
    fn value(&self) -> Option<f64> {
        let value = match self {
            GmDegrees::Text(s) => s.trim().parse::<f64>().ok(),
            GmDegrees::Number(n) => Some(*n),
        };
        value.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
struct GmPlace {
    lat: Option<GmDegrees>,
    lon: Option<GmDegrees>,
}

/// First match wins; anything unusable is `NotFound`.
pub(crate) fn parse_search_body(body: &str) -> Geocoded {
    let places: Vec<GmPlace> = match serde_json::from_str(body) {
        Ok(places) => places,
        Err(e) => {
            tracing::warn!(
                error = %e,
                body = %truncate_body(body),
                "malformed geocoding response"
            );
            return Geocoded::NotFound;
        }
    };

    let Some(first) = places.first() else {
        return Geocoded::NotFound;
    };

    let lat = first.lat.as_ref().and_then(GmDegrees::value);
    let lon = first.lon.as_ref().and_then(GmDegrees::value);

    match (lat, lon) {
        (Some(lat), Some(lon)) if is_valid_position(lat, lon) => {
            Geocoded::Found(Coordinates::new(lat, lon))
        }
        _ => Geocoded::NotFound,
    }
}

fn is_valid_position(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
