use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    model::{Coordinates, SunData, SunWindow},
    provider::{http_client, truncate_body},
};

use super::SunDataClient;

const DEFAULT_BASE_URL: &str = "https://api.sunrise-sunset.org";

/// Client for the sunrise-sunset.org JSON API.
#[derive(Debug, Clone)]
pub struct SunriseSunsetClient {
    base_url: String,
    http: Client,
}

impl SunriseSunsetClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
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
impl SunDataClient for SunriseSunsetClient {
    async fn fetch(&self, coordinates: Coordinates, date: NaiveDate) -> Result<SunData> {
        let url = format!("{}/json", self.base_url);
        tracing::debug!(%coordinates, %date, "requesting sun data");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lng", coordinates.longitude.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
                // Unformatted output carries ISO 8601 UTC instants.
                ("formatted", "0".to_string()),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send request to sunrise-sunset.org ({date})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read sunrise-sunset.org response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "sunrise-sunset.org request for {} failed with status {}: {}",
                date,
                status,
                truncate_body(&body),
            ));
        }

        Ok(parse_sun_body(&body, date))
    }
}

#[derive(Debug, Deserialize)]
struct SsResponse {
    results: Option<serde_json::Value>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SsResults {
    sunrise: String,
    sunset: String,
}

/// Anything other than a well-formed, ordered sunrise/sunset pair is `Empty`.
pub(crate) fn parse_sun_body(body: &str, date: NaiveDate) -> SunData {
    let parsed: SsResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(
                %date,
                error = %e,
                body = %truncate_body(body),
                "malformed sun data response"
            );
            return SunData::Empty;
        }
    };

    if let Some(status) = parsed.status.as_deref().filter(|s| *s != "OK") {
        tracing::warn!(%date, status, "sun data provider reported an error");
        return SunData::Empty;
    }

    let Some(results) = parsed.results.filter(serde_json::Value::is_object) else {
        return SunData::Empty;
    };

    let Ok(results) = serde_json::from_value::<SsResults>(results) else {
        tracing::warn!(%date, "sun data results lack sunrise/sunset");
        return SunData::Empty;
    };

    let sunrise = parse_instant(&results.sunrise);
    let sunset = parse_instant(&results.sunset);
    let (Some(sunrise), Some(sunset)) = (sunrise, sunset) else {
        tracing::warn!(%date, "sun data timestamps are not ISO 8601");
        return SunData::Empty;
    };

    match SunWindow::new(date, sunrise, sunset) {
        Some(window) => SunData::Window(window),
        None => {
            // Polar day/night comes back as identical placeholder instants.
            tracing::debug!(%date, %sunrise, %sunset, "no usable daylight window");
            SunData::Empty
        }
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stub_server;
    use axum::http::StatusCode;
    use chrono::TimeZone;

    const JUNE_BODY: &str = r#"{
        "results": {
            "sunrise": "2024-06-01T03:45:00+00:00",
            "sunset": "2024-06-01T19:45:00+00:00",
            "solar_noon": "2024-06-01T11:45:00+00:00",
            "day_length": 57600
        },
        "status": "OK",
        "tzid": "UTC"
    }"#;

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn june_utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    fn client(base_url: &str) -> SunriseSunsetClient {
        SunriseSunsetClient::new(Duration::from_secs(2))
            .unwrap()
            .with_base_url(base_url)
    }

    #[test]
    fn parses_unformatted_response() {
        let SunData::Window(window) = parse_sun_body(JUNE_BODY, june_first()) else {
            panic!("expected a window");
        };
        assert_eq!(window.date, june_first());
        assert_eq!(window.sunrise_utc, june_utc(3, 45));
        assert_eq!(window.sunset_utc, june_utc(19, 45));
    }

    #[test]
    fn non_utc_offsets_are_normalised() {
        let body = r#"{
            "results": {
                "sunrise": "2024-06-01T05:45:00+02:00",
                "sunset": "2024-06-01T21:45:00+02:00"
            },
            "status": "OK"
        }"#;

        let SunData::Window(window) = parse_sun_body(body, june_first()) else {
            panic!("expected a window");
        };
        assert_eq!(window.sunrise_utc, june_utc(3, 45));
    }

    #[test]
    fn error_status_is_empty() {
        let body = r#"{"results": "", "status": "INVALID_REQUEST"}"#;
        assert_eq!(parse_sun_body(body, june_first()), SunData::Empty);
    }

    #[test]
    fn absent_results_is_empty() {
        for body in [r#"{"status": "OK"}"#, r#"{"results": null}"#, r#"{"results": {}}"#] {
            assert_eq!(parse_sun_body(body, june_first()), SunData::Empty);
        }
    }

    #[test]
    fn polar_placeholders_are_empty() {
        let body = r#"{
            "results": {
                "sunrise": "1970-01-01T00:00:01+00:00",
                "sunset": "1970-01-01T00:00:01+00:00"
            },
            "status": "OK"
        }"#;
        assert_eq!(parse_sun_body(body, june_first()), SunData::Empty);
    }

    #[test]
    fn formatted_times_are_empty() {
        let body = r#"{"results": {"sunrise": "3:45:00 AM", "sunset": "7:45:00 PM"}}"#;
        assert_eq!(parse_sun_body(body, june_first()), SunData::Empty);
    }

    #[test]
    fn garbage_is_empty() {
        let out = parse_sun_body("Service Unavailable", june_first());
        assert_eq!(out, SunData::Empty);
    }

    #[tokio::test]
    async fn sends_coordinates_date_and_unformatted_flag() {
        let (base_url, queries) = stub_server("/json", StatusCode::OK, JUNE_BODY).await;
        let paris = Coordinates::new(48.85, 2.35);

        let data = client(&base_url).fetch(paris, june_first()).await.unwrap();

        assert!(matches!(data, SunData::Window(w) if w.sunset_utc == june_utc(19, 45)));
        let sent = queries.single();
        assert_eq!(sent.get("lat").map(String::as_str), Some("48.85"));
        assert_eq!(sent.get("lng").map(String::as_str), Some("2.35"));
        assert_eq!(sent.get("date").map(String::as_str), Some("2024-06-01"));
        assert_eq!(sent.get("formatted").map(String::as_str), Some("0"));
    }

    #[tokio::test]
    async fn server_error_is_err() {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let (base_url, _) = stub_server("/json", status, "upstream down").await;
        let paris = Coordinates::new(48.85, 2.35);

        let err = client(&base_url)
            .fetch(paris, june_first())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("500"));
    }

    #[tokio::test]
    async fn provider_error_payload_is_empty() {
        let body = r#"{"results": "", "status": "INVALID_DATE"}"#;
        let (base_url, _) = stub_server("/json", StatusCode::OK, body).await;
        let paris = Coordinates::new(48.85, 2.35);

        let data = client(&base_url).fetch(paris, june_first()).await.unwrap();

        assert_eq!(data, SunData::Empty);
    }
}
