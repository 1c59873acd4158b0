//! In-memory provider fakes shared by the unit tests.

use async_trait::async_trait;
use axum::{Router, extract::Query, http::StatusCode, routing::get};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    model::{Coordinates, Geocoded, SunData, SunWindow},
    provider::{GeocodingClient, SunDataClient},
};

#[derive(Debug, Clone)]
pub enum Reply {
    Window(SunWindow),
    Empty,
    Fail,
    /// Never answers within any sensible timeout.
    Hang,
    /// Answers with the default window after a delay.
    Delayed(Duration),
    /// Empty on the first request for the date, the default window afterwards.
    FirstEmpty,
}

#[derive(Debug)]
pub struct FakeSunData {
    sunrise: NaiveTime,
    day_length: TimeDelta,
    overrides: HashMap<NaiveDate, Reply>,
    calls: Mutex<Vec<NaiveDate>>,
}

impl FakeSunData {
    /// Every date gets the same UTC sunrise and day length unless overridden.
    pub fn uniform(sunrise: NaiveTime, day_length: TimeDelta) -> Self {
        Self {
            sunrise,
            day_length,
            overrides: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, date: NaiveDate, reply: Reply) -> Self {
        self.overrides.insert(date, reply);
        self
    }

    pub fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }

    fn default_window(&self, date: NaiveDate) -> SunWindow {
        let sunrise = date.and_time(self.sunrise).and_utc();
        SunWindow::new(date, sunrise, sunrise + self.day_length).unwrap()
    }
}

#[async_trait]
impl SunDataClient for FakeSunData {
    async fn fetch(&self, _coordinates: Coordinates, date: NaiveDate) -> anyhow::Result<SunData> {
        let earlier_calls = {
            let mut calls = self.calls.lock().unwrap();
            let earlier = calls.iter().filter(|d| **d == date).count();
            calls.push(date);
            earlier
        };

        match self.overrides.get(&date).cloned() {
            None => Ok(SunData::Window(self.default_window(date))),
            Some(Reply::Window(window)) => Ok(SunData::Window(window)),
            Some(Reply::Empty) => Ok(SunData::Empty),
            Some(Reply::Fail) => Err(anyhow::anyhow!("connection refused")),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Ok(SunData::Empty)
            }
            Some(Reply::Delayed(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(SunData::Window(self.default_window(date)))
            }
            Some(Reply::FirstEmpty) if earlier_calls == 0 => Ok(SunData::Empty),
            Some(Reply::FirstEmpty) => Ok(SunData::Window(self.default_window(date))),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Coordinates>,
    unreachable: bool,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new()
        }
    }

    pub fn with(mut self, city: &str, coordinates: Coordinates) -> Self {
        self.places.insert(city.to_string(), coordinates);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingClient for FakeGeocoder {
    async fn resolve(&self, city_name: &str) -> anyhow::Result<Geocoded> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unreachable {
            return Err(anyhow::anyhow!("dns error: no such host"));
        }

        let place = self.places.get(city_name).copied();
        Ok(place.map_or(Geocoded::NotFound, Geocoded::Found))
    }
}

/// Query strings received by a [`stub_server`].
#[derive(Debug, Clone, Default)]
pub struct RecordedQueries(Arc<Mutex<Vec<HashMap<String, String>>>>);

impl RecordedQueries {
    /// The only query received; panics unless exactly one request arrived.
    pub fn single(&self) -> HashMap<String, String> {
        let queries = self.0.lock().unwrap();
        assert_eq!(queries.len(), 1, "expected one request, got {queries:?}");
        queries[0].clone()
    }
}

/// Serves `body` with `status` on `path` from an ephemeral local port.
///
/// Returns the base URL and a handle to the recorded query strings.
pub async fn stub_server(
    path: &str,
    status: StatusCode,
    body: &'static str,
) -> (String, RecordedQueries) {
    let recorded = RecordedQueries::default();
    let seen = recorded.clone();

    let app = Router::new().route(
        path,
        get(move |Query(query): Query<HashMap<String, String>>| async move {
            seen.0.lock().unwrap().push(query);
            (status, body)
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), recorded)
}
