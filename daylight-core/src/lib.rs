//! Core library for the `daylight` tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding and sunrise/sunset provider clients
//! - Time zone conversion and the daylight calculator
//! - The report service and its JSON payloads
//!
//! It is used by `daylight-cli`, but can also be reused by other binaries or services.

pub mod api;
pub mod calculator;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod timezone;

#[cfg(test)]
mod testing;

pub use api::{DaylightPayload, ErrorPayload};
pub use calculator::DaylightCalculator;
pub use config::Config;
pub use error::DaylightError;
pub use model::{
    Coordinates, DayLengthEntry, DaylightReport, Geocoded, HoursMinutes, SunData, SunWindow,
    SunsetStatus, TodaySun,
};
pub use provider::{GeocodingClient, SunDataClient};
pub use service::DaylightService;
pub use timezone::TimeZoneConverter;
