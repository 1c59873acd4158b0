//! JSON shapes served to the chart front end.

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::model::DaylightReport;

pub const NOT_FOUND_MESSAGE: &str = "Could not find the coordinates for the entered city.";

const TIME_LEFT_KEY: &str = "time_left_for_sunset";

/// `{cityName, daylightChanges, sunrise?, sunset?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaylightPayload {
    pub city_name: String,
    pub daylight_changes: DaylightChanges,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
}

/// Date → "H hours M minutes", plus the sunset status line, in date order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaylightChanges {
    pub entries: Vec<(String, String)>,
    pub time_left_for_sunset: Option<String>,
}

impl Serialize for DaylightChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.entries.len() + usize::from(self.time_left_for_sunset.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (date, length) in &self.entries {
            map.serialize_entry(date, length)?;
        }
        if let Some(status) = &self.time_left_for_sunset {
            map.serialize_entry(TIME_LEFT_KEY, status)?;
        }
        map.end()
    }
}

impl DaylightPayload {
    pub fn from_report(report: &DaylightReport) -> Self {
        let entries = report
            .day_lengths
            .iter()
            .map(|entry| {
                let date = entry.date.format("%Y-%m-%d").to_string();
                (date, entry.duration.to_string())
            })
            .collect();

        let today = report.today.as_ref();

        Self {
            city_name: report.city_name.clone(),
            daylight_changes: DaylightChanges {
                entries,
                time_left_for_sunset: today.map(|t| t.sunset_status.to_string()),
            },
            sunrise: today.map(|t| t.sunrise.format("%H:%M:%S").to_string()),
            sunset: today.map(|t| t.sunset.format("%H:%M:%S").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(NOT_FOUND_MESSAGE)
    }
}
