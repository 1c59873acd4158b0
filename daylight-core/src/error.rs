use thiserror::Error;

pub type Result<T, E = DaylightError> = std::result::Result<T, E>;

/// Failures that stop a report from being produced.
///
/// Missing sun data for individual dates is not an error; those dates are
/// left out of the report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DaylightError {
    #[error("Could not find the coordinates for city '{0}'")]
    CityNotFound(String),

    #[error("Geocoding provider unreachable: {0:#}")]
    ProviderUnreachable(anyhow::Error),
}

impl DaylightError {
    /// Whether the caller can fix this by entering a different city.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, DaylightError::CityNotFound(_))
    }
}
