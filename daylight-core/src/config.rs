use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Environment variable that overrides the stored geocoding key.
pub const API_KEY_ENV: &str = "DAYLIGHT_GEOCODE_API_KEY";

pub const DEFAULT_TIME_ZONE: &str = "Europe/Helsinki";
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geocode_api_key = "..."
/// time_zone = "Europe/Helsinki"
/// reference_year = 2024
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for geocode.maps.co.
    pub geocode_api_key: Option<String>,

    /// IANA zone all local times are reported in.
    pub time_zone: String,

    /// Year whose month-firsts make up the yearly daylight curve.
    pub reference_year: i32,

    /// Per-request budget for every outbound provider call.
    pub request_timeout_secs: u64,

    /// Bind address for `daylight serve`.
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_api_key: None,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            reference_year: DEFAULT_REFERENCE_YEAR,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// The zone name is checked by [`target_zone`](Self::target_zone), not here,
    /// so a config with a bad zone still loads and can be repaired.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "daylight", "daylight-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_geocode_api_key(&mut self, api_key: String) {
        self.geocode_api_key = Some(api_key);
    }

    /// The environment variable wins over the stored key.
    pub fn geocode_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.geocode_api_key.clone())
    }

    pub fn set_time_zone(&mut self, zone: Tz) {
        self.time_zone = zone.name().to_string();
    }

    pub fn target_zone(&self) -> Result<Tz> {
        self.time_zone.parse::<Tz>().map_err(|_| {
            anyhow!(
                "Unknown time zone '{}'.\n\
                 Hint: use an IANA name such as \"{DEFAULT_TIME_ZONE}\".",
                self.time_zone
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
