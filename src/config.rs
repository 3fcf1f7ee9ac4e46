use crate::error::ConfigError;
use crate::models::Location;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://toolkit.rork.com/text/llm/";

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub llm_endpoint: String,
    /// Pause between successive source queries
    pub request_delay: Duration,
    pub http_timeout: Duration,
    pub data_dir: PathBuf,
    pub location: Location,
    /// When set, the binary keeps searching on this interval
    pub interval_hours: Option<u64>,
    pub log_level: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            request_delay: Duration::from_millis(2000),
            http_timeout: Duration::from_secs(30),
            data_dir: PathBuf::from("data"),
            location: Location::new("Austin", "TX"),
            interval_hours: None,
            log_level: "info".to_string(),
        }
    }
}

impl ScoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; unset names keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidNumber { name, value }),
            }
        };

        Ok(Self {
            llm_endpoint: lookup("SCOUT_LLM_ENDPOINT").unwrap_or(defaults.llm_endpoint),
            request_delay: number("SCOUT_REQUEST_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            http_timeout: number("SCOUT_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            data_dir: lookup("SCOUT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            location: Location::new(
                lookup("SCOUT_CITY").unwrap_or(defaults.location.city),
                lookup("SCOUT_STATE").unwrap_or(defaults.location.state),
            ),
            interval_hours: number("SCOUT_INTERVAL_HOURS")?,
            log_level: lookup("SCOUT_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}
