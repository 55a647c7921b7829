use std::time::Duration;

use crate::cli::{Cli, LocationArgs};
use crate::engine::constants::{
    DEFAULT_API_URL, DEFAULT_IP_LOCATION_URL, DEFAULT_LOCATION_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAMPLE_CAP,
};
use crate::error::{MealError, Result};
use crate::models::Coordinate;

/// How the client obtains the user's position.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSetting {
    /// No location capability; nearby discovery fails with `LocationUnavailable`.
    None,
    /// Coordinates supplied up front.
    Fixed(Coordinate),
    /// Approximate position from an IP geolocation service.
    IpLookup(String),
}

/// Runtime configuration shared by every command.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without a trailing slash.
    pub api_url: String,
    pub session_id: Option<String>,
    pub request_timeout: Duration,
    pub location_timeout: Duration,
    pub sample_cap: usize,
    pub location: LocationSetting,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_id: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            location_timeout: Duration::from_secs(DEFAULT_LOCATION_TIMEOUT_SECS),
            sample_cap: DEFAULT_SAMPLE_CAP,
            location: LocationSetting::None,
        }
    }
}

impl ClientConfig {
    /// Build from the global CLI flags. Location is filled in per command.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_url = normalize_api_url(&cli.api_url)?;

        if cli.timeout_secs == 0 {
            return Err(MealError::Config(
                "--timeout-secs must be at least 1".to_string(),
            ));
        }

        let session_id = cli
            .session
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            api_url,
            session_id,
            request_timeout: Duration::from_secs(cli.timeout_secs),
            ..Self::default()
        })
    }

    /// Apply a command's location flags.
    pub fn with_location(mut self, args: &LocationArgs) -> Result<Self> {
        self.location = match (args.lat, args.lng, args.locate_ip) {
            (Some(lat), Some(lng), _) => LocationSetting::Fixed(
                Coordinate::new(lat, lng).map_err(|e| MealError::Config(e.to_string()))?,
            ),
            (_, _, true) => LocationSetting::IpLookup(DEFAULT_IP_LOCATION_URL.to_string()),
            _ => LocationSetting::None,
        };

        if let Some(secs) = args.location_timeout_secs {
            if secs == 0 {
                return Err(MealError::Config(
                    "--location-timeout-secs must be at least 1".to_string(),
                ));
            }
            self.location_timeout = Duration::from_secs(secs);
        }

        Ok(self)
    }

    /// Override the per-restaurant sample size.
    pub fn with_sample_cap(mut self, cap: Option<usize>) -> Result<Self> {
        if let Some(cap) = cap {
            if cap == 0 {
                return Err(MealError::Config(
                    "--per-restaurant must be at least 1".to_string(),
                ));
            }
            self.sample_cap = cap;
        }
        Ok(self)
    }
}

/// Strip the trailing slash and reject anything that is not an http(s) URL.
fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(MealError::Config(format!(
            "API URL must start with http:// or https://, got {raw:?}"
        )));
    }
    reqwest::Url::parse(trimmed)
        .map_err(|e| MealError::Config(format!("invalid API URL {raw:?}: {e}")))?;
    Ok(trimmed.to_string())
}
