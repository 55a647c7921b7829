//! Single-shot position lookup.
//!
//! The resolver asks its provider exactly once per call and never retries; the
//! caller decides whether to ask the user again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, LocationSetting};
use crate::error::LocationError;
use crate::models::Coordinate;

/// A device capability that can report the current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Position supplied up front (e.g. from `--lat/--lng`).
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate position from an IP geolocation service.
pub struct IpLocation {
    client: Client,
    url: String,
}

impl IpLocation {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                warn!(error = %e, "IP location lookup failed");
                LocationError::Unavailable
            }
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LocationError::Denied);
            }
            status if !status.is_success() => {
                warn!(%status, "IP location service returned an error");
                return Err(LocationError::Unavailable);
            }
            _ => {}
        }

        let body: IpLookupResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "IP location response was not understood");
            LocationError::Unavailable
        })?;
        coordinate_from_lookup(body)
    }
}

fn coordinate_from_lookup(body: IpLookupResponse) -> Result<Coordinate, LocationError> {
    if body.status.as_deref() == Some("fail") {
        return Err(LocationError::Unavailable);
    }
    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon).map_err(|_| LocationError::Unavailable),
        _ => Err(LocationError::Unavailable),
    }
}

/// Wraps the configured location capability into one asynchronous fetch.
pub struct GeoLocationResolver {
    provider: Option<Arc<dyn LocationProvider>>,
    timeout: Duration,
}

impl GeoLocationResolver {
    pub fn new(provider: Option<Arc<dyn LocationProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Build from configuration, sharing the HTTP client for IP lookups.
    pub fn from_config(config: &ClientConfig, client: Client) -> Self {
        let provider: Option<Arc<dyn LocationProvider>> = match &config.location {
            LocationSetting::None => None,
            LocationSetting::Fixed(coordinate) => Some(Arc::new(FixedLocation(*coordinate))),
            LocationSetting::IpLookup(url) => Some(Arc::new(IpLocation::new(client, url.clone()))),
        };
        Self::new(provider, config.location_timeout)
    }

    /// Ask for the current position once.
    pub async fn resolve(&self) -> Result<Coordinate, LocationError> {
        let provider = self.provider.as_ref().ok_or(LocationError::Unavailable)?;

        let coordinate = tokio::time::timeout(self.timeout, provider.current_position())
            .await
            .map_err(|_| LocationError::Timeout)??;

        debug!(%coordinate, "resolved location");
        Ok(coordinate)
    }
}
