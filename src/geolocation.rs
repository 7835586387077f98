//! Device position providers

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinates;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Unable to get your location. Please allow location access.")]
    Denied,
    #[error("Geolocation is not available on this system")]
    Unsupported,
}

/// Which provider `--geolocation` selects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GeolocationMode {
    /// Location access not granted
    #[default]
    Off,
    /// Approximate position from the public IP address
    Ip,
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// A position given up front, e.g. from `--lat`/`--lon`
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Location access switched off
pub struct Disabled;

#[async_trait]
impl GeolocationProvider for Disabled {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Denied)
    }
}

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,lat,lon";

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate position from an IP lookup service
pub struct IpGeolocation {
    client: Client,
    url: String,
}

impl IpGeolocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl GeolocationProvider for IpGeolocation {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(error = %e, "ip lookup request failed");
                GeolocationError::Unsupported
            })?;

        let data: IpLookupResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "ip lookup response unreadable");
            GeolocationError::Unsupported
        })?;

        if data.status != "success" {
            tracing::warn!(status = %data.status, "ip lookup did not resolve");
            return Err(GeolocationError::Unsupported);
        }

        data.lat
            .zip(data.lon)
            .and_then(|(lat, lon)| Coordinates::new(lat, lon))
            .ok_or(GeolocationError::Unsupported)
    }
}

/// Choose a provider: explicit coordinates win over the mode.
pub fn provider_for(
    mode: GeolocationMode,
    fixed: Option<Coordinates>,
    ip_lookup_url: &str,
) -> Box<dyn GeolocationProvider> {
    match (fixed, mode) {
        (Some(coords), _) => Box::new(FixedPosition(coords)),
        (None, GeolocationMode::Ip) => Box::new(IpGeolocation::new(ip_lookup_url)),
        (None, GeolocationMode::Off) => Box::new(Disabled),
    }
}
