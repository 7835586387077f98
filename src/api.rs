//! OpenWeatherMap API client

use std::fmt;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::model::{
    CurrentConditions, ForecastPoint, ForecastSeries, LocationQuery, UnitSystem, WeatherReport,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

/// The only message shown to the user when a fetch fails.
pub const LOCATION_NOT_FOUND: &str = "Location not found. Please try again.";

// ============================================================================
// Errors
// ============================================================================

/// One of the two concurrent upstream requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    Current,
    Forecast,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Current => write!(f, "current conditions"),
            Leg::Forecast => write!(f, "forecast"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("{leg} request failed: {source}")]
    Network {
        leg: Leg,
        #[source]
        source: reqwest::Error,
    },
    #[error("{leg} request rejected with HTTP {status}")]
    UpstreamRejected { leg: Leg, status: StatusCode },
    #[error("{leg} response could not be decoded: {reason}")]
    MalformedResponse { leg: Leg, reason: String },
}

impl FetchError {
    /// Every failure collapses to the same user-facing text; the
    /// `Display` output carries the detail for the log.
    pub fn user_message(&self) -> &'static str {
        LOCATION_NOT_FOUND
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct CurrentMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct CurrentSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    name: String,
    main: CurrentMain,
    wind: CurrentWind,
    clouds: CurrentClouds,
    #[serde(default)]
    visibility: u32,
    weather: Vec<ConditionEntry>,
    sys: CurrentSys,
    dt: i64,
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

fn primary_condition(leg: Leg, weather: Vec<ConditionEntry>) -> Result<ConditionEntry, FetchError> {
    weather
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::MalformedResponse {
            leg,
            reason: "empty weather array".into(),
        })
}

fn current_from_response(data: CurrentResponse) -> Result<CurrentConditions, FetchError> {
    let condition = primary_condition(Leg::Current, data.weather)?;
    Ok(CurrentConditions {
        name: data.name,
        country: data.sys.country,
        temperature: data.main.temp,
        feels_like: data.main.feels_like,
        humidity: data.main.humidity,
        pressure: data.main.pressure,
        wind_speed: data.wind.speed,
        cloud_cover: data.clouds.all,
        visibility: data.visibility,
        condition: condition.main,
        description: condition.description,
        sunrise: data.sys.sunrise,
        sunset: data.sys.sunset,
        observed_at: data.dt,
        utc_offset: data.timezone,
    })
}

fn forecast_from_response(data: ForecastResponse) -> Result<ForecastSeries, FetchError> {
    let points = data
        .list
        .into_iter()
        .map(|entry| {
            let condition = primary_condition(Leg::Forecast, entry.weather)?;
            Ok(ForecastPoint {
                time: entry.dt,
                temperature: entry.main.temp,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                condition: condition.main,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;
    Ok(ForecastSeries { points })
}

// ============================================================================
// Client
// ============================================================================

/// Connection settings for the upstream service
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Fetches current conditions and a forecast for one location
#[derive(Clone, Debug)]
pub struct WeatherClient {
    client: Client,
    config: ClientConfig,
}

impl WeatherClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("weatherdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch both legs concurrently and return them as one report.
    ///
    /// Both requests always run to completion before either result is
    /// inspected, so the caller gets the full pair or an error, never half.
    pub async fn fetch_weather(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<WeatherReport, FetchError> {
        let mut params = query.params();
        params.push(("units", units.as_param().to_string()));
        params.push(("appid", self.config.api_key.clone()));

        let current_url = self.config.url(CURRENT_PATH);
        let forecast_url = self.config.url(FORECAST_PATH);

        tracing::debug!(query = %query.label(), units = units.as_param(), "fetching weather");

        let (current, forecast) = tokio::join!(
            self.get_json::<CurrentResponse>(Leg::Current, &current_url, &params),
            self.get_json::<ForecastResponse>(Leg::Forecast, &forecast_url, &params),
        );

        let report = WeatherReport {
            current: current_from_response(current?)?,
            forecast: forecast_from_response(forecast?)?,
        };

        tracing::info!(
            place = %report.current.name,
            points = report.forecast.len(),
            "weather loaded"
        );
        Ok(report)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        leg: Leg,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|source| FetchError::Network { leg, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamRejected { leg, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network { leg, source })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::MalformedResponse {
            leg,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ClientConfig::new("key").with_base_url("http://localhost:8080/");
        assert_eq!(
            config.url(CURRENT_PATH),
            "http://localhost:8080/data/2.5/weather"
        );
    }

    #[test]
    fn test_current_decodes_first_condition() {
        let body = serde_json::json!({
            "name": "Paris",
            "main": { "temp": 18.2, "feels_like": 17.9, "humidity": 64, "pressure": 1012 },
            "wind": { "speed": 3.6 },
            "clouds": { "all": 40 },
            "visibility": 10000,
            "weather": [
                { "main": "Clouds", "description": "scattered clouds", "icon": "03d" },
                { "main": "Mist", "description": "mist", "icon": "50d" }
            ],
            "sys": { "country": "FR", "sunrise": 1700000000, "sunset": 1700040000 },
            "dt": 1700020000,
            "timezone": 3600
        });
        let data: CurrentResponse = serde_json::from_value(body).unwrap();
        let current = current_from_response(data).unwrap();

        assert_eq!(current.name, "Paris");
        assert_eq!(current.country, "FR");
        assert_eq!(current.condition, "Clouds");
        assert_eq!(current.description, "scattered clouds");
        assert_eq!(current.humidity, 64);
        assert_eq!(current.utc_offset, 3600);
    }

    #[test]
    fn test_empty_condition_array_is_malformed() {
        let body = serde_json::json!({
            "list": [{ "dt": 1, "main": { "temp": 1.0, "temp_min": 0.0, "temp_max": 2.0 }, "weather": [] }]
        });
        let data: ForecastResponse = serde_json::from_value(body).unwrap();
        let err = forecast_from_response(data).unwrap_err();

        assert!(matches!(
            err,
            FetchError::MalformedResponse {
                leg: Leg::Forecast,
                ..
            }
        ));
        assert_eq!(err.user_message(), LOCATION_NOT_FOUND);
    }
}
