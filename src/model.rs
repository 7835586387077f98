//! Domain types shared by the client, the reducer and the components

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A validated latitude/longitude pair
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and within range.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

/// What to ask the upstream service about: a place name or a position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum LocationQuery {
    Name(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Trimmed place-name query, or `None` when the name is blank.
    pub fn name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(LocationQuery::Name(name.to_string()))
        }
    }

    /// The place name, for name queries.
    pub fn place_name(&self) -> Option<&str> {
        match self {
            LocationQuery::Name(name) => Some(name),
            LocationQuery::Coordinates(_) => None,
        }
    }

    /// Query parameters addressing this location.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Name(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates(coords) => vec![
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
            ],
        }
    }

    pub fn label(&self) -> String {
        match self {
            LocationQuery::Name(name) => name.clone(),
            LocationQuery::Coordinates(c) => format!("{:.2}, {:.2}", c.lat, c.lon),
        }
    }
}

/// Measurement convention requested from the upstream service
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn toggle(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Value of the `units` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    /// Rounded temperature with its unit, e.g. `23°C`.
    pub fn format_temperature(&self, value: f64) -> String {
        // `+ 0.0` turns a rounded -0 into 0
        format!("{}{}", value.round() + 0.0, self.temperature_suffix())
    }
}

/// Current conditions at the queried location
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// hPa
    pub pressure: f64,
    pub wind_speed: f64,
    pub cloud_cover: u8,
    /// Metres
    pub visibility: u32,
    /// Primary condition label, e.g. "Rain"
    pub condition: String,
    pub description: String,
    pub sunrise: i64,
    pub sunset: i64,
    /// Observation time, epoch seconds
    pub observed_at: i64,
    /// Seconds east of UTC
    pub utc_offset: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastPoint {
    pub time: i64,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
}

/// Samples per day at the upstream's 3-hour interval.
pub const POINTS_PER_DAY: usize = 8;
/// Days shown in the forecast strip.
pub const FORECAST_DAYS: usize = 5;

/// Forecast points at a fixed 3-hour sampling interval
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One sample per day: every 8th point, at most five.
    pub fn daily(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points
            .iter()
            .step_by(POINTS_PER_DAY)
            .take(FORECAST_DAYS)
    }
}

/// Current conditions and forecast, always fetched and replaced together
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: ForecastSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: i64) -> ForecastPoint {
        ForecastPoint {
            time,
            ..Default::default()
        }
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(50.45, 30.52).is_some());
        assert!(Coordinates::new(90.0, -180.0).is_some());
        assert!(Coordinates::new(90.1, 0.0).is_none());
        assert!(Coordinates::new(0.0, 180.5).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_name_query_rejects_blank() {
        assert_eq!(LocationQuery::name("   "), None);
        assert_eq!(
            LocationQuery::name(" Paris "),
            Some(LocationQuery::Name("Paris".into()))
        );
    }

    #[test]
    fn test_query_params() {
        let by_name = LocationQuery::Name("London".into());
        assert_eq!(by_name.params(), vec![("q", "London".to_string())]);

        let by_coords = LocationQuery::Coordinates(Coordinates { lat: 1.5, lon: -2.25 });
        assert_eq!(
            by_coords.params(),
            vec![("lat", "1.5".to_string()), ("lon", "-2.25".to_string())]
        );
    }

    #[test]
    fn test_unit_suffixes() {
        assert_eq!(UnitSystem::Metric.as_param(), "metric");
        assert_eq!(UnitSystem::Imperial.as_param(), "imperial");
        assert_eq!(UnitSystem::Metric.format_temperature(22.6), "23°C");
        assert_eq!(UnitSystem::Imperial.format_temperature(71.2), "71°F");
        assert_eq!(UnitSystem::Metric.toggle(), UnitSystem::Imperial);
    }

    #[test]
    fn test_daily_picks_every_eighth_point() {
        let series = ForecastSeries {
            points: (0..40).map(point).collect(),
        };
        let picked: Vec<i64> = series.daily().map(|p| p.time).collect();
        assert_eq!(picked, vec![0, 8, 16, 24, 32]);
    }

    #[test]
    fn test_daily_short_series() {
        let series = ForecastSeries {
            points: (0..10).map(point).collect(),
        };
        let picked: Vec<i64> = series.daily().map(|p| p.time).collect();
        assert_eq!(picked, vec![0, 8]);
    }
}
