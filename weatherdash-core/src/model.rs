use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};

pub mod legacy;
pub mod unified;

pub use legacy::{LegacyCurrentConditions, LegacyForecastEntry, LegacyForecastList};
pub use unified::{
    CurrentConditions, DailyForecast, HourlyForecast, UnifiedConditions, WeatherAlert,
    WeatherCondition,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(WeatherError::InvalidQuery(format!(
                "latitude {lat} is outside -90..=90"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::InvalidQuery(format!(
                "longitude {lon} is outside -180..=180"
            )));
        }
        Ok(Self { lat, lon })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What the user asked for: a free-text place name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coords(Coordinates),
}

impl LocationQuery {
    pub fn city(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidQuery("city name is empty".to_string()));
        }
        Ok(LocationQuery::City(name.to_string()))
    }

    pub fn coords(lat: f64, lon: f64) -> Result<Self> {
        Coordinates::new(lat, lon).map(LocationQuery::Coords)
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coords(coords) => write!(f, "({coords})"),
        }
    }
}

/// First match of a direct geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl GeocodeResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Which upstream path produced a [`Resolution`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The unified endpoint answered.
    Primary,
    /// Legacy endpoints were combined into the unified shape.
    Fallback { note: String },
}

impl ResolutionOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolutionOutcome::Fallback { .. })
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::Primary => None,
            ResolutionOutcome::Fallback { note } => Some(note),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub conditions: UnifiedConditions,
    pub outcome: ResolutionOutcome,
}

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(flatten)]
    conditions: &'a UnifiedConditions,
    #[serde(rename = "_fallback", skip_serializing_if = "std::ops::Not::not")]
    fallback: bool,
    #[serde(rename = "_message", skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl Resolution {
    /// JSON document handed to the dashboard: the unified shape, plus
    /// `_fallback`/`_message` markers when legacy data was used.
    pub fn to_payload(&self) -> serde_json::Value {
        let payload = Payload {
            conditions: &self.conditions,
            fallback: self.outcome.is_fallback(),
            message: self.outcome.note(),
        };
        serde_json::to_value(payload).unwrap_or(serde_json::Value::Null)
    }
}
