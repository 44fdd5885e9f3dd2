//! Shapes returned by the classic `/data/2.5` endpoints.
//!
//! The provider drops fields situationally (no rain, no gusts, no sys block
//! for some stations), so almost everything is optional. Only the coordinates
//! and the temperature are required for a response to be usable.

use serde::{Deserialize, Serialize};

use super::unified::{Precipitation, WeatherCondition};
use super::Coordinates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<u32>,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub sea_level: Option<u32>,
    #[serde(default)]
    pub grnd_level: Option<u32>,
}

impl LegacyMain {
    pub fn with_temp(temp: f64) -> Self {
        Self {
            temp,
            feels_like: None,
            temp_min: None,
            temp_max: None,
            pressure: None,
            humidity: None,
            sea_level: None,
            grnd_level: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyWind {
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub deg: Option<u16>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyClouds {
    #[serde(default)]
    pub all: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacySys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// `GET /data/2.5/weather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyCurrentConditions {
    pub coord: Coordinates,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub main: LegacyMain,
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub wind: Option<LegacyWind>,
    #[serde(default)]
    pub clouds: Option<LegacyClouds>,
    #[serde(default)]
    pub rain: Option<Precipitation>,
    #[serde(default)]
    pub snow: Option<Precipitation>,
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub sys: Option<LegacySys>,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl LegacyCurrentConditions {
    /// A record carrying only the mandatory fields.
    pub fn minimal(coord: Coordinates, temp: f64) -> Self {
        Self {
            coord,
            weather: Vec::new(),
            main: LegacyMain::with_temp(temp),
            visibility: None,
            wind: None,
            clouds: None,
            rain: None,
            snow: None,
            dt: None,
            sys: None,
            timezone: None,
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyForecastEntry {
    pub dt: i64,
    pub main: LegacyMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub wind: Option<LegacyWind>,
    #[serde(default)]
    pub clouds: Option<LegacyClouds>,
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coord: Option<Coordinates>,
    #[serde(default)]
    pub timezone: Option<i64>,
}

/// `GET /data/2.5/forecast`: one entry every three hours for five days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyForecastList {
    #[serde(default)]
    pub list: Vec<LegacyForecastEntry>,
    #[serde(default)]
    pub city: Option<LegacyForecastCity>,
}

impl LegacyForecastList {
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }
}
