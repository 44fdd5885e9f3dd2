use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

use crate::{
    error::{Result, WeatherError},
    model::{GeocodeResult, LegacyCurrentConditions, LegacyForecastList, LocationQuery, UnifiedConditions},
};

pub mod openweather;

pub use openweather::{ClientSettings, OpenWeatherClient};

/// Sections of the unified document that can be left out with `exclude=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Current,
    Minutely,
    Hourly,
    Daily,
    Alerts,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Current => "current",
            Section::Minutely => "minutely",
            Section::Hourly => "hourly",
            Section::Daily => "daily",
            Section::Alerts => "alerts",
        }
    }

    pub const fn all() -> &'static [Section] {
        &[
            Section::Current,
            Section::Minutely,
            Section::Hourly,
            Section::Daily,
            Section::Alerts,
        ]
    }

    /// Comma-separated value for the `exclude` query parameter, without duplicates.
    pub fn to_csv(sections: &[Section]) -> String {
        let mut seen: Vec<&'static str> = Vec::with_capacity(sections.len());
        for section in sections {
            if !seen.contains(&section.as_str()) {
                seen.push(section.as_str());
            }
        }
        seen.join(",")
    }

    /// Parse a comma-separated list such as `"hourly, alerts"`.
    pub fn parse_list(csv: &str) -> Result<Vec<Section>> {
        csv.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Section::try_from)
            .collect()
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Section {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "current" => Ok(Section::Current),
            "minutely" => Ok(Section::Minutely),
            "hourly" => Ok(Section::Hourly),
            "daily" => Ok(Section::Daily),
            "alerts" => Ok(Section::Alerts),
            _ => Err(WeatherError::InvalidQuery(format!(
                "Unknown section '{value}'. Supported sections: current, minutely, hourly, daily, alerts."
            ))),
        }
    }
}

/// The provider endpoint a call went to; carried by every provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Geocoding,
    OneCall,
    CurrentWeather,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Geocoding => "geocoding",
            Endpoint::OneCall => "one-call",
            Endpoint::CurrentWeather => "current-weather",
            Endpoint::Forecast => "forecast",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Geocoding => "/geo/1.0/direct",
            Endpoint::OneCall => "/data/3.0/onecall",
            Endpoint::CurrentWeather => "/data/2.5/weather",
            Endpoint::Forecast => "/data/2.5/forecast",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Geocoding,
            Endpoint::OneCall,
            Endpoint::CurrentWeather,
            Endpoint::Forecast,
        ]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed access to the provider. Implementations classify failures but never
/// retry; retries and fallbacks belong to the resolver.
#[async_trait]
pub trait UpstreamClient: Send + Sync + Debug {
    /// First match for a place name.
    async fn geocode(&self, city: &str) -> Result<GeocodeResult>;

    async fn fetch_unified_conditions(
        &self,
        lat: f64,
        lon: f64,
        exclude: &[Section],
    ) -> Result<UnifiedConditions>;

    async fn fetch_legacy_current(&self, query: &LocationQuery) -> Result<LegacyCurrentConditions>;

    async fn fetch_legacy_forecast(&self, city: &str) -> Result<LegacyForecastList>;
}
