use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{Result, WeatherError, classify},
    model::{
        Coordinates, GeocodeResult, LegacyCurrentConditions, LegacyForecastList, LocationQuery,
        UnifiedConditions,
    },
};

use super::{Endpoint, Section, UpstreamClient};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_LANG: &str = "en";
const UNITS: &str = "metric";

/// Everything the client needs to talk to OpenWeatherMap.
///
/// The key is optional here so that a missing key surfaces as a
/// [`WeatherError::Configuration`] on the first call instead of at startup.
#[derive(Clone)]
pub struct ClientSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub lang: String,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.api_key().map(str::to_owned),
            base_url: config.base_url.clone(),
            lang: config.lang.clone(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    settings: ClientSettings,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ClientSettings::from_config(config))
    }

    fn api_key(&self) -> Result<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(WeatherError::missing_api_key)
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), endpoint.path())
    }

    /// Parameters shared by the `/data` endpoints.
    fn data_params(&self) -> [(&'static str, String); 2] {
        [("units", UNITS.to_string()), ("lang", self.settings.lang.clone())]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        let api_key = self.api_key()?;
        params.push(("appid", api_key.to_string()));

        let res = self
            .http
            .get(self.url(endpoint))
            .query(&params)
            .send()
            .await
            .map_err(|e| WeatherError::transport(endpoint, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::transport(endpoint, e))?;

        debug!(%endpoint, status = status.as_u16(), bytes = body.len(), "provider responded");

        if !status.is_success() {
            return Err(classify(endpoint, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::decode(endpoint, e))
    }
}

#[async_trait]
impl UpstreamClient for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn geocode(&self, city: &str) -> Result<GeocodeResult> {
        let city = non_empty_city(city)?;

        let matches: Vec<GeocodeResult> = self
            .get_json(
                Endpoint::Geocoding,
                vec![("q", city.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        matches.into_iter().next().ok_or_else(|| WeatherError::NotFound {
            endpoint: Endpoint::Geocoding,
            message: format!("no place matches '{city}'"),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_unified_conditions(
        &self,
        lat: f64,
        lon: f64,
        exclude: &[Section],
    ) -> Result<UnifiedConditions> {
        let coords = Coordinates::new(lat, lon)?;

        let mut params = vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())];
        params.extend(self.data_params());
        if !exclude.is_empty() {
            params.push(("exclude", Section::to_csv(exclude)));
        }

        self.get_json(Endpoint::OneCall, params).await
    }

    #[instrument(skip(self, query), fields(query = %query))]
    async fn fetch_legacy_current(&self, query: &LocationQuery) -> Result<LegacyCurrentConditions> {
        let mut params = match query {
            LocationQuery::City(name) => vec![("q", non_empty_city(name)?.to_string())],
            LocationQuery::Coords(coords) => {
                let coords = Coordinates::new(coords.lat, coords.lon)?;
                vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
            }
        };
        params.extend(self.data_params());

        self.get_json(Endpoint::CurrentWeather, params).await
    }

    #[instrument(skip(self))]
    async fn fetch_legacy_forecast(&self, city: &str) -> Result<LegacyForecastList> {
        let mut params = vec![("q", non_empty_city(city)?.to_string())];
        params.extend(self.data_params());

        self.get_json(Endpoint::Forecast, params).await
    }
}

fn non_empty_city(city: &str) -> Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        return Err(WeatherError::InvalidQuery("city name is empty".to_string()));
    }
    Ok(city)
}
