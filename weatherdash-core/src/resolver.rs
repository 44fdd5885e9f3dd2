//! Picks which provider endpoints to call for a query and in what order, and
//! turns whatever succeeded into a [`Resolution`].
//!
//! By name: legacy current (mandatory) and legacy forecast (best-effort) are
//! fetched together, then the unified endpoint is tried at the returned
//! coordinates. Any unified failure falls back to the normalized legacy data.
//!
//! By coordinates: the unified endpoint is tried first and only an
//! authentication/entitlement failure triggers the legacy fallback. Rate
//! limits and other errors are returned as-is.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    error::{Result, WeatherError},
    history::{HistoryEntry, LocationStore},
    model::{Coordinates, LocationQuery, Resolution, ResolutionOutcome},
    normalize::normalize,
    provider::{Section, UpstreamClient},
};

pub const FALLBACK_NOTE: &str = "Using standard APIs (One Call API 3.0 not available)";

#[derive(Debug)]
pub struct Resolver<C> {
    client: C,
    exclude: Vec<Section>,
    history: Option<Arc<dyn LocationStore>>,
}

impl<C: UpstreamClient> Resolver<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            exclude: Vec::new(),
            history: None,
        }
    }

    /// Sections to leave out of unified lookups by coordinates.
    pub fn with_exclude(mut self, exclude: Vec<Section>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_history(mut self, store: Arc<dyn LocationStore>) -> Self {
        self.history = Some(store);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn resolve_by_name(&self, city: &str) -> Result<Resolution> {
        let query = LocationQuery::city(city)?;
        self.resolve(&query).await
    }

    pub async fn resolve_by_coords(&self, lat: f64, lon: f64) -> Result<Resolution> {
        let query = LocationQuery::coords(lat, lon)?;
        self.resolve(&query).await
    }

    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Resolution> {
        let resolution = match query {
            LocationQuery::City(name) => self.by_name(name).await?,
            LocationQuery::Coords(coords) => self.by_coords(*coords).await?,
        };

        self.remember(query, &resolution).await;
        Ok(resolution)
    }

    async fn by_name(&self, name: &str) -> Result<Resolution> {
        let query = LocationQuery::City(name.to_string());
        let (current, forecast) = tokio::join!(
            self.client.fetch_legacy_current(&query),
            self.client.fetch_legacy_forecast(name),
        );

        let current = current?;
        let forecast = forecast.unwrap_or_else(|err| {
            warn!(error = %err, "forecast unavailable, continuing with current conditions only");
            Default::default()
        });

        let place = if current.name.is_empty() {
            name.to_string()
        } else {
            current.name.clone()
        };

        match self
            .client
            .fetch_unified_conditions(current.coord.lat, current.coord.lon, &[])
            .await
        {
            Ok(mut conditions) => {
                conditions.city_name = Some(place);
                Ok(Resolution {
                    conditions,
                    outcome: ResolutionOutcome::Primary,
                })
            }
            Err(err) => {
                info!(error = %err, "unified endpoint unavailable, using legacy data");
                let mut conditions = normalize(&current, Some(&forecast));
                conditions.city_name = Some(place);
                Ok(Resolution {
                    conditions,
                    outcome: fallback(),
                })
            }
        }
    }

    async fn by_coords(&self, coords: Coordinates) -> Result<Resolution> {
        match self
            .client
            .fetch_unified_conditions(coords.lat, coords.lon, &self.exclude)
            .await
        {
            Ok(conditions) => Ok(Resolution {
                conditions,
                outcome: ResolutionOutcome::Primary,
            }),
            Err(err @ WeatherError::AuthFailure { .. }) => {
                info!(error = %err, "unified endpoint refused credentials, using legacy data");
                let current = self
                    .client
                    .fetch_legacy_current(&LocationQuery::Coords(coords))
                    .await?;
                Ok(Resolution {
                    conditions: normalize(&current, None),
                    outcome: fallback(),
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn remember(&self, query: &LocationQuery, resolution: &Resolution) {
        let Some(store) = &self.history else {
            return;
        };

        let conditions = &resolution.conditions;
        let entry = HistoryEntry {
            name: conditions
                .city_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| query.to_string()),
            lat: conditions.lat,
            lon: conditions.lon,
            timestamp: Utc::now(),
        };

        if let Err(err) = store.record(entry).await {
            warn!(error = %err, "failed to record location history");
        }
    }
}

fn fallback() -> ResolutionOutcome {
    ResolutionOutcome::Fallback {
        note: FALLBACK_NOTE.to_string(),
    }
}
