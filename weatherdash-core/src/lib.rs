//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A typed client for the OpenWeatherMap endpoints the dashboard uses
//! - The resolver that picks between the One Call endpoint and the legacy
//!   current/forecast endpoints, and the normalization that maps legacy data
//!   onto the One Call shape
//! - Shared domain models and the error taxonomy
//!
//! It is used by `weatherdash-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod resolver;

pub use config::Config;
pub use error::{AuthReason, ErrorKind, WeatherError};
pub use history::{FileLocationStore, HistoryEntry, LocationStore, MemoryLocationStore};
pub use model::{GeocodeResult, LocationQuery, Resolution, ResolutionOutcome, UnifiedConditions};
pub use normalize::normalize;
pub use provider::{ClientSettings, Endpoint, OpenWeatherClient, Section, UpstreamClient};
pub use resolver::Resolver;
