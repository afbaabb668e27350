//! Core library for `meteoquote`.
//!
//! This crate defines:
//! - Provider seams for forecast, air quality and geocoding, with Open-Meteo
//!   and Nominatim implementations
//! - The aggregation pipeline producing one [`WeatherResult`] per refresh
//! - Condition buckets, UV/AQI bands and the quote rotation
//! - The persisted city list and preference store
//!
//! It is presentation-agnostic: the CLI, or any other surface, renders what
//! it returns.

pub mod aggregator;
pub mod cities;
pub mod condition;
pub mod config;
pub mod error;
pub mod geocode;
mod http;
pub mod location;
pub mod model;
pub mod normalizer;
pub mod provider;
pub mod quote;
pub mod refresh;
pub mod sampler;
pub mod severity;
pub mod store;

pub use aggregator::WeatherAggregator;
pub use cities::CityStore;
pub use condition::{Bucket, condition_label};
pub use config::Config;
pub use error::{FetchError, PayloadError};
pub use geocode::GeocodeResolver;
pub use model::{City, Coordinates, DailyForecast, HourlyForecast, Quote, WeatherResult};
pub use provider::{ForecastSource, OpenMeteoClient};
pub use quote::QuoteRotator;
pub use refresh::{Dashboard, Snapshot, ViewState};
pub use severity::{AqiLevel, UvLevel};
pub use store::{FileStore, KeyValueStore, MemoryStore};
