use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::FetchError;
use crate::normalizer::{AirQualityPayload, ForecastPayload};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Upstream forecast and air-quality data for a coordinate.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    /// Current, hourly and daily blocks.
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, FetchError>;

    /// Hourly European AQI.
    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Result<AirQualityPayload, FetchError>;
}
