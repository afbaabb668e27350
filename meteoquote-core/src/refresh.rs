//! Presentation-facing refresh flow shared by every surface.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use crate::aggregator::WeatherAggregator;
use crate::condition::{Bucket, condition_label};
use crate::error::FetchError;
use crate::model::{City, WeatherResult};
use crate::provider::ForecastSource;
use crate::quote::QuoteRotator;
use crate::severity::{AqiLevel, UvLevel};

/// Shown in place of a quote when the rotation state cannot be read.
pub const NO_QUOTE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Last-request-wins coordination between overlapping refreshes.
#[derive(Debug, Default)]
pub struct Refresher {
    latest: AtomicU64,
}

impl Refresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every ticket issued before.
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// `Some(value)` only if no newer refresh began meanwhile.
    pub fn complete<T>(&self, ticket: RefreshTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}

/// Everything a surface renders for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub city: City,
    pub weather: WeatherResult,
    pub quote: String,
    pub condition: &'static str,
    pub bucket: Bucket,
    pub uv_level: UvLevel,
    pub aqi_level: AqiLevel,
    pub uv_peak: Option<String>,
    pub aqi_peak: Option<String>,
}

impl Snapshot {
    pub fn new(city: City, weather: WeatherResult, quote: String) -> Self {
        let code = weather.current_condition_code;
        Self {
            condition: condition_label(code),
            bucket: Bucket::from_code(code),
            uv_level: UvLevel::from_index(weather.uv_max_today),
            aqi_level: AqiLevel::from_index(weather.aqi_now),
            uv_peak: weather.uv_peak_time.map(hour_minute),
            aqi_peak: weather.aqi_peak_time.map(hour_minute),
            city,
            weather,
            quote,
        }
    }
}

/// A failed refresh carries no forecast data at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(Box<Snapshot>),
    Failed(String),
}

impl ViewState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            ViewState::Ready(snapshot) => Some(snapshot.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Dashboard<S> {
    aggregator: WeatherAggregator<S>,
    quotes: QuoteRotator,
    refresher: Refresher,
}

impl<S: ForecastSource> Dashboard<S> {
    pub fn new(aggregator: WeatherAggregator<S>, quotes: QuoteRotator) -> Self {
        Self { aggregator, quotes, refresher: Refresher::new() }
    }

    pub fn quotes(&self) -> &QuoteRotator {
        &self.quotes
    }

    /// `None` when a newer refresh started while this one was in flight.
    pub async fn refresh(&self, city: &City) -> Option<ViewState> {
        self.refresh_at(city, Utc::now()).await
    }

    pub async fn refresh_at(&self, city: &City, now: DateTime<Utc>) -> Option<ViewState> {
        let ticket = self.refresher.begin();
        let outcome = self.aggregator.fetch_at(city.lat, city.lon, now).await;
        let state = self.view_state(city, outcome, now);
        self.refresher.complete(ticket, state)
    }

    fn view_state(
        &self,
        city: &City,
        outcome: Result<WeatherResult, FetchError>,
        now: DateTime<Utc>,
    ) -> ViewState {
        match outcome {
            Ok(weather) => {
                // the forecast's first day is "today" at the forecast location
                let today = weather
                    .daily
                    .first()
                    .map(|day| day.date)
                    .unwrap_or_else(|| now.with_timezone(&Local).date_naive());
                let quote = self
                    .quotes
                    .get_quote(today, weather.current_condition_code, false)
                    .unwrap_or_else(|err| {
                        warn!(error = %err, "quote rotation unavailable");
                        NO_QUOTE.to_string()
                    });
                ViewState::Ready(Box::new(Snapshot::new(city.clone(), weather, quote)))
            }
            Err(err) => ViewState::Failed(err.to_string()),
        }
    }
}

fn hour_minute(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{AirQualityPayload, ForecastPayload};
    use crate::store::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Canned(Result<ForecastPayload, FetchError>);

    #[async_trait]
    impl ForecastSource for Canned {
        async fn fetch_forecast(&self, _lat: f64, _lon: f64) -> Result<ForecastPayload, FetchError> {
            self.0.clone()
        }

        async fn fetch_air_quality(&self, _lat: f64, _lon: f64) -> Result<AirQualityPayload, FetchError> {
            Err(FetchError::NoConnectivity)
        }
    }

    fn payload() -> ForecastPayload {
        serde_json::from_str(
            r#"{
                "utc_offset_seconds": 0,
                "current": { "temperature_2m": 8.5, "weather_code": 63 },
                "hourly": {
                    "time": ["2025-01-03T12:00", "2025-01-03T13:00"],
                    "temperature_2m": [8.5, 9.0],
                    "weather_code": [63, 63],
                    "uv_index": [1.5, 3.2]
                },
                "daily": {
                    "time": ["2025-01-03"],
                    "weather_code": [63],
                    "temperature_2m_max": [9.5],
                    "temperature_2m_min": [4.0],
                    "uv_index_max": [3.2]
                }
            }"#,
        )
        .unwrap()
    }

    fn dashboard(source: Canned) -> Dashboard<Canned> {
        Dashboard::new(
            WeatherAggregator::new(source),
            QuoteRotator::new(Arc::new(MemoryStore::new())),
        )
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 3, 11, 30, 0).unwrap()
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let refresher = Refresher::new();
        let first = refresher.begin();
        let second = refresher.begin();

        assert_eq!(refresher.complete(first, "paris"), None);
        assert_eq!(refresher.complete(second, "lyon"), Some("lyon"));
    }

    #[tokio::test]
    async fn ready_snapshot_carries_derived_fields() {
        let city = City::new("Brest (FR)", 48.39, -4.49);
        let state = dashboard(Canned(Ok(payload()))).refresh_at(&city, noon()).await.unwrap();

        let snapshot = state.snapshot().expect("ready");
        assert_eq!(snapshot.city, city);
        assert_eq!(snapshot.bucket, Bucket::Rain);
        assert_eq!(snapshot.condition, "Rain");
        assert_eq!(snapshot.uv_level, UvLevel::Moderate);
        assert_eq!(snapshot.uv_peak.as_deref(), Some("13:00"));
        assert_eq!(snapshot.aqi_level, AqiLevel::Good);
        assert_eq!(snapshot.aqi_peak, None);
        assert!(snapshot.quote.starts_with('"'));
    }

    #[tokio::test]
    async fn quote_day_follows_the_forecast_location() {
        // 23:30 UTC on Jan 3rd is already Jan 4th at UTC+1
        let ahead: ForecastPayload = serde_json::from_str(
            r#"{
                "utc_offset_seconds": 3600,
                "current": { "temperature_2m": 3.0, "weather_code": 61 },
                "hourly": {
                    "time": ["2025-01-04T00:00", "2025-01-04T01:00"],
                    "temperature_2m": [3.0, 2.5],
                    "weather_code": [61, 61],
                    "uv_index": [0.0, 0.0]
                },
                "daily": {
                    "time": ["2025-01-04"],
                    "weather_code": [61],
                    "temperature_2m_max": [6.0],
                    "temperature_2m_min": [1.0],
                    "uv_index_max": [1.0]
                }
            }"#,
        )
        .unwrap();
        let store = Arc::new(MemoryStore::new());
        let dashboard = Dashboard::new(
            WeatherAggregator::new(Canned(Ok(ahead))),
            QuoteRotator::new(store.clone()),
        );

        let late = Utc.with_ymd_and_hms(2025, 1, 3, 23, 30, 0).unwrap();
        dashboard.refresh_at(&City::new("Berlin", 52.52, 13.4), late).await.unwrap();

        // Jan 4th is day 4: (4 - 1) % 3 == 0, where Jan 3rd would give 2
        assert_eq!(store.get_i64("quote_idx_rain").unwrap(), Some(0));
    }

    #[tokio::test]
    async fn failure_carries_only_a_message() {
        let state = dashboard(Canned(Err(FetchError::Timeout)))
            .refresh_at(&City::new("Brest", 48.39, -4.49), noon())
            .await
            .unwrap();

        assert_eq!(state, ViewState::Failed(FetchError::Timeout.to_string()));
        assert!(state.snapshot().is_none());
    }
}
