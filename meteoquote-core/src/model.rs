use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A user city: display label plus coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self { label: label.into(), lat, lon }
    }

    /// Dedup key shared by every city list: trimmed, case-insensitive label.
    pub fn key(&self) -> String {
        self.label.trim().to_lowercase()
    }

    pub fn same_label(&self, other: &str) -> bool {
        self.key() == other.trim().to_lowercase()
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One hour of forecast, in provider-local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub condition_code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition_code: i32,
}

/// Unified output of one aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub current_temp: f64,
    pub current_condition_code: i32,
    /// Future-or-now hours only, at most 24.
    pub hourly: Vec<HourlyForecast>,
    /// At most 7 days, starting today.
    pub daily: Vec<DailyForecast>,
    pub uv_now: f64,
    pub uv_max_today: f64,
    pub uv_peak_time: Option<NaiveDateTime>,
    pub aqi_now: i64,
    pub aqi_max_today: i64,
    pub aqi_peak_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" — {}", self.text, self.author)
    }
}
