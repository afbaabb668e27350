//! Wire shapes of the forecast provider and their conversion to typed lists.
//!
//! Every block holds a `time` axis plus one positionally aligned array per
//! requested field. Fields are optional on the wire so that an absent array
//! surfaces as [`PayloadError::MissingField`] instead of a serde error.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::PayloadError;
use crate::model::{DailyForecast, HourlyForecast};

pub const HOURLY_HORIZON: usize = 24;
pub const DAILY_HORIZON: usize = 7;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPayload {
    pub utc_offset_seconds: Option<i32>,
    pub current: Option<CurrentBlock>,
    pub hourly: Option<HourlyBlock>,
    pub daily: Option<DailyBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentBlock {
    pub temperature_2m: Option<f64>,
    pub weather_code: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyBlock {
    pub time: Option<Vec<String>>,
    pub temperature_2m: Option<Vec<f64>>,
    pub weather_code: Option<Vec<i32>>,
    pub uv_index: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyBlock {
    pub time: Option<Vec<String>>,
    pub weather_code: Option<Vec<i32>>,
    pub temperature_2m_max: Option<Vec<f64>>,
    pub temperature_2m_min: Option<Vec<f64>>,
    pub uv_index_max: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQualityPayload {
    pub utc_offset_seconds: Option<i32>,
    pub hourly: Option<AirQualityBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQualityBlock {
    pub time: Option<Vec<String>>,
    pub european_aqi: Option<Vec<Option<i64>>>,
}

/// Hourly block with every column present and aligned to `times`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyColumns {
    pub times: Vec<NaiveDateTime>,
    pub temperature: Vec<f64>,
    pub condition_code: Vec<i32>,
    /// Nulls read as 0.
    pub uv_index: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyColumns {
    pub dates: Vec<NaiveDate>,
    pub condition_code: Vec<i32>,
    pub temp_max: Vec<f64>,
    pub temp_min: Vec<f64>,
    pub uv_index_max: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityColumns {
    pub times: Vec<NaiveDateTime>,
    /// Nulls read as 0.
    pub european_aqi: Vec<i64>,
}

impl HourlyColumns {
    pub fn parse(block: &HourlyBlock) -> Result<Self, PayloadError> {
        let raw_times = required("hourly.time", &block.time)?;
        let expected = raw_times.len();

        let temperature = aligned("hourly.temperature_2m", &block.temperature_2m, expected)?;
        let condition_code = aligned("hourly.weather_code", &block.weather_code, expected)?;
        let uv_index = aligned("hourly.uv_index", &block.uv_index, expected)?;

        Ok(Self {
            times: parse_times(raw_times)?,
            temperature: temperature.to_vec(),
            condition_code: condition_code.to_vec(),
            uv_index: uv_index.iter().map(|v| v.unwrap_or(0.0)).collect(),
        })
    }

    /// Entries not before `now`, in source order, capped at [`HOURLY_HORIZON`].
    pub fn upcoming(&self, now: NaiveDateTime) -> Vec<HourlyForecast> {
        self.times
            .iter()
            .enumerate()
            .filter(|(_, time)| **time >= now)
            .take(HOURLY_HORIZON)
            .map(|(idx, time)| HourlyForecast {
                time: *time,
                temperature: self.temperature[idx],
                condition_code: self.condition_code[idx],
            })
            .collect()
    }
}

impl DailyColumns {
    pub fn parse(block: &DailyBlock) -> Result<Self, PayloadError> {
        let raw_dates = required("daily.time", &block.time)?;
        let expected = raw_dates.len();

        let condition_code = aligned("daily.weather_code", &block.weather_code, expected)?;
        let temp_max = aligned("daily.temperature_2m_max", &block.temperature_2m_max, expected)?;
        let temp_min = aligned("daily.temperature_2m_min", &block.temperature_2m_min, expected)?;
        let uv_index_max = aligned("daily.uv_index_max", &block.uv_index_max, expected)?;

        let dates = raw_dates
            .iter()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| PayloadError::InvalidTimestamp(raw.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            dates,
            condition_code: condition_code.to_vec(),
            temp_max: temp_max.to_vec(),
            temp_min: temp_min.to_vec(),
            uv_index_max: uv_index_max.iter().map(|v| v.unwrap_or(0.0)).collect(),
        })
    }

    /// The first [`DAILY_HORIZON`] days, verbatim.
    pub fn week(&self) -> Vec<DailyForecast> {
        self.dates
            .iter()
            .take(DAILY_HORIZON)
            .enumerate()
            .map(|(idx, date)| DailyForecast {
                date: *date,
                temp_min: self.temp_min[idx],
                temp_max: self.temp_max[idx],
                condition_code: self.condition_code[idx],
            })
            .collect()
    }
}

impl AirQualityColumns {
    pub fn parse(payload: &AirQualityPayload) -> Result<Self, PayloadError> {
        let block = payload.hourly.as_ref().ok_or(PayloadError::MissingField("hourly"))?;
        let raw_times = required("hourly.time", &block.time)?;
        let european_aqi = aligned("hourly.european_aqi", &block.european_aqi, raw_times.len())?;

        Ok(Self {
            times: parse_times(raw_times)?,
            european_aqi: european_aqi.iter().map(|v| v.unwrap_or(0)).collect(),
        })
    }
}

/// Hourly list (future-or-now, ≤24) and daily list (≤7) from parsed blocks.
pub fn normalize(
    hourly: &HourlyColumns,
    daily: &DailyColumns,
    now: NaiveDateTime,
) -> (Vec<HourlyForecast>, Vec<DailyForecast>) {
    (hourly.upcoming(now), daily.week())
}

pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, PayloadError> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| PayloadError::InvalidTimestamp(raw.to_string()))
}

fn parse_times(raw: &[String]) -> Result<Vec<NaiveDateTime>, PayloadError> {
    raw.iter().map(|s| parse_datetime(s)).collect()
}

fn required<'a, T>(field: &'static str, column: &'a Option<Vec<T>>) -> Result<&'a [T], PayloadError> {
    column.as_deref().ok_or(PayloadError::MissingField(field))
}

fn aligned<'a, T>(
    field: &'static str,
    column: &'a Option<Vec<T>>,
    expected: usize,
) -> Result<&'a [T], PayloadError> {
    let values = required(field, column)?;
    if values.len() != expected {
        return Err(PayloadError::LengthMismatch { field, expected, actual: values.len() });
    }
    Ok(values)
}
