//! One refresh: mandatory forecast, best-effort air quality, merged result.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::error::{FetchError, PayloadError};
use crate::model::WeatherResult;
use crate::normalizer::{AirQualityColumns, DailyColumns, HourlyColumns, normalize};
use crate::provider::ForecastSource;
use crate::sampler::{Sample, TimeSeries};

#[derive(Debug, Clone)]
pub struct WeatherAggregator<S> {
    source: S,
}

impl<S: ForecastSource> WeatherAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherResult, FetchError> {
        self.fetch_at(lat, lon, Utc::now()).await
    }

    /// Same as [`WeatherAggregator::fetch`] with an explicit reference instant.
    ///
    /// The forecast call must succeed; its failure aborts the refresh. The
    /// air-quality call runs afterwards and any failure there only zeroes the
    /// AQI fields.
    pub async fn fetch_at(
        &self,
        lat: f64,
        lon: f64,
        now_utc: DateTime<Utc>,
    ) -> Result<WeatherResult, FetchError> {
        let payload = self.source.fetch_forecast(lat, lon).await?;

        let now = provider_local(now_utc, payload.utc_offset_seconds);
        let today = now.date();

        let current = payload.current.as_ref().ok_or(PayloadError::MissingField("current"))?;
        let current_temp = current
            .temperature_2m
            .ok_or(PayloadError::MissingField("current.temperature_2m"))?;
        let current_code =
            current.weather_code.ok_or(PayloadError::MissingField("current.weather_code"))?;

        let hourly =
            HourlyColumns::parse(payload.hourly.as_ref().ok_or(PayloadError::MissingField("hourly"))?)?;
        let daily =
            DailyColumns::parse(payload.daily.as_ref().ok_or(PayloadError::MissingField("daily"))?)?;

        let uv = TimeSeries::new("hourly.uv_index", &hourly.times, &hourly.uv_index)?.sample(
            now,
            today,
            daily.uv_index_max.first().copied(),
        );

        let (hourly_list, daily_list) = normalize(&hourly, &daily, now);

        let aqi = match self.air_quality(lat, lon, now, today).await {
            Ok(sample) => sample,
            Err(err) => {
                warn!(lat, lon, error = %err, "air quality unavailable, reporting zero");
                Sample { current: 0, current_found: false, peak: 0, peak_time: None }
            }
        };

        let result = WeatherResult {
            current_temp,
            current_condition_code: current_code,
            hourly: hourly_list,
            daily: daily_list,
            uv_now: uv.current,
            uv_max_today: uv.peak,
            uv_peak_time: uv.peak_time,
            aqi_now: aqi.current,
            aqi_max_today: aqi.peak,
            aqi_peak_time: aqi.peak_time,
        };

        debug!(
            lat,
            lon,
            hours = result.hourly.len(),
            days = result.daily.len(),
            uv_found = uv.current_found,
            aqi_found = aqi.current_found,
            "weather assembled"
        );

        Ok(result)
    }

    async fn air_quality(
        &self,
        lat: f64,
        lon: f64,
        now: NaiveDateTime,
        today: NaiveDate,
    ) -> Result<Sample<i64>, FetchError> {
        let payload = self.source.fetch_air_quality(lat, lon).await?;
        let columns = AirQualityColumns::parse(&payload)?;
        let series = TimeSeries::new("hourly.european_aqi", &columns.times, &columns.european_aqi)?;
        Ok(series.sample(now, today, None))
    }
}

/// Wall-clock time at the forecast location. Falls back to the host clock
/// when the provider did not report its offset.
fn provider_local(now_utc: DateTime<Utc>, utc_offset_seconds: Option<i32>) -> NaiveDateTime {
    match utc_offset_seconds.and_then(FixedOffset::east_opt) {
        Some(offset) => now_utc.with_timezone(&offset).naive_local(),
        None => now_utc.with_timezone(&Local).naive_local(),
    }
}
