use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::http::{build_client, get_json};
use crate::normalizer::{AirQualityPayload, ForecastPayload};

use super::ForecastSource;

const PROVIDER_NAME: &str = "open-meteo";
const CURRENT_FIELDS: &str = "temperature_2m,weather_code";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,uv_index";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,uv_index_max";
const AIR_QUALITY_FIELDS: &str = "european_aqi";

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    current: &'a str,
    hourly: &'a str,
    daily: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Serialize)]
struct AirQualityQuery<'a> {
    latitude: f64,
    longitude: f64,
    hourly: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    air_quality_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(config)?, config))
    }

    pub fn with_client(http: Client, config: &Config) -> Self {
        Self {
            http,
            forecast_url: config.endpoints.forecast.clone(),
            air_quality_url: config.endpoints.air_quality.clone(),
        }
    }

    fn forecast_request(&self, lat: f64, lon: f64) -> RequestBuilder {
        self.http.get(&self.forecast_url).query(&ForecastQuery {
            latitude: lat,
            longitude: lon,
            current: CURRENT_FIELDS,
            hourly: HOURLY_FIELDS,
            daily: DAILY_FIELDS,
            timezone: "auto",
        })
    }

    fn air_quality_request(&self, lat: f64, lon: f64) -> RequestBuilder {
        self.http.get(&self.air_quality_url).query(&AirQualityQuery {
            latitude: lat,
            longitude: lon,
            hourly: AIR_QUALITY_FIELDS,
            timezone: "auto",
        })
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, FetchError> {
        debug!(lat, lon, "fetching forecast");
        get_json(PROVIDER_NAME, self.forecast_request(lat, lon)).await
    }

    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Result<AirQualityPayload, FetchError> {
        debug!(lat, lon, "fetching air quality");
        get_json(PROVIDER_NAME, self.air_quality_request(lat, lon)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::WeatherAggregator;
    use crate::config::Endpoints;
    use std::net::TcpListener;
    use std::thread;

    fn client() -> OpenMeteoClient {
        OpenMeteoClient::new(&Config::default()).expect("client builds")
    }

    fn query_of(request: RequestBuilder) -> Vec<(String, String)> {
        let request = request.build().expect("request builds");
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn forecast_request_asks_for_every_field() {
        let pairs = query_of(client().forecast_request(43.6047, 1.4442));

        assert!(pairs.contains(&("latitude".into(), "43.6047".into())));
        assert!(pairs.contains(&("longitude".into(), "1.4442".into())));
        assert!(pairs.contains(&("current".into(), CURRENT_FIELDS.into())));
        assert!(pairs.contains(&("hourly".into(), HOURLY_FIELDS.into())));
        assert!(pairs.contains(&("daily".into(), DAILY_FIELDS.into())));
        assert!(pairs.contains(&("timezone".into(), "auto".into())));
    }

    #[test]
    fn air_quality_request_targets_its_own_endpoint() {
        let request = client().air_quality_request(48.85, 2.35).build().unwrap();
        assert_eq!(request.url().host_str(), Some("air-quality-api.open-meteo.com"));

        let pairs = query_of(client().air_quality_request(48.85, 2.35));
        assert!(pairs.contains(&("hourly".into(), "european_aqi".into())));
        assert!(pairs.contains(&("timezone".into(), "auto".into())));
    }

    /// Same timeouts as the shared client, but never routed through a proxy.
    fn direct_client(forecast_url: String) -> OpenMeteoClient {
        let config = Config {
            timeout_secs: 1,
            endpoints: Endpoints { forecast: forecast_url, ..Endpoints::default() },
            ..Config::default()
        };
        let http = Client::builder()
            .no_proxy()
            .connect_timeout(config.timeout())
            .read_timeout(config.timeout())
            .build()
            .unwrap();
        OpenMeteoClient::with_client(http, &config)
    }

    #[tokio::test]
    async fn closed_port_is_connection_refused() {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = direct_client(format!("http://127.0.0.1:{port}/v1/forecast"));

        let err = client.fetch_forecast(43.6, 1.44).await.unwrap_err();
        assert_eq!(err, FetchError::ConnectionRefused);
    }

    #[tokio::test]
    async fn silent_server_times_out_and_aborts_the_refresh() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // accepted but never answered
            let mut open = Vec::new();
            for stream in listener.incoming().flatten() {
                open.push(stream);
            }
        });

        let client = direct_client(format!("http://{addr}/v1/forecast"));
        assert_eq!(client.fetch_forecast(43.6, 1.44).await.unwrap_err(), FetchError::Timeout);

        let err = WeatherAggregator::new(client).fetch(43.6, 1.44).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn unresolvable_host_is_no_connectivity() {
        let client = direct_client("http://meteoquote.invalid/v1/forecast".into());

        let err = client.fetch_forecast(43.6, 1.44).await.unwrap_err();
        assert_eq!(err, FetchError::NoConnectivity);
    }
}
