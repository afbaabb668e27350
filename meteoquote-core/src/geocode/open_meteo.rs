use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::FetchError;
use crate::http::{build_client, get_json};
use crate::model::City;

use super::{ForwardGeocoder, ReverseGeocoder, compose_label};

const PROVIDER_NAME: &str = "open-meteo-geocoding";

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Serialize)]
struct ReverseQuery<'a> {
    latitude: f64,
    longitude: f64,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    admin1: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    search_url: String,
    reverse_url: String,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(config)?, config))
    }

    pub fn with_client(http: Client, config: &Config) -> Self {
        Self {
            http,
            search_url: config.endpoints.geocoding_search.clone(),
            reverse_url: config.endpoints.geocoding_reverse.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl ForwardGeocoder for OpenMeteoGeocoder {
    async fn search(&self, name: &str) -> Result<Option<City>, FetchError> {
        let request = self.http.get(&self.search_url).query(&SearchQuery {
            name,
            count: 1,
            language: &self.language,
            format: "json",
        });
        let payload: GeocodeResponse = get_json(PROVIDER_NAME, request).await?;
        city_from_search(payload, name)
    }
}

#[async_trait]
impl ReverseGeocoder for OpenMeteoGeocoder {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<City>, FetchError> {
        let request = self.http.get(&self.reverse_url).query(&ReverseQuery {
            latitude: lat,
            longitude: lon,
            count: 1,
            language: &self.language,
            format: "json",
        });
        let payload: GeocodeResponse = get_json(PROVIDER_NAME, request).await?;
        Ok(city_from_reverse(payload, lat, lon))
    }
}

/// The place name defaults to the query when the result omits it.
fn city_from_search(payload: GeocodeResponse, query: &str) -> Result<Option<City>, FetchError> {
    let Some(first) = payload.results.into_iter().next() else {
        return Ok(None);
    };

    let (Some(lat), Some(lon)) = (first.latitude, first.longitude) else {
        return Err(FetchError::MalformedResponse(format!(
            "{PROVIDER_NAME} payload: result without coordinates"
        )));
    };

    let name = first.name.as_deref().unwrap_or(query);
    Ok(compose_label(name, first.admin1.as_deref(), first.country_code.as_deref())
        .map(|label| City::new(label, lat, lon)))
}

fn city_from_reverse(payload: GeocodeResponse, lat: f64, lon: f64) -> Option<City> {
    let first = payload.results.into_iter().next()?;
    let label = compose_label(
        first.name.as_deref().unwrap_or_default(),
        first.admin1.as_deref(),
        first.country_code.as_deref(),
    )?;
    Some(City::new(label, first.latitude.unwrap_or(lat), first.longitude.unwrap_or(lon)))
}
