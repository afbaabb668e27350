use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::FetchError;
use crate::http::{build_client, get_json};
use crate::model::City;

use super::{ReverseGeocoder, compose_label, first_non_blank};

const PROVIDER_NAME: &str = "nominatim";

#[derive(Debug, Serialize)]
struct ReverseQuery<'a> {
    lat: f64,
    lon: f64,
    format: &'a str,
    #[serde(rename = "accept-language")]
    accept_language: &'a str,
    zoom: u8,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

/// Nominatim names the settlement differently depending on its size.
#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country_code: Option<String>,
}

/// OpenStreetMap reverse geocoder. Requires an identifying user agent.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    reverse_url: String,
    language: String,
}

impl NominatimGeocoder {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(config)?, config))
    }

    pub fn with_client(http: Client, config: &Config) -> Self {
        Self {
            http,
            reverse_url: config.endpoints.nominatim_reverse.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<City>, FetchError> {
        let request = self.http.get(&self.reverse_url).query(&ReverseQuery {
            lat,
            lon,
            format: "jsonv2",
            accept_language: &self.language,
            zoom: 10,
        });
        let payload: NominatimResponse = get_json(PROVIDER_NAME, request).await?;
        Ok(city_from_response(payload, lat, lon))
    }
}

fn city_from_response(payload: NominatimResponse, lat: f64, lon: f64) -> Option<City> {
    let addr = payload.address?;

    let place = first_non_blank([
        addr.city.as_deref(),
        addr.town.as_deref(),
        addr.village.as_deref(),
        addr.municipality.as_deref(),
        addr.county.as_deref(),
    ])?;
    let country_code = addr.country_code.as_deref().map(str::to_uppercase);

    let label = compose_label(place, addr.state.as_deref(), country_code.as_deref())?;
    Some(City::new(label, lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> NominatimResponse {
        serde_json::from_str(body).expect("payload parses")
    }

    #[test]
    fn city_field_wins_and_country_is_upper_cased() {
        let body = r#"{
            "place_id": 1,
            "display_name": "Toulouse, Haute-Garonne, Occitanie, France",
            "address": {
                "city": "Toulouse",
                "county": "Haute-Garonne",
                "state": "Occitanie",
                "country": "France",
                "country_code": "fr"
            }
        }"#;

        let city = city_from_response(parse(body), 43.6, 1.44).unwrap();
        assert_eq!(city, City::new("Toulouse, Occitanie (FR)", 43.6, 1.44));
    }

    #[test]
    fn alias_order_is_town_village_municipality_county() {
        let village = r#"{"address": {"village": "Saint-Lary", "county": "Hautes-Pyrénées", "country_code": "fr"}}"#;
        assert_eq!(
            city_from_response(parse(village), 42.8, 0.3).unwrap().label,
            "Saint-Lary (FR)"
        );

        let county_only = r#"{"address": {"town": " ", "county": "Hautes-Pyrénées"}}"#;
        assert_eq!(
            city_from_response(parse(county_only), 42.8, 0.3).unwrap().label,
            "Hautes-Pyrénées"
        );
    }

    #[test]
    fn error_payload_yields_nothing() {
        assert!(city_from_response(parse(r#"{"error": "Unable to geocode"}"#), 0.0, 0.0).is_none());
        assert!(city_from_response(parse(r#"{"address": {"state": "Nowhere"}}"#), 0.0, 0.0).is_none());
    }
}
