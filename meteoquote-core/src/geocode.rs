//! Forward and reverse geocoding with a prioritized provider chain.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::model::City;

pub mod nominatim;
pub mod open_meteo;
pub mod platform;

pub use nominatim::NominatimGeocoder;
pub use open_meteo::OpenMeteoGeocoder;
pub use platform::{AddressLookup, PlatformAddress, PlatformGeocoder};

/// Label given to a located city no provider could name.
pub const PLACEHOLDER_LABEL: &str = "Current location";

#[async_trait]
pub trait ForwardGeocoder: Send + Sync + Debug {
    /// First match for `name`, if any.
    async fn search(&self, name: &str) -> Result<Option<City>, FetchError>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<City>, FetchError>;
}

/// Builds `name, region (CC)`, `name (CC)` or `name`, first applicable wins.
///
/// Returns `None` when the place name is blank.
pub fn compose_label(place: &str, region: Option<&str>, country_code: Option<&str>) -> Option<String> {
    let place = place.trim();
    if place.is_empty() {
        return None;
    }

    let region = region.map(str::trim).filter(|s| !s.is_empty());
    let country_code = country_code.map(str::trim).filter(|s| !s.is_empty());

    let label = match (region, country_code) {
        (Some(region), Some(cc)) => format!("{place}, {region} ({cc})"),
        (_, Some(cc)) => format!("{place} ({cc})"),
        _ => place.to_string(),
    };
    Some(label)
}

/// First candidate that is present and not blank.
pub fn first_non_blank<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().flatten().map(str::trim).find(|s| !s.is_empty())
}

#[derive(Debug)]
pub struct GeocodeResolver {
    forward: Box<dyn ForwardGeocoder>,
    reverse_chain: Vec<Box<dyn ReverseGeocoder>>,
}

impl GeocodeResolver {
    pub fn new(forward: Box<dyn ForwardGeocoder>) -> Self {
        Self { forward, reverse_chain: Vec::new() }
    }

    /// Appends a reverse provider; providers are tried in insertion order.
    pub fn with_reverse(mut self, provider: Box<dyn ReverseGeocoder>) -> Self {
        self.reverse_chain.push(provider);
        self
    }

    /// Open-Meteo for search and primary reverse, Nominatim as secondary.
    /// A platform resolver can be appended with [`GeocodeResolver::with_reverse`].
    pub fn open_data(config: &Config) -> Result<Self, FetchError> {
        let http = crate::http::build_client(config)?;
        let open_meteo = OpenMeteoGeocoder::with_client(http.clone(), config);
        Ok(Self::new(Box::new(open_meteo.clone()))
            .with_reverse(Box::new(open_meteo))
            .with_reverse(Box::new(NominatimGeocoder::with_client(http, config))))
    }

    pub async fn geocode(&self, name: &str) -> Result<City, FetchError> {
        let query = name.trim();
        if query.is_empty() {
            return Err(FetchError::GeocodeNotFound(name.to_string()));
        }

        self.forward
            .search(query)
            .await?
            .ok_or_else(|| FetchError::GeocodeNotFound(query.to_string()))
    }

    /// First provider yielding a non-blank label wins. Provider failures are
    /// logged and skipped.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<City, FetchError> {
        for provider in &self.reverse_chain {
            match provider.reverse(lat, lon).await {
                Ok(Some(city)) if !city.label.trim().is_empty() => {
                    debug!(provider = provider.name(), label = %city.label, "reverse geocoded");
                    return Ok(city);
                }
                Ok(_) => debug!(provider = provider.name(), lat, lon, "no label from provider"),
                Err(err) => warn!(provider = provider.name(), error = %err, "reverse geocoding failed"),
            }
        }

        Err(FetchError::AllProvidersFailed)
    }

    /// [`GeocodeResolver::reverse_geocode`], or a placeholder city at the
    /// raw coordinates when every provider fails.
    pub async fn reverse_or_placeholder(&self, lat: f64, lon: f64) -> City {
        match self.reverse_geocode(lat, lon).await {
            Ok(city) => city,
            Err(_) => City::new(PLACEHOLDER_LABEL, lat, lon),
        }
    }
}
