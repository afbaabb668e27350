//! Adapter for a host-provided resolver (the device's own geocoder).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::FetchError;
use crate::model::City;

use super::{ReverseGeocoder, compose_label, first_non_blank};

/// Address fields as platform geocoders usually report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformAddress {
    pub locality: Option<String>,
    pub sub_admin_area: Option<String>,
    pub sub_locality: Option<String>,
    pub admin_area: Option<String>,
    pub country_code: Option<String>,
}

impl PlatformAddress {
    pub fn to_city(&self, lat: f64, lon: f64) -> Option<City> {
        let place = first_non_blank([
            self.locality.as_deref(),
            self.sub_admin_area.as_deref(),
            self.sub_locality.as_deref(),
        ])?;
        let label = compose_label(place, self.admin_area.as_deref(), self.country_code.as_deref())?;
        Some(City::new(label, lat, lon))
    }
}

#[async_trait]
pub trait AddressLookup: Send + Sync + Debug {
    async fn lookup(&self, lat: f64, lon: f64) -> Result<Option<PlatformAddress>, FetchError>;
}

#[derive(Debug)]
pub struct PlatformGeocoder<L> {
    lookup: L,
}

impl<L: AddressLookup> PlatformGeocoder<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<L: AddressLookup> ReverseGeocoder for PlatformGeocoder<L> {
    fn name(&self) -> &'static str {
        "platform"
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<City>, FetchError> {
        Ok(self.lookup.lookup(lat, lon).await?.and_then(|addr| addr.to_city(lat, lon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(Option<PlatformAddress>);

    #[async_trait]
    impl AddressLookup for Fixed {
        async fn lookup(&self, _lat: f64, _lon: f64) -> Result<Option<PlatformAddress>, FetchError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn locality_then_sub_admin_area() {
        let addr = PlatformAddress {
            locality: None,
            sub_admin_area: Some("Haute-Garonne".into()),
            admin_area: Some("Occitanie".into()),
            country_code: Some("FR".into()),
            ..Default::default()
        };
        assert_eq!(
            addr.to_city(43.6, 1.4).unwrap().label,
            "Haute-Garonne, Occitanie (FR)"
        );
    }

    #[tokio::test]
    async fn adapter_uses_requested_coordinates() {
        let geocoder = PlatformGeocoder::new(Fixed(Some(PlatformAddress {
            locality: Some("Muret".into()),
            ..Default::default()
        })));

        let city = geocoder.reverse(43.46, 1.32).await.unwrap();
        assert_eq!(city, Some(City::new("Muret", 43.46, 1.32)));

        let empty = PlatformGeocoder::new(Fixed(None));
        assert_eq!(empty.reverse(0.0, 0.0).await.unwrap(), None);
    }
}
