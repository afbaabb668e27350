//! Device location to a named city: fast fix, then last known fix, then
//! reverse geocoding.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::debug;

use crate::cities::CityStore;
use crate::error::FetchError;
use crate::geocode::GeocodeResolver;
use crate::model::{City, Coordinates};

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    /// A fresh, possibly coarse, fix.
    async fn current_fix(&self) -> Option<Coordinates>;

    async fn last_known(&self) -> Option<Coordinates>;
}

/// A source with preset answers, for hosts that already know the position.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    pub fix: Option<Coordinates>,
    pub last_known: Option<Coordinates>,
}

impl FixedLocation {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self { fix: Some(Coordinates { lat, lon }), last_known: None }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_fix(&self) -> Option<Coordinates> {
        self.fix
    }

    async fn last_known(&self) -> Option<Coordinates> {
        self.last_known
    }
}

/// Names the device position. Falls back to a placeholder label when no
/// geocoder can name it; fails only when there is no position at all.
pub async fn locate(
    source: &dyn LocationSource,
    resolver: &GeocodeResolver,
) -> Result<City, FetchError> {
    let coords = match source.current_fix().await {
        Some(coords) => coords,
        None => {
            debug!("no current fix, trying last known location");
            source.last_known().await.ok_or(FetchError::LocationUnavailable)?
        }
    };

    Ok(resolver.reverse_or_placeholder(coords.lat, coords.lon).await)
}

/// [`locate`], then record the city and make it the active one.
pub async fn detect_city(
    source: &dyn LocationSource,
    resolver: &GeocodeResolver,
    cities: &CityStore,
) -> anyhow::Result<City> {
    let city = locate(source, resolver).await?;
    cities.upsert_by_label(city.clone())?;
    Ok(cities.select(&city.label)?.unwrap_or(city))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::tests::{FakeForward, FakeReverse};
    use crate::geocode::PLACEHOLDER_LABEL;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn resolver(result: Result<Option<City>, FetchError>) -> GeocodeResolver {
        GeocodeResolver::new(Box::new(FakeForward(Ok(None))))
            .with_reverse(FakeReverse::boxed("primary", result))
    }

    #[tokio::test]
    async fn current_fix_is_preferred() {
        let source = FixedLocation {
            fix: Some(Coordinates { lat: 1.0, lon: 2.0 }),
            last_known: Some(Coordinates { lat: 9.0, lon: 9.0 }),
        };
        let city = locate(&source, &resolver(Err(FetchError::Timeout))).await.unwrap();
        assert_eq!(city, City::new(PLACEHOLDER_LABEL, 1.0, 2.0));
    }

    #[tokio::test]
    async fn falls_back_to_last_known() {
        let source = FixedLocation { fix: None, last_known: Some(Coordinates { lat: 43.6, lon: 1.44 }) };
        let named = City::new("Toulouse, Occitanie (FR)", 43.6, 1.44);

        let city = locate(&source, &resolver(Ok(Some(named.clone())))).await.unwrap();
        assert_eq!(city, named);
    }

    #[tokio::test]
    async fn no_position_is_unavailable() {
        let err = locate(&FixedLocation::default(), &resolver(Ok(None))).await.unwrap_err();
        assert_eq!(err, FetchError::LocationUnavailable);
    }

    #[tokio::test]
    async fn detected_city_becomes_active() {
        let cities = CityStore::new(Arc::new(MemoryStore::new()), City::new("Toulouse", 43.6, 1.44))
            .unwrap();
        cities.add_if_absent(City::new("Paris", 48.85, 2.35)).unwrap();
        cities.add_if_absent(City::new("Lyon", 45.0, 4.0)).unwrap();

        let fresh = City::new("lyon", 45.76, 4.83);
        let detected = detect_city(&FixedLocation::at(45.76, 4.83), &resolver(Ok(Some(fresh))), &cities)
            .await
            .unwrap();

        assert_eq!(detected, City::new("Lyon", 45.76, 4.83));
        let labels: Vec<_> = cities.load().unwrap().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Lyon", "Paris", "Toulouse"]);
    }
}
