//! The user's city list: one source of truth, observable by every surface.
//!
//! Every list is deduplicated by [`City::key`] (trimmed, case-insensitive
//! label). The active city is the first entry.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use crate::model::City;
use crate::store::KeyValueStore;

pub const CITIES_KEY: &str = "cities_json";
pub const RECENT_KEY: &str = "recent_cities_json";
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug)]
pub struct CityStore {
    store: Arc<dyn KeyValueStore>,
    default_city: City,
    updates: watch::Sender<Vec<City>>,
}

impl CityStore {
    /// `default_city` stands in for the list until something is saved.
    pub fn new(store: Arc<dyn KeyValueStore>, default_city: City) -> Result<Self> {
        let initial = read_list(store.as_ref(), CITIES_KEY)?;
        let (updates, _) = watch::channel(initial);
        Ok(Self { store, default_city, updates })
    }

    /// Persisted cities; empty when nothing has been saved.
    pub fn load(&self) -> Result<Vec<City>> {
        read_list(self.store.as_ref(), CITIES_KEY)
    }

    /// Persisted cities, or `default` alone when none are saved.
    pub fn load_or_default(&self, default: &City) -> Result<Vec<City>> {
        let cities = self.load()?;
        if cities.is_empty() {
            return Ok(vec![default.clone()]);
        }
        Ok(cities)
    }

    /// [`CityStore::load_or_default`] with the store's own default city.
    pub fn cities(&self) -> Result<Vec<City>> {
        self.load_or_default(&self.default_city)
    }

    pub fn active(&self) -> Result<City> {
        let cities = self.cities()?;
        Ok(cities.into_iter().next().unwrap_or_else(|| self.default_city.clone()))
    }

    /// Overwrites the whole list and notifies subscribers.
    pub fn save(&self, cities: &[City]) -> Result<()> {
        write_list(self.store.as_ref(), CITIES_KEY, cities)?;
        self.updates.send_replace(cities.to_vec());
        Ok(())
    }

    /// Prepends `city` unless a city with the same label exists.
    /// Returns whether the list changed.
    pub fn add_if_absent(&self, city: City) -> Result<bool> {
        let mut cities = self.cities()?;
        if cities.iter().any(|c| c.key() == city.key()) {
            return Ok(false);
        }
        cities.insert(0, city);
        self.save(&cities)?;
        Ok(true)
    }

    /// Refreshes coordinates of the city with the same label in place,
    /// or prepends it.
    pub fn upsert_by_label(&self, city: City) -> Result<()> {
        let mut cities = self.cities()?;
        match cities.iter_mut().find(|c| c.key() == city.key()) {
            Some(existing) => {
                existing.lat = city.lat;
                existing.lon = city.lon;
            }
            None => cities.insert(0, city),
        }
        self.save(&cities)
    }

    /// Moves the matching city to the front and returns it.
    pub fn select(&self, label: &str) -> Result<Option<City>> {
        let mut cities = self.cities()?;
        let Some(pos) = cities.iter().position(|c| c.same_label(label)) else {
            return Ok(None);
        };

        let city = cities.remove(pos);
        cities.insert(0, city.clone());
        self.save(&cities)?;
        Ok(Some(city))
    }

    pub fn remove(&self, label: &str) -> Result<bool> {
        let mut cities = self.cities()?;
        let before = cities.len();
        cities.retain(|c| !c.same_label(label));
        if cities.len() == before {
            return Ok(false);
        }
        self.save(&cities)?;
        Ok(true)
    }

    /// Observes every successful [`CityStore::save`].
    pub fn subscribe(&self) -> watch::Receiver<Vec<City>> {
        self.updates.subscribe()
    }

    /// Most recently viewed cities, newest first.
    pub fn recent(&self) -> Result<Vec<City>> {
        read_list(self.store.as_ref(), RECENT_KEY)
    }

    pub fn touch_recent(&self, city: &City) -> Result<()> {
        let mut recent = self.recent()?;
        recent.retain(|c| c.key() != city.key());
        recent.insert(0, city.clone());
        recent.truncate(RECENT_LIMIT);
        write_list(self.store.as_ref(), RECENT_KEY, &recent)
    }
}

fn read_list(store: &dyn KeyValueStore, key: &str) -> Result<Vec<City>> {
    let Some(raw) = store.get_string(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(cities) => Ok(cities),
        Err(err) => {
            warn!(key, error = %err, "stored city list unreadable, ignoring it");
            Ok(Vec::new())
        }
    }
}

fn write_list(store: &dyn KeyValueStore, key: &str, cities: &[City]) -> Result<()> {
    let json = serde_json::to_string(cities).context("Failed to serialize city list")?;
    store.put_string(key, json)
}
