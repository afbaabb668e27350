use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::model::City;

/// Base URLs of every upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub air_quality: String,
    pub geocoding_search: String,
    pub geocoding_reverse: String,
    pub nominatim_reverse: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
            air_quality: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
            geocoding_search: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            geocoding_reverse: "https://geocoding-api.open-meteo.com/v1/reverse".to_string(),
            nominatim_reverse: "https://nominatim.openstreetmap.org/reverse".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// language = "fr"
/// timeout_secs = 10
///
/// [default_city]
/// label = "Toulouse"
/// lat = 43.6047
/// lon = 1.4442
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language requested from the geocoders.
    pub language: String,

    /// Applied to both connect and read of every HTTP call.
    pub timeout_secs: u64,

    pub user_agent: String,

    /// Overrides the platform data directory for the preference store.
    pub store_dir: Option<PathBuf>,

    pub endpoints: Endpoints,

    /// Used when no city has been saved yet.
    pub default_city: City,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "fr".to_string(),
            timeout_secs: 10,
            user_agent: concat!("meteoquote/", env!("CARGO_PKG_VERSION")).to_string(),
            store_dir: None,
            endpoints: Endpoints::default(),
            default_city: City::new("Toulouse", 43.6047, 1.4442),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the preference store, honouring `store_dir`.
    pub fn store_dir_path(&self) -> Result<PathBuf> {
        match &self.store_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("prefs")),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "meteoquote", "meteoquote")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
