use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use std::sync::Arc;
use tracing::debug;

use meteoquote_core::location::{FixedLocation, detect_city};
use meteoquote_core::{
    City, CityStore, Config, Dashboard, FileStore, GeocodeResolver, KeyValueStore, OpenMeteoClient,
    QuoteRotator, ViewState, WeatherAggregator,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteoquote", version, about = "Weather with a quote of the day")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather for the active city, or a stored one.
    Show {
        /// Label of a stored city.
        #[arg(long)]
        city: Option<String>,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// One-line summary of the first stored city.
    Widget,

    /// Manage the city list.
    Cities {
        #[command(subcommand)]
        action: CitiesAction,
    },

    /// Name a position and make it the active city.
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Print today's quote for a weather code.
    Quote {
        /// WMO weather code.
        #[arg(long)]
        code: i32,

        /// Move to the next quote of the rotation first.
        #[arg(long)]
        next: bool,
    },

    /// Set language and request timeout interactively.
    Configure,
}

#[derive(Debug, Subcommand)]
pub enum CitiesAction {
    List,
    /// Search a city by name and add it to the list.
    Add { name: String },
    /// Make a city the active one; prompts when no label is given.
    Select { label: Option<String> },
    Remove { label: String },
    /// Recently viewed cities, newest first.
    Recent,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            command => App::open(config)?.run(command).await,
        }
    }
}

/// Long-lived objects shared by the commands.
struct App {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    cities: CityStore,
}

impl App {
    fn open(config: Config) -> anyhow::Result<Self> {
        let dir = config.store_dir_path()?;
        debug!(dir = %dir.display(), "opening preference store");
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir)?);
        let cities = CityStore::new(store.clone(), config.default_city.clone())?;
        Ok(Self { config, store, cities })
    }

    fn quotes(&self) -> QuoteRotator {
        QuoteRotator::new(self.store.clone())
    }

    fn dashboard(&self) -> anyhow::Result<Dashboard<OpenMeteoClient>> {
        let client = OpenMeteoClient::new(&self.config)?;
        Ok(Dashboard::new(WeatherAggregator::new(client), self.quotes()))
    }

    fn resolver(&self) -> anyhow::Result<GeocodeResolver> {
        Ok(GeocodeResolver::open_data(&self.config)?)
    }

    /// Refreshes `city`, giving up quietly on Ctrl-C.
    async fn refresh(&self, city: &City) -> anyhow::Result<Option<ViewState>> {
        let dashboard = self.dashboard()?;
        tokio::select! {
            state = dashboard.refresh(city) => Ok(state),
            _ = tokio::signal::ctrl_c() => {
                debug!("refresh interrupted");
                Ok(None)
            }
        }
    }

    async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Show { city, json } => show(self, city.as_deref(), json).await?,
            Command::Widget => widget(self).await?,
            Command::Cities { action } => cities(self, action).await?,
            Command::Locate { lat, lon } => {
                let resolver = self.resolver()?;
                let city = detect_city(&FixedLocation::at(lat, lon), &resolver, &self.cities).await?;
                println!("{}", render::city_line(&city));
            }
            Command::Quote { code, next } => {
                let today = Local::now().date_naive();
                println!("{}", self.quotes().get_quote(today, code, next)?);
            }
            Command::Configure => configure(self.config.clone())?,
        }

        Ok(())
    }
}

async fn show(app: &App, label: Option<&str>, json: bool) -> anyhow::Result<()> {
    let city = match label {
        Some(label) => find_city(&app.cities, label)?,
        None => app.cities.active()?,
    };

    let Some(state) = app.refresh(&city).await? else {
        return Ok(());
    };

    match state {
        ViewState::Ready(snapshot) => {
            app.cities.touch_recent(&snapshot.city)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render::snapshot(&snapshot));
            }
        }
        ViewState::Failed(message) => bail!(message),
        ViewState::Loading => {}
    }

    Ok(())
}

async fn widget(app: &App) -> anyhow::Result<()> {
    let city = app.cities.active()?;

    match app.refresh(&city).await? {
        Some(ViewState::Ready(snapshot)) => println!("{}", render::widget_line(&snapshot)),
        Some(ViewState::Failed(message)) => println!("{}: {message}", city.label),
        Some(ViewState::Loading) | None => {}
    }

    Ok(())
}

async fn cities(app: &App, action: CitiesAction) -> anyhow::Result<()> {
    match action {
        CitiesAction::List => {
            for (i, city) in app.cities.cities()?.iter().enumerate() {
                let marker = if i == 0 { "*" } else { " " };
                println!("{marker} {}", render::city_line(city));
            }
        }
        CitiesAction::Add { name } => {
            let city = app.resolver()?.geocode(&name).await?;
            if app.cities.add_if_absent(city.clone())? {
                println!("Added {}", render::city_line(&city));
            } else {
                println!("{} is already in the list", city.label);
            }
        }
        CitiesAction::Select { label } => {
            let label = match label {
                Some(label) => label,
                None => prompt_city(&app.cities.cities()?)?,
            };
            match app.cities.select(&label)? {
                Some(city) => println!("Active city: {}", city.label),
                None => bail!("no stored city named {label:?}"),
            }
        }
        CitiesAction::Remove { label } => {
            if !app.cities.remove(&label)? {
                bail!("no stored city named {label:?}");
            }
            println!("Removed {label}");
        }
        CitiesAction::Recent => {
            for city in app.cities.recent()? {
                println!("{}", render::city_line(&city));
            }
        }
    }

    Ok(())
}

fn find_city(cities: &CityStore, label: &str) -> anyhow::Result<City> {
    cities
        .cities()?
        .into_iter()
        .find(|c| c.same_label(label))
        .with_context(|| format!("no stored city named {label:?}"))
}

fn prompt_city(cities: &[City]) -> anyhow::Result<String> {
    let labels: Vec<String> = cities.iter().map(|c| c.label.clone()).collect();
    Ok(Select::new("Active city:", labels).prompt()?)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    config.language = Text::new("Language for place names:")
        .with_default(&config.language)
        .prompt()?
        .trim()
        .to_string();

    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .with_error_message("Please type a whole number of seconds")
        .prompt()?;

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}
