use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::sync::Arc;

use weatherdash_core::{
    Config, FileLocationStore, LocationQuery, LocationStore, OpenWeatherClient, Resolver, Section,
    UpstreamClient,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and preferred language.
    Configure,

    /// Show current conditions and forecast for a city or coordinates.
    Show(ShowArgs),

    /// Look up a place name and print its region and coordinates.
    Locate {
        /// City name, e.g. "Springfield" or "Springfield,US".
        city: String,
    },

    /// List recently looked-up places.
    History {
        /// Number of entries to show.
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// City name, e.g. "Paris" or "Portland,US".
    #[arg(conflicts_with_all = ["lat", "lon"], required_unless_present_all = ["lat", "lon"])]
    pub city: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Sections to leave out for coordinate lookups, e.g. "minutely,alerts".
    #[arg(long)]
    pub exclude: Option<String>,

    /// Print the raw dashboard JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    fn query(&self) -> anyhow::Result<LocationQuery> {
        let query = match (&self.city, self.lat, self.lon) {
            (Some(city), _, _) => LocationQuery::city(city)?,
            (None, Some(lat), Some(lon)) => LocationQuery::coords(lat, lon)?,
            _ => bail!("Provide either a city name or both --lat and --lon."),
        };
        Ok(query)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show(args) => show(args).await,
            Command::Locate { city } => locate(&city).await,
            Command::History { limit } => history(limit).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty.");
    }
    config.set_api_key(api_key);

    let lang = Text::new("Language for weather descriptions:")
        .with_default(&config.lang)
        .prompt()
        .context("Language prompt cancelled")?;
    config.lang = lang.trim().to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.apply_env_overrides();

    let query = args.query()?;

    let mut exclude = config.excluded_sections()?;
    if let Some(csv) = &args.exclude {
        exclude = Section::parse_list(csv)?;
    }

    let mut resolver = Resolver::new(OpenWeatherClient::from_config(&config)).with_exclude(exclude);
    if config.record_history {
        match FileLocationStore::default_location() {
            Ok(store) => resolver = resolver.with_history(Arc::new(store)),
            Err(err) => tracing::warn!(error = %err, "location history disabled"),
        }
    }

    let resolution = match resolver.resolve(&query).await {
        Ok(resolution) => resolution,
        Err(err) => bail!("{err}\nHint: {}", err.hint()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution.to_payload())?);
    } else {
        print!("{}", render::summary(&resolution));
    }

    Ok(())
}

async fn locate(city: &str) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.apply_env_overrides();

    let client = OpenWeatherClient::from_config(&config);
    let place = match client.geocode(city).await {
        Ok(place) => place,
        Err(err) => bail!("{err}\nHint: {}", err.hint()),
    };

    print!("{}", render::place(&place));
    Ok(())
}

async fn history(limit: usize) -> anyhow::Result<()> {
    let store = FileLocationStore::default_location()?;
    let entries = store.recent(limit).await?;

    if entries.is_empty() {
        println!("No places looked up yet ({}).", store.path().display());
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {:<24} {:>8.4}, {:>9.4}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.name,
            entry.lat,
            entry.lon
        );
    }

    Ok(())
}
