use anyhow::Context;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use daylight_core::{
    Config, DaylightPayload, DaylightReport, DaylightService, config::DEFAULT_TIME_ZONE,
};
use inquire::{Password, PasswordDisplayMode, Text, validator::Validation};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "daylight", version, about = "Daylight length across the year for a city")]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the geocoding API key and the target time zone.
    Configure,

    /// Show the daylight report for a city.
    Show {
        /// City name, e.g. "Helsinki".
        city: String,

        /// Print the JSON payload instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API over HTTP.
    Serve {
        /// Address to bind; defaults to the configured `listen_addr`.
        #[arg(long)]
        listen: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => {
                let config = Config::load()?;
                let service = DaylightService::from_config(&config)?;
                let report = service.get_report(&city).await?;

                if json {
                    let payload = DaylightPayload::from_report(&report);
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                } else {
                    print_report(&report, &config.time_zone);
                }
                Ok(())
            }
            Command::Serve { listen } => {
                let config = Config::load()?;
                let service = DaylightService::from_config(&config)?;
                let addr = listen.unwrap_or_else(|| config.listen_addr.clone());
                crate::server::serve(service, &addr).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("geocode.maps.co API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;

    if !api_key.trim().is_empty() {
        config.set_geocode_api_key(api_key.trim().to_string());
    }

    // A stored zone that no longer parses is offered as the stock default instead.
    let current = config.target_zone().map_or(DEFAULT_TIME_ZONE, |zone| zone.name());
    let zone = Text::new("Time zone for local times:")
        .with_default(current)
        .with_validator(|input: &str| {
            Ok(match input.parse::<Tz>() {
                Ok(_) => Validation::Valid,
                Err(_) => Validation::Invalid("Unknown IANA time zone".into()),
            })
        })
        .prompt()
        .context("Failed to read time zone")?;

    let zone: Tz = zone
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown time zone '{zone}'"))?;
    config.set_time_zone(zone);

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn print_report(report: &DaylightReport, zone: &str) {
    println!("Daylight in {}", report.city_name);
    println!();

    for entry in &report.day_lengths {
        println!("  {}  {}", entry.date.format("%Y-%m-%d"), entry.duration);
    }
    println!();

    match &report.today {
        Some(today) => {
            let sunrise = today.sunrise.format("%H:%M:%S");
            let sunset = today.sunset.format("%H:%M:%S");
            println!("Sunrise today: {sunrise} ({zone})");
            println!("Sunset today:  {sunset} ({zone})");
            println!("{}", today.sunset_status);
        }
        None => println!("Today's sunrise and sunset are unavailable."),
    }
}
