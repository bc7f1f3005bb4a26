//! `calcheck`: clinic appointment availability from Google Calendar.
//!
//! ## Usage
//!
//! ```sh
//! # Serve the availability page on the configured address
//! calcheck serve
//!
//! # Serve on another port without the startup Telegram summary
//! calcheck serve --bind 127.0.0.1:3000 --no-startup-summary
//!
//! # Print this week's slots from the live calendar
//! calcheck week
//!
//! # Print slots from a saved events-list response, as JSON
//! calcheck week --events events.json --today 2026-03-11 --json
//!
//! # Print the Telegram summary, or send it
//! calcheck summary --send
//! ```
//!
//! Settings are read from `calcheck.toml` (see `--config`); tokens come from
//! the environment or a `.env` file.

mod config;
mod error;
mod google;
mod render;
mod server;
mod service;
mod telegram;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use slot_engine::DaySchedule;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::server::AppState;
use crate::service::AvailabilityService;

#[derive(Parser)]
#[command(
    name = "calcheck",
    version,
    about = "Clinic appointment availability from Google Calendar"
)]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(short, long, global = true, default_value = "calcheck.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Listen address (overrides `bind` from the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Do not send the Telegram summary on startup
        #[arg(long)]
        no_startup_summary: bool,
    },
    /// Print the slots of the coming week
    Week {
        /// Saved events-list JSON to use instead of the live calendar
        #[arg(long)]
        events: Option<PathBuf>,
        /// First day of the week (YYYY-MM-DD); defaults to today in the clinic timezone
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the free-slot summary
    Summary {
        /// Saved events-list JSON to use instead of the live calendar
        #[arg(long)]
        events: Option<PathBuf>,
        /// First day of the week (YYYY-MM-DD); defaults to today in the clinic timezone
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Send the summary through Telegram as well
        #[arg(long)]
        send: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Commands::Serve {
            bind,
            no_startup_summary,
        } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let service =
                AvailabilityService::new(config).context("Failed to initialise services")?;
            let state = AppState::new(service);

            if !no_startup_summary {
                server::startup_summary(&state).await;
            }
            server::serve(state, &bind)
                .await
                .with_context(|| format!("Server on {bind} failed"))?;
        }
        Commands::Week {
            events,
            today,
            json,
        } => {
            let service =
                AvailabilityService::new(config).context("Failed to initialise services")?;
            let schedules = load_week(&service, events.as_deref(), today).await?;
            let days = service.views(&schedules);
            if json {
                println!("{}", serde_json::to_string_pretty(&days)?);
            } else {
                print!("{}", render::week_text(&days));
            }
        }
        Commands::Summary {
            events,
            today,
            send,
        } => {
            let service =
                AvailabilityService::new(config).context("Failed to initialise services")?;
            let schedules = load_week(&service, events.as_deref(), today).await?;
            let text = service.summary(&schedules);
            print!("{text}");
            if send {
                service
                    .send_summary(&text)
                    .await
                    .context("Failed to send the Telegram summary")?;
            }
        }
    }

    Ok(())
}

/// Week schedules from a saved events file, or from the live calendar.
async fn load_week(
    service: &AvailabilityService,
    events: Option<&Path>,
    today: Option<NaiveDate>,
) -> Result<Vec<DaySchedule>> {
    let today = today.unwrap_or_else(|| service.today());
    match events {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let busy = google::parse_events(&json, service.config().timezone())
                .with_context(|| format!("Failed to parse events in {}", path.display()))?;
            Ok(service.week_from(today, &busy))
        }
        None => service
            .fetch_week(today)
            .await
            .context("Failed to fetch the calendar"),
    }
}
