mod replay;
mod session;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nearby_core::{TestLocation, PLACE_TYPES};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nearby")]
#[command(about = "Location-gated nearby places search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Take one location sample, search once and print the places found
    Once {
        /// Latitude of a fixed test location
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of a fixed test location
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// YAML track file to take the sample from
        #[arg(long, conflicts_with = "lat")]
        track: Option<PathBuf>,
    },
    /// Replay a track through scheduled sampling until it runs out
    Watch {
        /// YAML track file to replay
        #[arg(long)]
        track: PathBuf,
        /// Seconds between samples (overrides NEARBY_DEFAULT_INTERVAL_SECS)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Print the great-circle distance in meters between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
    /// List the supported place types
    PlaceTypes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let meters = nearby_core::geo::distance(lat1, lon1, lat2, lon2);
            println!("{meters:.1}");
        }
        Commands::PlaceTypes => {
            for place_type in PLACE_TYPES {
                println!("{place_type}");
            }
        }
        Commands::Once { lat, lon, track } => {
            let config = init()?;
            let test_location = lat.zip(lon).map(|(lat, lon)| TestLocation::new(lat, lon));
            session::run_once(&config, test_location, track.as_deref()).await?;
        }
        Commands::Watch {
            track,
            interval_secs,
        } => {
            let config = init()?;
            session::run_watch(&config, &track, interval_secs).await?;
        }
    }

    Ok(())
}

/// Load `.env` and the environment, then install the tracing subscriber.
fn init() -> anyhow::Result<nearby_core::AppConfig> {
    dotenvy::dotenv().ok();
    let config = nearby_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(config = ?config, "nearby: configuration loaded");
    Ok(config)
}
