//! Room Monitor service binary
//!
//! Settings come from the optional JSON config file and `ROOM_MONITOR_*`
//! environment variables; the command line only selects the file and the log
//! level.

use std::path::PathBuf;

use clap::Parser;
use room_monitor::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "room-monitor")]
#[command(about = "Room temperature and humidity monitoring service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}",
        args.config,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_env_overrides()?;

    tracing::info!("Starting room monitor service");
    tracing::debug!(
        "Source: {}/{}, interval: {}, window: {}, alerts: {}",
        config.source.base_url,
        config.source.path,
        humantime::format_duration(config.poller.interval),
        config.history.capacity,
        config.alert.enabled
    );

    room_monitor::run(config).await?;

    Ok(())
}
