//! Brewwatch CLI
//!
//! Command-line interface for the espresso machine monitoring service.

use std::path::PathBuf;

use brewwatch::{load_config, Config};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "brewwatch")]
#[command(about = "Espresso machine monitoring and notification service")]
#[command(version)]
struct Args {
    /// Path to a JSON configuration file (defaults to environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Send this message through the configured alert channels and exit
    #[arg(long, value_name = "MESSAGE")]
    test_alert: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    // File errors surface through `?`; the environment is read after logging
    // is up so fallback warnings are visible.
    let file_config = args.config.as_deref().map(load_config).transpose()?;
    let debug = match &file_config {
        Some(config) => config.debug,
        None => Config::debug_from_env(),
    };

    tracing_subscriber::fmt()
        .with_max_level(brewwatch::effective_log_level(args.log_level, debug))
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}, test_alert={:?}",
        args.config,
        args.log_level,
        args.test_alert
    );

    let config = match file_config {
        Some(config) => config,
        None => {
            tracing::debug!("Reading configuration from the environment");
            Config::from_env()
        }
    };

    if let Some(message) = &args.test_alert {
        let report = brewwatch::send_test_alert(&config, message).await?;
        tracing::info!(
            "Test alert finished: {} delivered, {} failed",
            report.delivered,
            report.failed
        );
        return Ok(());
    }

    tracing::info!("Starting brewwatch service");
    brewwatch::run(config).await?;

    Ok(())
}
