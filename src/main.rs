use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing::{error, info};

mod app_init;
mod client;
mod config;
mod cursor;
mod domain;
mod logging;
mod result;

use app_init::{AppComponents, AppOptions, initialize_app};

#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(author, version, about = "Relays Practicum homework review statuses to Telegram")]
struct Cli {
    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Seconds to wait between poll cycles
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Per-request timeout in seconds, must be shorter than the interval
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Homework statuses endpoint
    #[arg(long, env = "PRACTICUM_ENDPOINT", value_name = "URL", hide = true)]
    endpoint: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", value_name = "URL", hide = true)]
    telegram_api: Option<String>,

    /// Log file path (default: homework_bot.log)
    #[arg(long, value_name = "PATH", conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Log to stdout only
    #[arg(long)]
    no_log_file: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit JSON log lines on stdout
    #[arg(long)]
    json: bool,
}

impl From<&Cli> for AppOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            interval: cli.interval.map(Duration::from_secs),
            timeout: cli.timeout.map(Duration::from_secs),
            endpoint: cli.endpoint.clone(),
            telegram_api: cli.telegram_api.clone(),
            log_file: cli.log_file.clone(),
            no_log_file: cli.no_log_file,
            debug: cli.debug,
            json: cli.json,
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let AppComponents { mut poller, _log_guard } = initialize_app(AppOptions::from(&cli))?;

    if cli.once {
        poller.run_once().await?;
        return Ok(());
    }

    let shutdown = poller.shutdown_sender();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                let _ = shutdown.send(());
            },
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    poller.start().await;

    Ok(())
}
