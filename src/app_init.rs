use std::{path::PathBuf, time::Duration};

use reqwest::Client;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{ClientConfig, HomeworkPoller, HomeworkService, PracticumApi, TelegramNotifier},
    config::Credentials,
    logging::{LoggingConfig, init_logging},
    result::Result,
};

/// Startup options collected from the command line
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub endpoint: Option<String>,
    pub telegram_api: Option<String>,
    pub log_file: Option<PathBuf>,
    pub no_log_file: bool,
    pub debug: bool,
    pub json: bool,
}

pub struct AppComponents {
    pub poller: HomeworkPoller,
    pub _log_guard: Option<WorkerGuard>,
}

pub fn initialize_app(options: AppOptions) -> Result<AppComponents> {
    let log_guard = initialize_logging(&options)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Homework bot starting up");

    let credentials = Credentials::from_env().inspect_err(|e| {
        error!(error = %e, "Missing credentials, the bot cannot start");
    })?;

    let poller = create_poller(credentials, &options)?;

    Ok(AppComponents { poller, _log_guard: log_guard })
}

fn initialize_logging(options: &AppOptions) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_env();

    // Command line wins over the environment
    if let Some(log_file) = &options.log_file {
        logging_config.log_file = Some(log_file.clone());
    }
    if options.no_log_file {
        logging_config.log_file = None;
    }
    if options.debug {
        logging_config.level = LevelFilter::DEBUG;
    }
    logging_config.json = options.json;

    init_logging(logging_config)
}

fn create_poller(credentials: Credentials, options: &AppOptions) -> Result<HomeworkPoller> {
    let mut client_config = ClientConfig::new(credentials);
    if let Some(interval) = options.interval {
        client_config = client_config.with_retry_interval(interval);
    }
    if let Some(timeout) = options.timeout {
        client_config = client_config.with_timeout(timeout);
    }
    if let Some(endpoint) = &options.endpoint {
        client_config = client_config.with_endpoint(endpoint.as_str());
    }
    if let Some(telegram_api) = &options.telegram_api {
        client_config = client_config.with_telegram_api(telegram_api.as_str());
    }
    client_config.validate()?;

    // One HTTP client for both the review API and Telegram
    let client = Client::builder()
        .timeout(client_config.request.timeout)
        .user_agent(client_config.request.user_agent.as_str())
        .build()?;

    let service = HomeworkService::new(
        PracticumApi::new(client.clone(), &client_config),
        TelegramNotifier::new(client, &client_config),
    );
    let poller = HomeworkPoller::new(service, client_config.polling.clone());

    info!(
        retry_interval = ?poller.retry_interval(),
        cursor = %poller.cursor(),
        "Homework poller configured"
    );

    Ok(poller)
}
