//! Data File API Entry Point
//!
//! Loads configuration, initializes logging, and serves the read endpoint
//! over HTTP.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use data_file_api::core::{Config, FileApi, HttpTransport, config::{ConfigSource, LoggingConfig}};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from file and environment
    let (config, source) = Config::from_env()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);
    match source {
        ConfigSource::Defaults => warn!("No configuration file found, using {}", source),
        ConfigSource::File(_) => info!("Configuration loaded from {}", source),
    }

    let transport = HttpTransport::new(config.http.clone());
    info!("Starting transport: {}", config.http.description());

    let api = FileApi::new(config)?;

    info!("Server initialized");

    transport.run(api).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(logging: &LoggingConfig) {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if logging.with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
