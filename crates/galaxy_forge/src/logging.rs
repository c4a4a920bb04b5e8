//! Logging system setup and configuration.
//!
//! Initializes the tracing subscriber with human-readable or JSON output,
//! written to stdout or to the file named in the configuration.

use crate::config::LoggingSettings;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system with the specified configuration.
///
/// `RUST_LOG` takes precedence over the configured level. `json_format`
/// forces JSON output regardless of the configuration.
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let json = json_format || config.json_format;

    let registry = tracing_subscriber::registry().with(filter);

    match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = Mutex::new(file);
            if json {
                registry
                    .with(fmt::layer().json().with_writer(writer).with_file(false))
                    .try_init()?;
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer).with_file(false))
                    .try_init()?;
            }
        }
        None => {
            if json {
                registry
                    .with(fmt::layer().json().with_file(false).with_line_number(false))
                    .try_init()?;
            } else {
                registry
                    .with(
                        fmt::layer()
                            .with_ansi(true)
                            .with_file(false)
                            .with_line_number(false)
                            .with_target(false),
                    )
                    .try_init()?;
            }
        }
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}

/// Logs the tool name and version.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║            🌌 GALAXY FORGE 🌌            ║");
    info!("║     Static Galaxy Scenario Toolkit       ║");
    info!("║                 v{:<8}                ║", version);
    info!("╚══════════════════════════════════════════╝");
}
