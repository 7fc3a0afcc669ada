// Logging module for structured logging using the tracing crate

use std::error::Error;
use std::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

/// Log level name that is not one of debug, info, warning/warn or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLevel(pub String);

impl fmt::Display for InvalidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid log level '{}'. Valid levels: debug, info, warning, error",
            self.0
        )
    }
}

impl Error for InvalidLevel {}

/// Map a user-facing level name to a tracing filter directive.
///
/// Accepts `DEBUG`, `INFO`, `WARNING` and `ERROR` in any casing, plus `warn`
/// and `trace`.
pub fn parse_level(level: &str) -> Result<&'static str, InvalidLevel> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warning" | "warn" => Ok("warn"),
        "error" => Ok("error"),
        _ => Err(InvalidLevel(level.to_string())),
    }
}

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - An `EnvFilter`: `RUST_LOG` wins when set, otherwise the configured level
/// - JSON output (servers) or compact text (command line)
/// - Output to stderr so command-line stdout stays clean
///
/// # Errors
///
/// Returns an error for an unknown level or if a global subscriber is
/// already installed.
///
/// # Examples
///
/// ```no_run
/// use qr_builder::config::LoggingConfig;
/// use qr_builder::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Compact => Registry::default()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}
