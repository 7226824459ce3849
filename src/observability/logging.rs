//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level when it is set.

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Build the subscriber described by `config` without installing it.
pub fn subscriber(config: &LoggingConfig) -> Box<dyn Subscriber + Send + Sync> {
    let filter = build_env_filter(&config.level);
    match config.format {
        LogFormat::Json => Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_current_span(true)),
        ),
        LogFormat::Pretty => Box::new(tracing_subscriber::registry().with(filter).with(fmt::layer())),
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    subscriber(config)
        .try_init()
        .map_err(|e| LoggingError(e.to_string()))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
