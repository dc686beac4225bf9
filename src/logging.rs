//! Logging bootstrap.
//!
//! The library crates log through the `log` facade; the subscriber installed
//! here also captures those records.

use std::fmt;

use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Debug, Clone)]
pub struct LoggingError {
    pub message: String,
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "logging init failed: {}", self.message)
    }
}

impl std::error::Error for LoggingError {}

/// Parse `EnvFilter` directives.
pub fn parse_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError {
        message: format!("invalid filter {:?}: {}", directives, e),
    })
}

/// Install the global subscriber. `RUST_LOG` overrides `config.filter`.
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => parse_filter(&directives)?,
        _ => parse_filter(&config.filter)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(tfmt::layer().json()).try_init()
    } else {
        registry.with(tfmt::layer()).try_init()
    };
    installed.map_err(|e| LoggingError {
        message: e.to_string(),
    })?;

    tracing::debug!(json = config.json, "logging initialised");
    Ok(())
}
