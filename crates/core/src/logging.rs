//! Tracing subscriber setup for native consumers (tools, tests)
//!
//! The browser build installs its own console writer; see the frontend crate.

use crate::settings::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter: `RUST_LOG` first, then the configured level, then `info`
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    Ok(())
}

/// Test-friendly initialization: captured output, ignores repeated calls
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&LoggingConfig {
            level: "debug".to_string(),
            json: false,
        }))
        .with_test_writer()
        .try_init();
}
