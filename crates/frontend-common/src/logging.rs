//! Browser console logging

use portal_core::settings::LoggingConfig;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_web::MakeWebConsoleWriter;

/// Send `tracing` events to the browser console.
///
/// `log` records from dependencies go through `wasm-logger`.
pub fn init(config: &LoggingConfig) {
    let level = LevelFilter::from_str(&config.level).unwrap_or(LevelFilter::INFO);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new())
        .with_filter(level);

    let installed = tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_ok();

    wasm_logger::init(wasm_logger::Config::new(log_level(level)));
    if !installed {
        log::warn!("Tracing subscriber already installed, keeping it");
    }
}

fn log_level(level: LevelFilter) -> log::Level {
    if level == LevelFilter::TRACE {
        log::Level::Trace
    } else if level == LevelFilter::DEBUG {
        log::Level::Debug
    } else if level == LevelFilter::INFO {
        log::Level::Info
    } else if level == LevelFilter::WARN {
        log::Level::Warn
    } else {
        log::Level::Error
    }
}
