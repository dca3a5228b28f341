//! Frontend configuration
//!
//! The browser has no config file or environment, so settings are the
//! defaults with a couple of build-time overrides.

use portal_core::Settings;

/// Build-time override for the API base URL
pub const API_BASE_URL: Option<&str> = option_env!("PORTAL_API_BASE_URL");

/// Build-time override for the console log level
pub const LOG_LEVEL: Option<&str> = option_env!("PORTAL_LOG_LEVEL");

/// Settings for the browser build
pub fn settings() -> Settings {
    apply_overrides(Settings::default(), API_BASE_URL, LOG_LEVEL)
}

fn apply_overrides(mut settings: Settings, base_url: Option<&str>, level: Option<&str>) -> Settings {
    if let Some(base_url) = base_url.map(str::trim).filter(|url| !url.is_empty()) {
        settings.api.base_url = base_url.to_string();
    }
    if let Some(level) = level {
        settings.logging.level = level.to_string();
    }
    settings
}
