//! Layered settings: defaults, optional file, `PORTAL__*` environment

use crate::cookies::CookieSettings;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_BASE_URL: &str = "https://internship-recruitment-platform.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Request timeout in seconds. Not applied in the browser, where fetch
    /// has no timeout knob.
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "portal_http=debug"
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus `PORTAL__` environment overrides
    /// (`PORTAL__API__BASE_URL`, `PORTAL__COOKIES__SECURE`, ...).
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings: Self = builder
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(CoreError::invalid_config("api.base_url: cannot be empty"));
        }
        url::Url::parse(base)
            .map_err(|e| CoreError::invalid_config(format!("api.base_url: invalid URL - {e}")))?;
        if self.api.timeout_secs == 0 {
            return Err(CoreError::invalid_config(
                "api.timeout_secs: must be greater than zero",
            ));
        }
        if !self.cookies.path.starts_with('/') {
            return Err(CoreError::invalid_config("cookies.path: must start with '/'"));
        }
        Ok(())
    }
}
