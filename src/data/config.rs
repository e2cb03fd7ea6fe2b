//! Provider configuration.
//!
//! The client never reads the environment itself; an `OwmConfig` is built once
//! (normally via [`OwmConfig::from_env`]) and handed to `OwmClient::new`.

use std::fmt;

use crate::error::AppError;

pub const API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
pub const BASE_URL_VAR: &str = "OPENWEATHERMAP_BASE_URL";
pub const GEO_URL_VAR: &str = "OPENWEATHERMAP_GEO_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

#[derive(Clone)]
pub struct OwmConfig {
    pub api_key: String,
    pub base_url: String,
    pub geo_url: String,
}

impl OwmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            geo_url: DEFAULT_GEO_URL.to_string(),
        }
    }

    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_key = lookup(API_KEY_VAR).ok_or_else(|| {
            AppError::config(format!(
                "OpenWeatherMap API key not found in environment variables ({API_KEY_VAR})."
            ))
        })?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::config("OpenWeatherMap API key cannot be empty."));
        }

        let url = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: url(BASE_URL_VAR, DEFAULT_BASE_URL),
            geo_url: url(GEO_URL_VAR, DEFAULT_GEO_URL),
        })
    }
}

// Keep the key out of logs and panic messages.
impl fmt::Debug for OwmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("geo_url", &self.geo_url)
            .finish()
    }
}
