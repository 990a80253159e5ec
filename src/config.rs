//! Configuration loading and validation.
//!
//! sunalert runs with built-in defaults. An optional `sunalert.toml` in the
//! user's config directory (`$XDG_CONFIG_HOME/sunalert/sunalert.toml` on
//! Linux) or a file passed with `--config` can override them. The file is
//! never created automatically.
//!
//! ```toml
//! api_url = "https://api.sunrise-sunset.org/json"  # Lookup endpoint
//! request_timeout_secs = 10                        # 1-120 seconds
//! alert_lead_minutes = 5                           # 1-120 minutes before each event
//! strict_coordinates = false                       # Reject out-of-range lat/lon
//! default_coordinates = "40.7128,-74.0060"         # Fetched on startup
//! ```
//!
//! Unknown keys are rejected so typos surface as errors instead of being
//! silently ignored.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::geo::{CoordinateValidation, parse_coordinates};
use crate::logger::Log;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Lookup endpoint; must be an http(s) URL.
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub alert_lead_minutes: Option<u64>,
    /// When `true`, latitude/longitude outside their valid ranges are rejected.
    pub strict_coordinates: Option<bool>,
    /// `"lat,lon"` looked up as soon as the session starts.
    pub default_coordinates: Option<String>,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the user's config file if it exists, defaults otherwise.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Load a config file that must exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        validate_config(&config)?;

        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn alert_lead(&self) -> chrono::Duration {
        let minutes = self.alert_lead_minutes.unwrap_or(DEFAULT_ALERT_LEAD_MINUTES);
        // Bounded by validate_config.
        chrono::Duration::minutes(minutes as i64)
    }

    pub fn coordinate_validation(&self) -> CoordinateValidation {
        CoordinateValidation::from_strict(
            self.strict_coordinates
                .unwrap_or(DEFAULT_STRICT_COORDINATES),
        )
    }

    /// Print the effective settings.
    pub fn log_config(&self) {
        Log::log_block_start("Loaded configuration");
        Log::log_indented(&format!("Endpoint: {}", self.api_url()));
        Log::log_indented(&format!(
            "Request timeout: {} seconds",
            self.request_timeout().as_secs()
        ));
        Log::log_indented(&format!(
            "Alert lead time: {} minutes",
            self.alert_lead().num_minutes()
        ));
        Log::log_indented(&format!(
            "Coordinate validation: {}",
            match self.coordinate_validation() {
                CoordinateValidation::SyntaxOnly => "syntax only",
                CoordinateValidation::Ranged => "syntax and range",
            }
        ));
        if let Some(coords) = &self.default_coordinates {
            Log::log_indented(&format!("Default coordinates: {}", coords));
        }
    }
}

/// Reject settings outside their limits.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(url) = &config.api_url {
        let parsed = reqwest::Url::parse(url)
            .with_context(|| format!("Invalid api_url \"{}\"", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "api_url must use http or https, got \"{}\"",
                parsed.scheme()
            );
        }
    }

    let timeout = config
        .request_timeout_secs
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if !(MINIMUM_REQUEST_TIMEOUT_SECS..=MAXIMUM_REQUEST_TIMEOUT_SECS).contains(&timeout) {
        anyhow::bail!(
            "Request timeout ({} seconds) must be between {} and {} seconds",
            timeout,
            MINIMUM_REQUEST_TIMEOUT_SECS,
            MAXIMUM_REQUEST_TIMEOUT_SECS
        );
    }

    let lead = config
        .alert_lead_minutes
        .unwrap_or(DEFAULT_ALERT_LEAD_MINUTES);
    if !(MINIMUM_ALERT_LEAD_MINUTES..=MAXIMUM_ALERT_LEAD_MINUTES).contains(&lead) {
        anyhow::bail!(
            "Alert lead time ({} minutes) must be between {} and {} minutes",
            lead,
            MINIMUM_ALERT_LEAD_MINUTES,
            MAXIMUM_ALERT_LEAD_MINUTES
        );
    }

    if let Some(coords) = &config.default_coordinates {
        parse_coordinates(coords, config.coordinate_validation())
            .with_context(|| format!("Invalid default_coordinates \"{}\"", coords))?;
    }

    Ok(())
}
