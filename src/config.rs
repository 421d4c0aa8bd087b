//! Configuration management for locator resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Resolver configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Derive absolute locators from cached ancestor locators instead of
    /// resolving the ancestors first
    pub resolution_avoidance: bool,

    /// Log level
    pub log_level: String,

    /// Warn when a node without a raw locator falls back to a derived one
    pub warn_on_raw_locator_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution_avoidance: true,
            log_level: "info".to_string(),
            warn_on_raw_locator_fallback: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(avoidance) = env::var("LOCATOR_RESOLUTION_AVOIDANCE") {
            config.resolution_avoidance = avoidance
                .parse()
                .map_err(|_| Error::configuration("Invalid LOCATOR_RESOLUTION_AVOIDANCE"))?;
        }

        if let Ok(log_level) = env::var("LOCATOR_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(warn) = env::var("LOCATOR_WARN_ON_FALLBACK") {
            config.warn_on_raw_locator_fallback = warn
                .parse()
                .map_err(|_| Error::configuration("Invalid LOCATOR_WARN_ON_FALLBACK"))?;
        }

        Ok(config)
    }

    /// Load configuration from a file. A file that cannot be read is an
    /// [`Error::Io`], one that cannot be parsed an [`Error::Configuration`].
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))
    }
}
