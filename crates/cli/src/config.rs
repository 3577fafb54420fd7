//! Configuration loading from dailyquote.toml.

use client::NameRules;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "dailyquote.toml";

/// Environment variable overriding the endpoint URL.
pub const ENDPOINT_ENV: &str = "DAILYQUOTE_ENDPOINT";

const DEFAULT_ENDPOINT: &str =
    "https://clx8580ut5.execute-api.us-east-1.amazonaws.com/Prod/quote/";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Quote service configuration.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Name length bounds.
    #[serde(default)]
    pub name: NameRules,
}

/// Quote service configuration.
#[derive(Debug, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the quote endpoint.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_ms() -> u64 {
    client::DEFAULT_TIMEOUT.as_millis() as u64
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `dailyquote.toml` if it exists, else
    /// defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment overrides, reading variables through `var`.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var(ENDPOINT_ENV).filter(|u| !u.trim().is_empty()) {
            self.endpoint.url = url;
        }
        self
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        endpoint: Option<String>,
        timeout_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = endpoint {
            self.endpoint.url = url;
        }
        if let Some(ms) = timeout_ms {
            self.endpoint.timeout_ms = ms;
        }
        self.check()?;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.endpoint.timeout_ms)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.endpoint.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "endpoint.timeout_ms must be greater than zero".into(),
            ));
        }
        if self.name.min_len == 0 {
            return Err(ConfigError::Invalid(
                "name.min_length must be at least 1".into(),
            ));
        }
        if self.name.min_len > self.name.max_len {
            return Err(ConfigError::Invalid(format!(
                "name.min_length ({}) exceeds name.max_length ({})",
                self.name.min_len, self.name.max_len
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
