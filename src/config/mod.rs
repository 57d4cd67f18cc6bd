// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::MAX_URL_EXPIRATION_SECS;
use crate::logging::LogFormat;

mod fetch;
mod server;
mod storage;

pub use fetch::FetchConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

/// Environment variables honoured on top of the YAML file.
pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_BACKGROUND_KEY: &str = "BACKGROUND_KEY";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_URL_EXPIRATION: &str = "S3_URL_EXPIRATION";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Process-wide configuration.
///
/// Loaded once at startup and shared read-only (`Arc<Config>`) by every
/// request. Every section has defaults, so an empty document is valid.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Load from an optional file, then apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `S3_BUCKET`, `BACKGROUND_KEY`, `AWS_REGION` and `S3_URL_EXPIRATION`
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(bucket) = non_empty(ENV_BUCKET) {
            self.storage.bucket = bucket;
        }
        if let Some(key) = non_empty(ENV_BACKGROUND_KEY) {
            self.storage.background_key = key;
        }
        if let Some(region) = non_empty(ENV_REGION) {
            self.storage.region = region;
        }
        if let Some(expiration) = non_empty(ENV_URL_EXPIRATION) {
            self.storage.url_expiration_secs = expiration.trim().parse().map_err(|_| {
                format!(
                    "{} must be a number of seconds, got '{}'",
                    ENV_URL_EXPIRATION, expiration
                )
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        let storage = &self.storage;

        if storage.bucket.trim().is_empty() {
            return Err("Storage bucket cannot be empty".to_string());
        }
        if storage.region.trim().is_empty() {
            return Err("Storage region cannot be empty".to_string());
        }
        if storage.background_key.trim().is_empty() {
            return Err("Background key cannot be empty".to_string());
        }
        if storage.url_expiration_secs == 0 || storage.url_expiration_secs > MAX_URL_EXPIRATION_SECS
        {
            return Err(format!(
                "url_expiration_secs must be between 1 and {} seconds, got {}",
                MAX_URL_EXPIRATION_SECS, storage.url_expiration_secs
            ));
        }
        if storage.access_key.is_some() != storage.secret_key.is_some() {
            return Err(
                "Static credentials require both access_key and secret_key".to_string(),
            );
        }
        if let Some(endpoint) = &storage.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!(
                    "Storage endpoint '{}' must start with http:// or https://",
                    endpoint
                ));
            }
        }

        if self.fetch.timeout_secs == 0 {
            return Err("fetch.timeout_secs must be greater than 0".to_string());
        }
        if self.fetch.max_logo_bytes == 0 {
            return Err("fetch.max_logo_bytes must be greater than 0".to_string());
        }
        if self.server.max_request_bytes == 0 {
            return Err("server.max_request_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}
