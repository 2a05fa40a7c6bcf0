//! Configuration for the resolution engine and its backends.

use crate::{Result, SecretfigError};
use std::collections::HashMap;
use std::env;

/// Environment variable controlling the parameter store decrypt default.
pub const DECRYPT_ENV: &str = "SECRETFIG_DECRYPT";

/// Environment variable overriding the AWS endpoint (LocalStack testing).
pub const ENDPOINT_ENV: &str = "SECRETFIG_ENDPOINT";

/// Configuration for building a resolver.
///
/// Use the builder pattern for ergonomic configuration:
///
/// ```
/// use secretfig::Config;
///
/// let config = Config::new()
///     .with_region("eu-west-1")
///     .with_decrypt(false)
///     .with_option("profile", "staging");
///
/// assert!(!config.decrypt_parameter_store_values);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Request decryption of SecureString parameters (default: true)
    pub decrypt_parameter_store_values: bool,

    /// AWS region; falls back to the SDK's default chain when unset
    pub region: Option<String>,

    /// Custom endpoint URL (for LocalStack testing)
    pub endpoint: Option<String>,

    /// Backend-specific options
    pub options: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decrypt_parameter_store_values: true,
            region: None,
            endpoint: None,
            options: HashMap::new(),
        }
    }
}

impl Config {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads `SECRETFIG_DECRYPT`, `AWS_REGION` and `SECRETFIG_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretfigError::InvalidConfig`] if `SECRETFIG_DECRYPT` is
    /// not a recognized boolean.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(DECRYPT_ENV) {
            config.decrypt_parameter_store_values = parse_bool(&raw).ok_or_else(|| {
                SecretfigError::InvalidConfig(format!("{}={} is not a boolean", DECRYPT_ENV, raw))
            })?;
        }

        if let Ok(region) = env::var("AWS_REGION") {
            if !region.is_empty() {
                config.region = Some(region);
            }
        }

        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                config.endpoint = Some(endpoint);
            }
        }

        Ok(config)
    }

    /// Sets whether parameter store fetches request decryption.
    pub fn with_decrypt(mut self, decrypt: bool) -> Self {
        self.decrypt_parameter_store_values = decrypt;
        self
    }

    /// Sets the AWS region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets a custom endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Adds a backend-specific option.
    ///
    /// Common options:
    ///
    /// - `profile`: named AWS profile to load credentials from
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Gets a backend-specific option value.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
