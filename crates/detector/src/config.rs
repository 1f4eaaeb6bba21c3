// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Detection service configuration
//!
//! Holds the provider endpoint, the build-time credential, the accepted input
//! constraints and the dispatch pacing. Values come from defaults, optional
//! `detector.*` files and `DETECTOR_` environment variables.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::ensure;
use api_client::ApiKey;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use external_apis::{DEFAULT_HIVE_ENDPOINT, HiveConfig};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DetectorError, DetectorResult};

/// API key baked in at compile time, if any
pub const BUILD_TIME_API_KEY: Option<&str> = option_env!("DETECTOR_PROVIDER_API_KEY");

/// Default payload ceiling (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Default minimum spacing between provider requests
pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 1000;

/// Default provider request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// MIME types accepted by default
pub const DEFAULT_ACCEPTED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 300;
const ENV_PREFIX: &str = "DETECTOR";

/// Detection service configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Credential configured at build or deploy time
    pub provider_api_key: Option<String>,
    /// Provider task endpoint
    pub provider_endpoint: Url,
    /// MIME types accepted for file analysis
    pub accepted_mime_types: Vec<String>,
    /// Largest accepted payload in bytes
    pub max_file_size_bytes: u64,
    /// Minimum spacing between provider requests in milliseconds (0 disables pacing)
    pub min_request_interval_ms: u64,
    /// Provider request timeout in seconds (validated range: 1-300)
    pub request_timeout_seconds: u64,
    /// JSON file backing the persisted credential; in-memory when unset
    pub credential_store_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            provider_api_key: BUILD_TIME_API_KEY.map(str::to_string),
            provider_endpoint: default_endpoint(),
            accepted_mime_types: DEFAULT_ACCEPTED_MIME_TYPES
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            min_request_interval_ms: DEFAULT_MIN_REQUEST_INTERVAL_MS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            credential_store_path: None,
        }
    }
}

impl fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorConfig")
            .field(
                "provider_api_key",
                &self.provider_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("provider_endpoint", &self.provider_endpoint.as_str())
            .field("accepted_mime_types", &self.accepted_mime_types)
            .field("max_file_size_bytes", &self.max_file_size_bytes)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("credential_store_path", &self.credential_store_path)
            .finish()
    }
}

impl DetectorConfig {
    /// Load and validate configuration from files and environment variables
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Configuration` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> DetectorResult<Self> {
        let config = Self::load()
            .map_err(|e| DetectorError::config(format!("failed to load configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (`detector.{toml,json,yaml}`)
    /// 3. Environment-specific file (`detector.{env}.*`, selected by `ENVIRONMENT`)
    /// 4. Environment variables with `DETECTOR_` prefix
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Self::builder()?
            .add_source(File::with_name("detector").required(false))
            .add_source(
                File::with_name(&format!("detector.{}", env_var.to_lowercase())).required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("accepted_mime_types")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from defaults and a single file
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Configuration` if the file cannot be read or the
    /// result is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> DetectorResult<Self> {
        let path = path.as_ref();
        let config: Self = Self::builder()
            .and_then(|builder| builder.add_source(File::from(path)).build())
            .and_then(Config::try_deserialize)
            .map_err(|e| {
                DetectorError::config(format!(
                    "failed to load configuration from {}: {e}",
                    path.display()
                ))
            })?;
        config.validate()?;
        Ok(config)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("provider_endpoint", defaults.provider_endpoint.as_str())?
            .set_default("accepted_mime_types", defaults.accepted_mime_types)?
            .set_default("max_file_size_bytes", defaults.max_file_size_bytes)?
            .set_default("min_request_interval_ms", defaults.min_request_interval_ms)?
            .set_default("request_timeout_seconds", defaults.request_timeout_seconds)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Configuration` describing the first invalid field
    pub fn validate(&self) -> DetectorResult<()> {
        self.check()?;
        Ok(())
    }

    fn check(&self) -> anyhow::Result<()> {
        ensure!(
            matches!(self.provider_endpoint.scheme(), "http" | "https"),
            "provider endpoint must use http or https, got '{}'",
            self.provider_endpoint.scheme()
        );
        ensure!(
            self.accepted_mime_types.iter().any(|m| !m.trim().is_empty()),
            "at least one accepted MIME type is required"
        );
        ensure!(
            self.max_file_size_bytes > 0,
            "max file size must be greater than 0"
        );
        ensure!(
            self.request_timeout_seconds != 0,
            "timeout must be greater than 0"
        );
        ensure!(
            self.request_timeout_seconds <= MAX_REQUEST_TIMEOUT_SECONDS,
            "timeout cannot exceed {MAX_REQUEST_TIMEOUT_SECONDS}"
        );
        Ok(())
    }

    /// Create configuration suited to tests: no pacing, no credential
    pub fn for_testing() -> Self {
        Self {
            provider_api_key: None,
            min_request_interval_ms: 0,
            request_timeout_seconds: 5,
            ..Self::default()
        }
    }

    /// Set the configured credential
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.provider_api_key = Some(api_key.into());
        self
    }

    /// Set the provider endpoint
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.provider_endpoint = endpoint;
        self
    }

    /// Set the minimum spacing between provider requests
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the payload ceiling
    pub fn with_max_file_size(mut self, max_file_size_bytes: u64) -> Self {
        self.max_file_size_bytes = max_file_size_bytes;
        self
    }

    /// Set the file backing the persisted credential
    pub fn with_credential_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_store_path = Some(path.into());
        self
    }

    /// Configured credential, if present and non-blank
    pub fn api_key(&self) -> Option<ApiKey> {
        ApiKey::parse_optional(self.provider_api_key.as_deref())
    }

    /// Minimum spacing between provider requests
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Client settings for the Hive integration
    pub fn hive_config(&self) -> HiveConfig {
        HiveConfig {
            endpoint: self.provider_endpoint.clone(),
            timeout_seconds: self.request_timeout_seconds,
        }
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_HIVE_ENDPOINT).expect("default Hive URL is valid")
}
