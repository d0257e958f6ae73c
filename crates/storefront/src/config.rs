//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `LIFESTYLE_API_BASE_URL` - REST backend base URL
//!   (default: `https://lifestyle-store-backend-production.up.railway.app/api`)
//! - `LIFESTYLE_DATA_DIR` - Directory holding the persisted cart and session
//!   (default: `.lifestyle-store`)
//! - `LIFESTYLE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `LIFESTYLE_CATALOG_CACHE_TTL_SECS` - Product/category cache TTL (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://lifestyle-store-backend-production.up.railway.app/api";
const DEFAULT_DATA_DIR: &str = ".lifestyle-store";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Full client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST backend settings
    pub api: ApiConfig,
    /// Profile directory for the file store
    pub data_dir: PathBuf,
}

/// REST backend settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// How long catalog responses are cached
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// Settings for a backend at `base_url`, with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        })
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url(
            "LIFESTYLE_API_BASE_URL",
            &get("LIFESTYLE_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let request_timeout = parse_secs(
            "LIFESTYLE_REQUEST_TIMEOUT_SECS",
            &get(
                "LIFESTYLE_REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            ),
        )?;
        let catalog_cache_ttl = parse_secs(
            "LIFESTYLE_CATALOG_CACHE_TTL_SECS",
            &get(
                "LIFESTYLE_CATALOG_CACHE_TTL_SECS",
                &DEFAULT_CATALOG_CACHE_TTL_SECS.to_string(),
            ),
        )?;
        let data_dir = get("LIFESTYLE_DATA_DIR", DEFAULT_DATA_DIR);
        if data_dir.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "LIFESTYLE_DATA_DIR".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout,
                catalog_cache_ttl,
            },
            data_dir: PathBuf::from(data_dir),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate a base URL.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "not a base URL".to_string(),
        ));
    }
    Ok(url)
}

/// Parse a positive number of seconds.
fn parse_secs(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string())),
    }
}
