//! Configuration for the HeyGen server.
//!
//! Settings come from command-line flags, environment variables and an
//! optional `.env` file. Only the API key is required.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use adk_rust_mcp_common::error::ConfigError;

/// Environment variable holding the HeyGen API key.
pub const API_KEY_ENV: &str = "HEYGEN_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "HEYGEN_BASE_URL";
/// Environment variable for the per-request timeout of JSON calls, in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "HEYGEN_REQUEST_TIMEOUT_SECS";
/// Environment variable for the timeout of video downloads, in seconds.
pub const DOWNLOAD_TIMEOUT_ENV: &str = "HEYGEN_DOWNLOAD_TIMEOUT_SECS";
/// Environment variable overriding the default download directory.
pub const DOWNLOAD_DIR_ENV: &str = "HEYGEN_DOWNLOAD_DIR";

/// Production HeyGen API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.heygen.com";
/// Default timeout for JSON API calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Subdirectory of the system temp dir used for downloads.
pub const DOWNLOAD_SUBDIR: &str = "heygen_videos";

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// HeyGen API key (required)
    pub api_key: String,
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Timeout applied to every JSON API call
    pub request_timeout: Duration,
    /// Timeout applied to video downloads; `None` waits as long as the transfer runs
    pub download_timeout: Option<Duration>,
    /// Directory for downloads when the caller gives no path
    pub download_dir: PathBuf,
}

impl Config {
    /// Create a configuration with the given key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            download_timeout: None,
            download_dir: default_download_dir(),
        }
    }

    /// Point the client at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different default download directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Load configuration from the process environment and `.env` file.
    ///
    /// An explicit `api_key` (from `--api-key`) takes precedence over
    /// `HEYGEN_API_KEY`.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if no API key can be resolved, or
    /// `ConfigError::InvalidValue` if a numeric setting does not parse.
    pub fn load(api_key: Option<String>) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(api_key, |name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(api_key: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key
            .or_else(|| lookup(API_KEY_ENV))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::missing_env_var(API_KEY_ENV))?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::invalid_value(
                    BASE_URL_ENV,
                    format!("expected an http(s) URL, got '{}'", base_url),
                ));
            }
            config = config.with_base_url(base_url);
        }

        if let Some(secs) = parse_secs(&lookup, REQUEST_TIMEOUT_ENV)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.download_timeout = parse_secs(&lookup, DOWNLOAD_TIMEOUT_ENV)?.map(Duration::from_secs);

        if let Some(dir) = lookup(DOWNLOAD_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.download_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

// The key must never end up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("download_timeout", &self.download_timeout)
            .field("download_dir", &self.download_dir)
            .finish()
    }
}

/// `<system temp>/heygen_videos`.
pub fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join(DOWNLOAD_SUBDIR)
}

fn parse_secs<F>(lookup: &F, name: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(ConfigError::invalid_value(name, "timeout must be at least 1 second")),
            Ok(secs) => Ok(Some(secs)),
            Err(e) => Err(ConfigError::invalid_value(name, format!("'{}': {}", raw, e))),
        },
    }
}
