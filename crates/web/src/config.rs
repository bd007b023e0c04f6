//! Front-end configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PUBLIC_API_URL` - Base URL of the remote API (e.g., `https://api.example.com`)
//!
//! ## Optional
//! - `WEB_HOST` - Bind address (default: 127.0.0.1)
//! - `WEB_PORT` - Listen port (default: 3000)
//! - `WEB_BASE_URL` - Public URL of this site (default: <http://localhost:3000>).
//!   An `https://` base URL marks the session cookie `Secure`.
//! - `API_TIMEOUT_SECS` - Upper bound for every remote API call (default: 10)
//! - `LISTING_CACHE_TTL_SECS` - Professional listing cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LISTING_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Front-end application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Base URL of the remote API, without a trailing slash
    pub api_url: Url,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this site
    pub base_url: String,
    /// Upper bound for a single remote API call
    pub api_timeout: Duration,
    /// How long professional listings stay cached
    pub listing_cache_ttl: Duration,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
///
/// Implements `Debug` manually to redact the DSN.
#[derive(Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<SecretString>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .finish()
    }
}

impl WebConfig {
    /// Configuration with defaults for everything except the API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            listing_cache_ttl: Duration::from_secs(DEFAULT_LISTING_CACHE_TTL_SECS),
            sentry: SentryConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_api_url =
            lookup("PUBLIC_API_URL").ok_or_else(|| missing("PUBLIC_API_URL"))?;
        let api_url = parse_api_url(&raw_api_url)?;

        let host = parse_or(&lookup, "WEB_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&lookup, "WEB_PORT", 3000_u16)?;
        let base_url = lookup("WEB_BASE_URL")
            .map_or_else(|| "http://localhost:3000".to_string(), |v| v.trim_end_matches('/').to_string());

        let timeout_secs = parse_or(&lookup, "API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "API_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let ttl_secs = parse_or(&lookup, "LISTING_CACHE_TTL_SECS", DEFAULT_LISTING_CACHE_TTL_SECS)?;

        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN").map(SecretString::from),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate(&lookup, "SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: parse_rate(&lookup, "SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            api_timeout: Duration::from_secs(timeout_secs),
            listing_cache_ttl: Duration::from_secs(ttl_secs),
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (production).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingEnvVar(key.to_string())
}

/// Parse the API base URL, dropping any trailing slash so paths can be appended.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PUBLIC_API_URL".to_string(), reason);

    let url = Url::parse(raw.trim().trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Parse an optional variable, falling back to a default when unset.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a sample rate that must lie in 0.0..=1.0.
fn parse_rate<F>(lookup: &F, key: &str, default: f32) -> Result<f32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let rate = parse_or(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0-1.0"),
        ))
    }
}
