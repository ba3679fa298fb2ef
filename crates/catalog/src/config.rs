//! Configuration for the movie catalog client
//!
//! Built once at process start (usually via [`CatalogConfig::from_env`]) and
//! shared read-only by every request.

use crate::error::{CatalogError, CatalogResult};
use cinefeed_core::retry::RetryConfig;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default kinopoisk.dev movie search endpoint
pub const DEFAULT_API_URL: &str = "https://api.kinopoisk.dev/v1.4/movie";

/// Environment variable holding the upstream credential
pub const API_KEY_VAR: &str = "KINOPOISK_API_KEY";
/// Environment variable overriding the upstream endpoint
pub const API_URL_VAR: &str = "CINEFEED_API_URL";
/// Environment variable overriding `Accept-Language`
pub const ACCEPT_LANGUAGE_VAR: &str = "CINEFEED_ACCEPT_LANGUAGE";
/// Environment variable for the per-attempt timeout, in seconds
pub const TIMEOUT_VAR: &str = "CINEFEED_TIMEOUT_SECS";
/// Environment variable for the connect timeout, in seconds
pub const CONNECT_TIMEOUT_VAR: &str = "CINEFEED_CONNECT_TIMEOUT_SECS";
/// Environment variable for the attempt budget
pub const MAX_ATTEMPTS_VAR: &str = "CINEFEED_MAX_ATTEMPTS";
/// Environment variable bounding concurrent upstream attempts
pub const MAX_CONNECTIONS_VAR: &str = "CINEFEED_MAX_CONNECTIONS";
/// Environment variable bounding idle keepalive connections
pub const MAX_IDLE_VAR: &str = "CINEFEED_MAX_IDLE_PER_HOST";

/// Outbound connection pool limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum upstream attempts in flight across all requests
    pub max_connections: usize,
    /// Maximum idle keepalive connections kept per host
    pub max_idle_per_host: usize,
    /// How long an idle connection is kept before being closed
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// Client configuration
#[derive(Clone)]
pub struct CatalogConfig {
    /// Upstream movie search endpoint
    pub base_url: String,
    /// Upstream credential sent as `X-API-KEY`
    pub api_key: String,
    /// `Accept-Language` hint for localized metadata
    pub accept_language: String,
    /// Overall timeout for one attempt
    pub timeout: Duration,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Retry and backoff policy
    pub retry: RetryConfig,
    /// Connection pool limits
    pub pool: PoolConfig,
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("accept_language", &self.accept_language)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry", &self.retry)
            .field("pool", &self.pool)
            .finish()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            accept_language: "ru".to_string(),
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `KINOPOISK_API_KEY`: upstream credential (required)
    /// - `CINEFEED_API_URL`: upstream endpoint
    /// - `CINEFEED_ACCEPT_LANGUAGE`: `Accept-Language` header value
    /// - `CINEFEED_TIMEOUT_SECS` / `CINEFEED_CONNECT_TIMEOUT_SECS`: timeouts
    /// - `CINEFEED_MAX_ATTEMPTS`: attempt budget
    /// - `CINEFEED_MAX_CONNECTIONS` / `CINEFEED_MAX_IDLE_PER_HOST`: pool limits
    pub fn from_env() -> CatalogResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> CatalogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = var(API_KEY_VAR).ok_or_else(|| CatalogError::missing_env(API_KEY_VAR))?;
        let mut config = Self::default().with_api_key(api_key);

        if let Some(url) = var(API_URL_VAR) {
            config.base_url = url;
        }
        if let Some(language) = var(ACCEPT_LANGUAGE_VAR) {
            config.accept_language = language;
        }
        if let Some(secs) = parse_var::<u64>(TIMEOUT_VAR, var(TIMEOUT_VAR))? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(CONNECT_TIMEOUT_VAR, var(CONNECT_TIMEOUT_VAR))? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_var::<u32>(MAX_ATTEMPTS_VAR, var(MAX_ATTEMPTS_VAR))? {
            config.retry.max_attempts = attempts;
        }
        if let Some(max) = parse_var::<usize>(MAX_CONNECTIONS_VAR, var(MAX_CONNECTIONS_VAR))? {
            config.pool.max_connections = max;
        }
        if let Some(idle) = parse_var::<usize>(MAX_IDLE_VAR, var(MAX_IDLE_VAR))? {
            config.pool.max_idle_per_host = idle;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the upstream endpoint
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the upstream credential
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Builder-style method to set the per-attempt timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the connect timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set pool limits
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Upper bound on wall-clock time spent in one logical fetch
    #[must_use]
    pub fn worst_case_fetch_time(&self) -> Duration {
        self.retry.worst_case_duration(self.timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CatalogResult<()> {
        if self.base_url.is_empty() {
            return Err(CatalogError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CatalogError::config(
                "base_url must start with http:// or https://",
            ));
        }

        if self.api_key.trim().is_empty() {
            return Err(CatalogError::missing_env(API_KEY_VAR));
        }

        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(CatalogError::config("timeouts cannot be zero"));
        }

        if self.connect_timeout > self.timeout {
            return Err(CatalogError::config(
                "connect_timeout cannot exceed the overall timeout",
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(CatalogError::config("max_attempts must be at least 1"));
        }

        if self.pool.max_connections == 0 {
            return Err(CatalogError::config("max_connections must be at least 1"));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> CatalogResult<Option<T>> {
    raw.map(|value| {
        value
            .parse()
            .map_err(|_| CatalogError::config(format!("{name} has an invalid value: {value:?}")))
    })
    .transpose()
}
