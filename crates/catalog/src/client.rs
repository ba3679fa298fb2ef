//! Pooled catalog client and the resilient fetch loop

use crate::config::{CatalogConfig, API_KEY_VAR};
use crate::endpoints::MoviesApi;
use crate::error::{CatalogError, CatalogResult};
use crate::query::UpstreamQueryParams;
use cinefeed_core::retry::Backoff;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT,
};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Credential header expected by the upstream
const API_KEY_HEADER: &str = "x-api-key";

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Catalog client with built-in resilience
///
/// One instance is built at startup and cloned into every request handler;
/// clones share the connection pool and the in-flight limit.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Client,
    config: Arc<CatalogConfig>,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("config", &self.config)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

/// Final upstream answer handed to the classifier
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status of the last attempt
    pub status: u16,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Raw body text
    pub body: String,
    /// Wall-clock time across all attempts and waits
    pub elapsed: Duration,
    /// Attempts made, including the one that produced this response
    pub attempts: u32,
    /// Backoff waits slept between attempts, in order
    pub backoffs: Vec<Duration>,
}

impl UpstreamResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport failure on the final attempt
#[derive(Debug, Error)]
#[error("transport failed after {attempts} attempt(s): {source}")]
pub struct FetchError {
    /// Attempts made
    pub attempts: u32,
    /// Backoff waits slept between attempts, in order
    pub backoffs: Vec<Duration>,
    /// Wall-clock time across all attempts and waits
    pub elapsed: Duration,
    /// Last transport error
    #[source]
    pub source: reqwest::Error,
}

impl From<FetchError> for CatalogError {
    fn from(err: FetchError) -> Self {
        CatalogError::network(err.attempts, &err.source.to_string())
    }
}

/// Outcome of one attempt that got as far as a full response
struct RawResponse {
    status: u16,
    content_type: Option<String>,
    body: String,
}

/// Retry bookkeeping for one logical fetch
struct FetchAttemptState {
    attempt_number: u32,
    backoff: Backoff,
    waits: Vec<Duration>,
    started: Instant,
}

impl FetchAttemptState {
    fn new(client: &CatalogClient) -> Self {
        Self {
            attempt_number: 0,
            backoff: Backoff::new(&client.config.retry),
            waits: Vec::new(),
            started: Instant::now(),
        }
    }

    fn respond(self, raw: RawResponse) -> UpstreamResponse {
        UpstreamResponse {
            status: raw.status,
            content_type: raw.content_type,
            body: raw.body,
            elapsed: self.started.elapsed(),
            attempts: self.attempt_number,
            backoffs: self.waits,
        }
    }

    fn fail(self, source: reqwest::Error) -> FetchError {
        FetchError {
            attempts: self.attempt_number,
            backoffs: self.waits,
            elapsed: self.started.elapsed(),
            source,
        }
    }
}

impl CatalogClient {
    /// Create a new client with configuration from environment
    pub fn new() -> CatalogResult<Self> {
        let config = CatalogConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;

        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            CatalogError::config(format!("{API_KEY_VAR} contains characters not allowed in a header"))
        })?;
        api_key.set_sensitive(true);

        let accept_language = HeaderValue::from_str(&config.accept_language)
            .map_err(|_| CatalogError::config("accept_language is not a valid header value"))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT_LANGUAGE, accept_language);
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("cinefeed/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .default_headers(default_headers)
            .build()?;

        let permits = Arc::new(Semaphore::new(config.pool.max_connections));

        Ok(Self {
            inner,
            config: Arc::new(config),
            permits,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Access movie listing operations
    #[must_use]
    pub fn movies(&self) -> MoviesApi {
        MoviesApi::new(self.clone())
    }

    /// Execute one logical upstream GET with bounded retries
    ///
    /// Transport failures and 5xx responses are retried after an
    /// exponentially growing wait; any other status returns at once. When the
    /// budget runs out, a final 5xx is returned as a response and a final
    /// transport failure as a [`FetchError`].
    #[instrument(skip(self, params), fields(request_id))]
    pub async fn fetch(&self, params: &UpstreamQueryParams) -> Result<UpstreamResponse, FetchError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut state = FetchAttemptState::new(self);

        loop {
            state.attempt_number += 1;
            let attempt = state.attempt_number;
            let last_attempt = attempt >= max_attempts;

            let start = Instant::now();
            let result = self.execute_single_request(&request_id, params).await;
            let elapsed = start.elapsed();

            match result {
                Ok(raw) if raw.status < 500 || last_attempt => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt,
                        status = raw.status,
                        elapsed_ms = elapsed.as_millis(),
                        "Upstream answered"
                    );
                    return Ok(state.respond(raw));
                }
                Ok(raw) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt,
                        status = raw.status,
                        "Upstream server error, will retry"
                    );
                }
                Err(e) if last_attempt => {
                    warn!(
                        request_id = %request_id,
                        attempt = attempt,
                        error = %e,
                        "Transport failed, giving up"
                    );
                    return Err(state.fail(e));
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt,
                        error = %e,
                        "Transport failed, will retry"
                    );
                }
            }

            let delay = state.backoff.next_delay();
            state.waits.push(delay);
            debug!(
                request_id = %request_id,
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retrying after delay"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Execute a single attempt, reading the whole body
    async fn execute_single_request(
        &self,
        request_id: &str,
        params: &UpstreamQueryParams,
    ) -> Result<RawResponse, reqwest::Error> {
        // A closed semaphore only happens at shutdown; proceed unbounded then.
        let _permit = self.permits.acquire().await.ok();

        let response = self
            .inner
            .get(&self.config.base_url)
            .query(params)
            .header(X_REQUEST_ID, request_id)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(header_text);
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Header value as text; invalid bytes become U+FFFD instead of dropping the value
fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}
