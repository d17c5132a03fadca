//! CircleCI API client.
//!
//! Low-level HTTP client that handles authentication, debug logging and
//! response classification. Typed operations live next to the models they
//! return.

use std::env;
use std::fmt;
use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, CircleCiError, Result};
use crate::logger::{dump_request, dump_response, redact_url, DebugLogger, TracingLogger};

/// Default CircleCI v1.1 endpoint.
pub const DEFAULT_API_URL: &str = "https://circleci.com/api/v1.1/";

/// Query parameter carrying the API token on every request.
pub(crate) const TOKEN_PARAM: &str = "circle-token";

const USER_AGENT: &str = concat!("circleci-project/", env!("CARGO_PKG_VERSION"));
const JSON: &str = "application/json";

/// Low-level CircleCI API client.
///
/// Every call is a single request/response round trip: nothing is cached and
/// nothing is retried. Timeouts are whatever the underlying
/// [`reqwest::Client`] enforces.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use circleci_project::CircleCiClient;
///
/// # fn example() -> circleci_project::Result<()> {
/// // Create from environment variables
/// let client = CircleCiClient::from_env()?;
///
/// // Or configure manually
/// let client = CircleCiClient::builder("your-token")
///     .base_url("https://circleci.com/api/v1.1/")
///     .debug(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CircleCiClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
    debug: bool,
    logger: Arc<dyn DebugLogger>,
}

impl fmt::Debug for CircleCiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircleCiClient")
            .field("base_url", &self.base_url.as_str())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CircleCiClient`].
pub struct ClientBuilder {
    token: String,
    base_url: String,
    http: Option<Client>,
    debug: bool,
    logger: Option<Arc<dyn DebugLogger>>,
}

impl ClientBuilder {
    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS settings).
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Enable dumping of every request and response.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Send debug dumps to `logger` instead of `tracing`.
    pub fn logger(mut self, logger: impl DebugLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the default HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<CircleCiClient> {
        // Ensure base URL ends with / so joins stay under the version prefix
        let base_url_str = if self.base_url.ends_with('/') {
            self.base_url
        } else {
            format!("{}/", self.base_url)
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = match self.http {
            Some(http) => http,
            None => Client::builder()
                .user_agent(USER_AGENT)
                .brotli(true)
                .gzip(true)
                .deflate(true)
                .build()
                .map_err(CircleCiError::HttpError)?,
        };

        Ok(CircleCiClient {
            http,
            base_url: Arc::new(base_url),
            token: self.token,
            debug: self.debug,
            logger: self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
        })
    }
}

impl CircleCiClient {
    /// Create a client from environment variables.
    ///
    /// Uses `CIRCLECI_API_TOKEN` for authentication, optionally
    /// `CIRCLECI_API_URL` for the base URL and `CIRCLECI_DEBUG` (`1` or
    /// `true`) to enable request dumps.
    ///
    /// # Errors
    ///
    /// Returns an error if `CIRCLECI_API_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("CIRCLECI_API_TOKEN").map_err(|_| {
            CircleCiError::ConfigMissing(
                "CIRCLECI_API_TOKEN environment variable not set".to_string(),
            )
        })?;

        let base_url = env::var("CIRCLECI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let debug = env::var("CIRCLECI_DEBUG")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self::builder(&token).base_url(base_url).debug(debug).build()
    }

    /// Create a new client with the provided token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::builder(token).base_url(base_url).build()
    }

    /// Start building a client against the default endpoint.
    pub fn builder(token: &str) -> ClientBuilder {
        ClientBuilder {
            token: token.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            http: None,
            debug: false,
            logger: None,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether request/response dumps are enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Make a GET request and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::GET, path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Make a POST request with a JSON body and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let body = self.send(Method::POST, path, Some(payload)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Make a POST request without a body and decode the JSON response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::POST, path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Make a PUT request with a JSON body, discarding the response body.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let payload = serde_json::to_vec(body)?;
        self.send(Method::PUT, path, Some(payload)).await?;
        Ok(())
    }

    /// Make a DELETE request, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send one request and return the body of a successful response.
    async fn send(&self, method: Method, path: &str, payload: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let url = self.base_url.join(path)?;
        self.debug_log(|| format!("building request for {}", redact_url(&url)));

        let mut builder = self
            .http
            .request(method, url)
            .query(&[(TOKEN_PARAM, self.token.as_str())])
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }
        let request = builder.build()?;

        self.debug_log(|| format!("request:\n{}", dump_request(&request)));

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();

        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(err) if status.as_u16() >= 300 => {
                return Err(ApiError::with_message(
                    status.as_u16(),
                    format!("unable to parse response: {err}"),
                )
                .into());
            }
            Err(err) => return Err(CircleCiError::HttpError(err)),
        };

        self.debug_log(|| format!("response:\n{}", dump_response(status, &headers, &body)));

        check_status(status.as_u16(), &body)?;
        Ok(body)
    }

    fn debug_log(&self, message: impl FnOnce() -> String) {
        if self.debug {
            self.logger.log(&message());
        }
    }
}

/// Shape of CircleCI error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Classify a response: any status >= 300 is an error.
pub(crate) fn check_status(status: u16, body: &[u8]) -> core::result::Result<(), ApiError> {
    if status < 300 {
        return Ok(());
    }

    if body.is_empty() {
        return Err(ApiError::status(status));
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => Err(ApiError {
            status_code: status,
            message: parsed.message,
        }),
        Err(err) => Err(ApiError::with_message(
            status,
            format!("unable to parse API response: {err}"),
        )),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
