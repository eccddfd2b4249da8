//! Wiki API client with builder pattern.
//!
//! Every call goes through the same pipeline: build the request against the
//! configured `api.php` endpoint, attach the cookies the jar holds for that
//! URL, send it through the [`Transport`], store any `Set-Cookie` headers
//! from the response, and turn an `error` object in the body into
//! [`NetError::Api`]. Retryable failures (dropped connections, HTTP 503,
//! `maxlag`) are retried per [`RetryConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use wikinet::client::WikiClient;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), wikinet::base::neterror::NetError> {
//! let client = WikiClient::builder("https://en.wikipedia.org/w/api.php")
//!     .user_agent("my-bot/1.0 (ops@example.org)")
//!     .timeout(Duration::from_secs(10))
//!     .maxlag(5)
//!     .build()?;
//!
//! for hit in client.search("borrow checker", 5).await? {
//!     println!("{}", hit.title);
//! }
//! # Ok(())
//! # }
//! ```

use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::retry::{parse_retry_after, should_retry, RetryConfig, RetryReason};
use crate::http::{HttpTransport, RequestBody, Transport};
use http::header::{HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use http::{Method, Request};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

/// User-Agent sent when none is configured. Wikimedia sites ask bots to
/// identify themselves; set a real contact with [`WikiClientBuilder::user_agent`].
pub const DEFAULT_USER_AGENT: &str = concat!("wikinet/", env!("CARGO_PKG_VERSION"));

/// Configuration options for [`WikiClient`].
#[derive(Debug, Clone)]
pub struct WikiClientConfig {
    /// The `api.php` endpoint.
    pub api_url: Url,

    /// User-Agent string to use for requests.
    pub user_agent: String,

    /// Per-request timeout (None to wait forever).
    pub timeout: Option<Duration>,

    /// Retry policy for transient failures.
    pub retry: RetryConfig,

    /// Sent as `maxlag`; the server answers with a retryable error while
    /// replication lag exceeds this many seconds.
    pub maxlag: Option<u32>,
}

/// Client for one wiki's Action API.
///
/// Cloning is cheap; clones share the cookie jar and therefore the login
/// session.
#[derive(Clone)]
pub struct WikiClient {
    config: Arc<WikiClientConfig>,
    transport: Arc<dyn Transport>,
    cookie_jar: Arc<Mutex<CookieJar>>,
}

impl std::fmt::Debug for WikiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiClient")
            .field("config", &self.config)
            .field("cookies", &self.jar().len())
            .finish()
    }
}

/// A failed attempt, with the server's retry hint if it sent one.
struct AttemptError {
    error: NetError,
    retry_after: Option<Duration>,
}

impl From<NetError> for AttemptError {
    fn from(error: NetError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl WikiClient {
    /// Create a client for `api_url` with default settings.
    pub fn new(api_url: &str) -> Result<Self, NetError> {
        Self::builder(api_url).build()
    }

    /// Create a new client builder.
    pub fn builder(api_url: impl Into<String>) -> WikiClientBuilder {
        WikiClientBuilder::new(api_url)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &WikiClientConfig {
        &self.config
    }

    /// Snapshot of the cookie jar.
    pub fn cookie_jar(&self) -> CookieJar {
        self.jar().clone()
    }

    /// Drop all cookies, ending any login session client-side.
    pub fn clear_cookies(&self) {
        self.jar().clear();
    }

    fn jar(&self) -> MutexGuard<'_, CookieJar> {
        self.cookie_jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Send a read request (`GET`) with the given parameters and return the
    /// decoded JSON body.
    pub async fn get<I, K, V>(&self, params: I) -> Result<Value, NetError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.call(Method::GET, collect_params(params)).await
    }

    /// Send a write request (form `POST`) with the given parameters and
    /// return the decoded JSON body.
    pub async fn post<I, K, V>(&self, params: I) -> Result<Value, NetError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.call(Method::POST, collect_params(params)).await
    }

    async fn call(&self, method: Method, params: Vec<(String, String)>) -> Result<Value, NetError> {
        let mut attempt = 0;

        loop {
            let AttemptError { error, retry_after } = match self.execute(&method, &params).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match RetryReason::from_error(&error) {
                Some(reason) if should_retry(attempt, &self.config.retry) => {
                    attempt += 1;
                    let delay = self.config.retry.delay_for(attempt, retry_after);
                    tracing::debug!(
                        ?reason,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying API request"
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => return Err(error),
            }
        }
    }

    async fn execute(
        &self,
        method: &Method,
        params: &[(String, String)],
    ) -> Result<Value, AttemptError> {
        let (request, url) = self.build_request(method, params)?;
        let origin_host = url.host_str().unwrap_or_default().to_string();

        let sending = self.transport.send(request);
        let response = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, sending)
                .await
                .map_err(|_| NetError::ConnectionTimedOut)??,
            None => sending.await?,
        };

        let stored = self
            .jar()
            .store_response_cookies(response.headers(), &origin_host);
        tracing::debug!(
            status = response.status().as_u16(),
            cookies = stored,
            "received API response"
        );

        let retry_after = parse_retry_after(response.headers());
        if !response.status().is_success() {
            return Err(AttemptError {
                error: NetError::HttpStatus {
                    status: response.status().as_u16(),
                },
                retry_after,
            });
        }

        let body: Value = response.json()?;
        if let Some(error) = body.get("error") {
            return Err(AttemptError {
                error: api_error(error),
                retry_after,
            });
        }
        log_warnings(&body);

        Ok(body)
    }

    /// Build the request for one attempt. Cookies are read from the jar
    /// here, so a retry sees cookies set by the failed attempt.
    fn build_request(
        &self,
        method: &Method,
        params: &[(String, String)],
    ) -> Result<(Request<RequestBody>, Url), NetError> {
        let mut fields = vec![
            ("format".to_string(), "json".to_string()),
            ("formatversion".to_string(), "2".to_string()),
        ];
        if let Some(maxlag) = self.config.maxlag {
            fields.push(("maxlag".to_string(), maxlag.to_string()));
        }
        fields.extend(params.iter().cloned());

        let mut url = self.config.api_url.clone();
        let body = if method == Method::GET {
            url.query_pairs_mut().extend_pairs(fields.iter());
            RequestBody::Empty
        } else {
            RequestBody::Form(fields)
        };

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(cookie_value) = self.jar().cookie_header_value(&url) {
            let cookie_value = HeaderValue::from_bytes(cookie_value.as_bytes()).map_err(|_| {
                NetError::invalid_parameter("cookie", "stored cookie is not a valid header value")
            })?;
            builder = builder.header(COOKIE, cookie_value);
        }

        // The remaining parts were validated when the client was built.
        let request = builder.body(body).map_err(|_| NetError::InvalidUrl)?;
        Ok((request, url))
    }
}

fn collect_params<I, K, V>(params: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn api_error(error: &Value) -> NetError {
    let field = |name: &str| {
        error
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    NetError::Api {
        code: field("code"),
        info: field("info"),
    }
}

fn log_warnings(body: &Value) {
    let Some(warnings) = body.get("warnings").and_then(Value::as_object) else {
        return;
    };
    for (module, warning) in warnings {
        let text = warning
            .get("warnings")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| warning.to_string());
        tracing::warn!(module = %module, warning = %text, "API warning");
    }
}

/// Builder for creating a [`WikiClient`].
pub struct WikiClientBuilder {
    api_url: String,
    user_agent: String,
    timeout: Option<Duration>,
    retry: RetryConfig,
    maxlag: Option<u32>,
    transport: Option<Arc<dyn Transport>>,
    cookie_jar: Option<CookieJar>,
}

impl WikiClientBuilder {
    fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(30)),
            retry: RetryConfig::default(),
            maxlag: None,
            transport: None,
            cookie_jar: None,
        }
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for responses without a timeout.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the retry policy.
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Send `maxlag` with every request.
    pub fn maxlag(mut self, seconds: u32) -> Self {
        self.maxlag = Some(seconds);
        self
    }

    /// Use a custom transport instead of [`HttpTransport`].
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        self.transport = Some(transport);
        self
    }

    /// Start from a pre-populated cookie jar.
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<WikiClient, NetError> {
        let api_url = Url::parse(&self.api_url)?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(NetError::DisallowedUrlScheme);
        }
        if api_url.host_str().is_none() {
            return Err(NetError::InvalidUrl);
        }
        HeaderValue::from_str(&self.user_agent)
            .map_err(|_| NetError::invalid_parameter("user_agent", "not a valid header value"))?;

        let config = WikiClientConfig {
            api_url,
            user_agent: self.user_agent,
            timeout: self.timeout,
            retry: self.retry,
            maxlag: self.maxlag,
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()),
        };

        Ok(WikiClient {
            config: Arc::new(config),
            transport,
            cookie_jar: Arc::new(Mutex::new(self.cookie_jar.unwrap_or_default())),
        })
    }
}
