use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use inkstat_domain::{ApiError, HttpConfig, InkstatError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client as ReqwestClient, Method};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::errors::conversions::{classify_status, classify_transport};
use crate::errors::InfraError;
use crate::storage::SessionCookieJar;

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// One request to the provider.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), body: RequestBody::Empty }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach `Authorization: Bearer <token>`.
    ///
    /// # Errors
    /// Returns [`ApiError::RequestParameter`] if the token contains bytes
    /// not allowed in a header.
    pub fn bearer(mut self, token: &str) -> Result<Self, ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::RequestParameter)?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body =
            RequestBody::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    fn is_idempotent(&self) -> bool {
        matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
    }
}

/// Decode a JSON response body.
///
/// # Errors
/// Returns [`ApiError::UnknownApi`] describing the malformed body.
pub fn decode_json<T: DeserializeOwned>(body: &[u8], context: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::malformed(context, err))
}

/// HTTP client that classifies every failure into an [`ApiError`].
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_attempts", &self.max_attempts)
            .field("base_backoff", &self.base_backoff)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from [`HttpConfig`] without a cookie store.
    ///
    /// # Errors
    /// Returns a configuration error if the TLS backend cannot be initialized.
    pub fn from_config(config: &HttpConfig) -> Result<Self, InkstatError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .max_attempts(config.max_attempts as usize)
            .build()
    }

    /// Send the request and return the body of a 2xx response.
    ///
    /// Only idempotent requests are retried, and only when more than one
    /// attempt is configured.
    ///
    /// # Errors
    /// - [`ApiError::Transport`] when no response arrived
    /// - [`ApiError::Authorization`] for 403
    /// - [`ApiError::RequestParameter`] for 400
    /// - [`ApiError::UnknownApi`] for any other non-2xx status
    pub async fn send(&self, request: ApiRequest) -> Result<Bytes, ApiError> {
        let attempts = if request.is_idempotent() { self.max_attempts.max(1) } else { 1 };
        let method = request.method.clone();
        let url = request.url.clone();

        for attempt in 0..attempts {
            let last_attempt = attempt + 1 == attempts;
            debug!(attempt = attempt + 1, %method, url = %url.path(), "sending HTTP request");

            match self.build(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, url = %url.path(), %status, "received HTTP response");

                    if status.is_server_error() && !last_attempt {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(classify_status(status.as_u16(), status.canonical_reason()));
                    }

                    return response.bytes().await.map_err(|err| classify_transport(&err));
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, url = %url.path(), error = %err, "HTTP request failed");

                    if !last_attempt && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(classify_transport(&err));
                }
            }
        }

        Err(ApiError::Transport("http client exhausted retries without producing a result".into()))
    }

    fn build(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(fields) => builder.form(fields),
        }
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    cookie_store: Option<Arc<SessionCookieJar>>,
}

impl std::fmt::Debug for HttpClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientBuilder")
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("user_agent", &self.user_agent)
            .field("cookies", &self.cookie_store.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            default_headers: None,
            cookie_store: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries) for
    /// idempotent requests.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Share a cookie store across requests. Without one the client keeps
    /// no cookies at all.
    pub fn cookie_store(mut self, store: Arc<SessionCookieJar>) -> Self {
        self.cookie_store = Some(store);
        self
    }

    /// # Errors
    /// Returns a configuration error if the underlying client cannot be built.
    pub fn build(self) -> Result<HttpClient, InkstatError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        if let Some(store) = self.cookie_store {
            builder = builder.cookie_provider(store);
        }

        let client = builder.build().map_err(|err| InkstatError::from(InfraError::from(err)))?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}
