//! Reqwest-backed gateway to the bike-share API.
//!
//! Every call shares one base URL, a bounded timeout, a JSON content type
//! and a cookie store. Requests and responses are logged at `debug`;
//! failures at `warn`. Logging never changes a call's outcome, and nothing
//! here retries: retry policy belongs to callers.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ApiError;

/// Default base URL when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters for a `GET`.
pub type Params<'a> = &'a [(&'a str, String)];

/// Raw JSON transport to the remote service.
///
/// This is the seam tests substitute: the typed [`BikeApi`](super::BikeApi)
/// and everything above it only see this trait.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET {base}{path}?{params}`.
    async fn get(&self, path: &str, params: Params<'_>) -> Result<Value, ApiError>;

    /// `POST {base}{path}` with an optional JSON body.
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError>;
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a config pointing at the local default server.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the bike-share API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Base URL every request is issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a send result into JSON or an [`ApiError`], logging either way.
    async fn finish(
        &self,
        method: &'static str,
        url: &str,
        started: Instant,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<Value, ApiError> {
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from(e);
                warn!(method, url, error = %err, "api request failed");
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.text().await?;
        debug!(
            method,
            url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "api response"
        );

        if !status.is_success() {
            let message = server_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            warn!(method, url, status = status.as_u16(), %message, "api error status");
            return Err(ApiError::http(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            let err = ApiError::validation(format!("malformed JSON: {e}"));
            warn!(method, url, error = %err, "api response rejected");
            err
        })
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn get(&self, path: &str, params: Params<'_>) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(method = "GET", %url, ?params, "api request");
        let started = Instant::now();
        let sent = self.http.get(&url).query(params).send().await;
        self.finish("GET", &url, started, sent).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(method = "POST", %url, body = ?body, "api request");
        let started = Instant::now();
        let mut request = self.http.post(&url);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let sent = request.send().await;
        self.finish("POST", &url, started, sent).await
    }
}

/// Pull the `message` field out of an error envelope, if there is one.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
