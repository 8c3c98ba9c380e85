//! The request path shared by every endpoint.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use luxe_core::{ProductId, RatingSummary};
use moka::future::Cache;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::instrument;

use crate::envelope::Envelope;
use crate::error::RATE_LIMIT_FALLBACK;
use crate::{ApiError, images};

/// Backend used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://backend-store-luxury-4.onrender.com";

/// Prefix of every backend endpoint.
pub(crate) const API_V1: &str = "/api/v1";

/// How long comment rating summaries stay cached.
const SUMMARY_TTL: Duration = Duration::from_secs(60);

/// How much of an error body ends up in the logs.
const LOG_BODY_CHARS: usize = 500;

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin, without the `/api/v1` prefix.
    pub base_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the REST backend.
///
/// Cheap to clone. Use [`ApiClient::with_token`] to act on behalf of a
/// visitor, or [`ApiClient::anonymous`] for public reads.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    summaries: Cache<ProductId, RatingSummary>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        let summaries = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(SUMMARY_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                summaries,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Resolve a backend image path to an absolute URL.
    #[must_use]
    pub fn image_url(&self, path: Option<&str>) -> String {
        images::image_url(&self.inner.base_url, path)
    }

    /// Requests without a bearer token.
    #[must_use]
    pub const fn anonymous(&self) -> Api<'_> {
        Api {
            client: self,
            token: None,
        }
    }

    /// Requests carrying the visitor's bearer token, when there is one.
    #[must_use]
    pub fn with_token<'a>(&'a self, token: Option<&'a str>) -> Api<'a> {
        Api {
            client: self,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub(crate) fn summaries(&self) -> &Cache<ProductId, RatingSummary> {
        &self.inner.summaries
    }

    fn connection_message(&self) -> String {
        format!(
            "خطا در اتصال به سرور. لطفاً بررسی کنید:\n1. Backend در دسترس است: {}\n2. Network connection فعال است",
            self.inner.base_url
        )
    }
}

/// A view of the client bound to one visitor's token.
#[derive(Clone, Copy)]
pub struct Api<'a> {
    client: &'a ApiClient,
    token: Option<&'a str>,
}

impl fmt::Debug for Api<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.client.inner.base_url)
            .field("token", &self.token.map(|_| "[REDACTED]"))
            .finish()
    }
}

impl<'a> Api<'a> {
    #[must_use]
    pub const fn client(&self) -> &'a ApiClient {
        self.client
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL of an endpoint; `http…` endpoints are used verbatim.
    pub(crate) fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            endpoint.to_owned()
        } else {
            format!("{}{endpoint}", self.client.inner.base_url)
        }
    }

    /// Send a JSON request and normalize the response into an envelope.
    pub(crate) async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Envelope<Value>, ApiError> {
        let value = self.send_json(method, endpoint, body).await?;
        Envelope::from_value(value)
    }

    /// Send a JSON request and return the parsed body.
    ///
    /// Non-JSON bodies come back as `{"message": <text>}`.
    #[instrument(skip(self, body), fields(method = %method))]
    pub(crate) async fn send_json(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "API request");

        let mut request = self
            .client
            .inner
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, &url))?;
        read_response(response, &url).await
    }

    /// Send a multipart request (product uploads) and normalize the response.
    #[instrument(skip(self, form), fields(method = %method))]
    pub(crate) async fn send_multipart(
        &self,
        method: Method,
        endpoint: &str,
        form: Form,
    ) -> Result<Envelope<Value>, ApiError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "API multipart request");

        let mut request = self.client.inner.http.request(method, &url).multipart(form);
        if let Some(token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, &url))?;
        Envelope::from_value(read_response(response, &url).await?)
    }

    fn transport_error(&self, error: reqwest::Error, url: &str) -> ApiError {
        if error.is_connect() || error.is_timeout() {
            tracing::error!(error = %error, %url, "Backend unreachable");
            ApiError::Network {
                message: self.client.connection_message(),
                source: error,
            }
        } else {
            tracing::error!(error = %error, %url, "Backend request failed");
            ApiError::Http(error)
        }
    }
}

async fn read_response(response: reqwest::Response, url: &str) -> Result<Value, ApiError> {
    let status = response.status();

    // Read as text first so non-JSON bodies still yield a message
    let text = response.text().await?;
    let data: Value = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": text }));

    if status.is_success() {
        return Ok(data);
    }

    let server_message = ["error", "message"].iter().find_map(|key| {
        data.get(key)
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
    });

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(%url, "Backend rate limited the request");
        return Err(ApiError::RateLimited {
            message: server_message.unwrap_or_else(|| RATE_LIMIT_FALLBACK.to_owned()),
        });
    }

    let body: String = text.chars().take(LOG_BODY_CHARS).collect();
    if status.is_server_error() {
        tracing::error!(status = %status, %url, %body, "Backend returned non-success status");
    } else {
        tracing::warn!(status = %status, %url, %body, "Backend returned non-success status");
    }

    Err(ApiError::Status {
        status: status.as_u16(),
        message: server_message
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
    })
}

/// Query string builder that only appends set values.
#[derive(Debug, Default)]
pub(crate) struct Query(Vec<(&'static str, String)>);

impl Query {
    /// Append a number when it is set and non-zero.
    pub(crate) fn number(mut self, key: &'static str, value: Option<u32>) -> Self {
        if let Some(value) = value.filter(|v| *v > 0) {
            self.0.push((key, value.to_string()));
        }
        self
    }

    /// Append text when it is set and non-empty.
    pub(crate) fn text(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push((key, value.to_owned()));
        }
        self
    }

    /// Append a boolean whenever it is set, `false` included.
    pub(crate) fn flag(mut self, key: &'static str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.0.push((key, value.to_string()));
        }
        self
    }

    pub(crate) fn build(self, path: &str) -> String {
        if self.0.is_empty() {
            return path.to_owned();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish();
        format!("{path}?{query}")
    }
}

/// Percent-encode an id for use as a path segment.
pub(crate) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_only_appends_set_values() {
        let query = Query::default()
            .number("page", Some(0))
            .number("limit", Some(12))
            .text("search", Some(""))
            .text("category", Some("روشنایی"))
            .flag("isActive", Some(false))
            .flag("featured", None)
            .build("/api/v1/products");
        assert_eq!(
            query,
            "/api/v1/products?limit=12&category=%D8%B1%D9%88%D8%B4%D9%86%D8%A7%DB%8C%DB%8C&isActive=false"
        );
        assert_eq!(Query::default().build("/x"), "/x");
    }

    #[test]
    fn test_url_prefixing() {
        let client = ApiClient::new(&ApiConfig::new("https://api.example.com/")).unwrap_or_else(|e| panic!("{e}"));
        let api = client.anonymous();
        assert_eq!(api.url("/api/v1/products"), "https://api.example.com/api/v1/products");
        assert_eq!(api.url("https://other.example.com/x"), "https://other.example.com/x");
        assert!(!client.with_token(Some("")).has_token());
        assert!(client.with_token(Some("t")).has_token());
    }
}
