//! HTTP layer shared by all upstream clients
//!
//! Every request goes through [`UpstreamHttpClient::send`], which applies the
//! configured deadline and turns non-2xx responses into [`ClientError::Status`].

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Configuration for the HTTP layer of one upstream
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Upstream base URL (e.g. "https://example.jamfcloud.com")
    pub base_url: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Whole-request timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config for a base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }
}

/// HTTP client bound to one upstream base URL
#[derive(Debug, Clone)]
pub struct UpstreamHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl UpstreamHttpClient {
    /// Create a new HTTP client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Build full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build a URL from a fixed path followed by percent-encoded segments
    pub fn build_url_with_segments(&self, path: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.build_url(path))
            .map_err(|e| ClientError::UnexpectedResponse(format!("invalid upstream URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::UnexpectedResponse(
                    "upstream URL cannot carry path segments".to_string(),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request against a path on this upstream
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.build_url(path))
    }

    /// Start a request against a fully built URL
    pub fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request, mapping transport failures and non-2xx statuses
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Upstream request timed out: {}", e);
                ClientError::Timeout
            } else {
                warn!("Upstream request failed: {}", e);
                ClientError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), url = %response.url(), "Upstream request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "Upstream request failed");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Send a request and require one exact success status
    pub async fn send_expecting(
        &self,
        builder: RequestBuilder,
        expected: StatusCode,
    ) -> Result<Response> {
        let response = self.send(builder).await?;
        if response.status() != expected {
            return Err(ClientError::UnexpectedStatus {
                status: response.status().as_u16(),
                expected: expected.as_u16(),
            });
        }
        Ok(response)
    }

    /// Send a request and parse the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        Self::read_json(response).await
    }

    /// Send a request and return the body as untyped JSON, `Null` when empty
    pub async fn send_value(&self, builder: RequestBuilder) -> Result<serde_json::Value> {
        let response = self.send(builder).await?;
        Self::read_value(response).await
    }

    /// Parse a response body as JSON
    pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::UnexpectedResponse(format!("invalid JSON body: {}", e)))
    }

    /// Parse a possibly empty response body as untyped JSON
    pub async fn read_value(response: Response) -> Result<serde_json::Value> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::UnexpectedResponse(format!("invalid JSON body: {}", e)))
    }
}
