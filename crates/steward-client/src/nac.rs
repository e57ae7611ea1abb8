//! NAC client

use reqwest::Method;
use tracing::{info, instrument};

use crate::auth::{ClientCredentials, GrantEncoding, fetch_access_token};
use crate::constants::nac_api_path;
use crate::error::Result;
use crate::http::{HttpClientConfig, UpstreamHttpClient};

/// Configuration for the NAC client
#[derive(Clone, Debug, Default)]
pub struct NacClientConfig {
    pub http: HttpClientConfig,
    pub credentials: ClientCredentials,
}

impl NacClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClientConfig::new(base_url),
            credentials: ClientCredentials::default(),
        }
    }

    /// Set OAuth client credentials
    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.credentials = ClientCredentials::new(client_id, client_secret);
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.http = self.http.with_timeouts(connect_ms, read_ms);
        self
    }
}

#[derive(Debug, Clone)]
pub struct NacClient {
    http: UpstreamHttpClient,
    config: NacClientConfig,
}

impl NacClient {
    pub fn new(config: NacClientConfig) -> Result<Self> {
        let http = UpstreamHttpClient::new(config.http.clone())?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &NacClientConfig {
        &self.config
    }

    /// Acquire a fresh bearer token
    pub async fn access_token(&self) -> Result<String> {
        fetch_access_token(
            &self.http,
            nac_api_path::TOKEN,
            &self.config.credentials,
            GrantEncoding::Json,
        )
        .await
    }

    /// Delete the endpoint record registered for a MAC address
    #[instrument(skip(self))]
    pub async fn delete_endpoint(&self, mac_address: &str) -> Result<()> {
        let url = self
            .http
            .build_url_with_segments(nac_api_path::ENDPOINT_BY_MAC, &[mac_address])?;
        let token = self.access_token().await?;
        let builder = self.http.request_url(Method::DELETE, url).bearer_auth(token);
        self.http.send(builder).await?;
        info!("Deleted NAC endpoint {}", mac_address);
        Ok(())
    }
}
