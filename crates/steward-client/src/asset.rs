//! Asset-management client
//!
//! The asset system authenticates with a session token obtained from
//! `initSession` and released with `killSession`. Callers own the session
//! and are expected to close it on every path.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::constants::{
    APP_TOKEN_HEADER, ASSET_FIELD_ID, ASSET_FIELD_SERIAL, SESSION_TOKEN_HEADER, USER_TOKEN_SCHEME,
    asset_api_path,
};
use crate::error::{ClientError, Result};
use crate::http::{HttpClientConfig, UpstreamHttpClient};
use crate::model::{AssetRecord, AssetSearchResponse, AssetSessionResponse, AssetStateUpdate};

/// Configuration for the asset-management client
#[derive(Clone, Default)]
pub struct AssetClientConfig {
    pub http: HttpClientConfig,
    pub app_token: String,
    pub user_token: String,
}

impl AssetClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClientConfig::new(base_url),
            ..Default::default()
        }
    }

    /// Set application and user tokens
    pub fn with_tokens(mut self, app_token: &str, user_token: &str) -> Self {
        self.app_token = app_token.to_string();
        self.user_token = user_token.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.http = self.http.with_timeouts(connect_ms, read_ms);
        self
    }
}

impl std::fmt::Debug for AssetClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetClientConfig")
            .field("http", &self.http)
            .field("app_token", &"***")
            .field("user_token", &"***")
            .finish()
    }
}

/// An open asset-system session
pub struct AssetSession {
    token: String,
}

impl AssetSession {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for AssetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSession").field("token", &"***").finish()
    }
}

#[derive(Debug, Clone)]
pub struct AssetClient {
    http: UpstreamHttpClient,
    config: AssetClientConfig,
}

impl AssetClient {
    pub fn new(config: AssetClientConfig) -> Result<Self> {
        let http = UpstreamHttpClient::new(config.http.clone())?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AssetClientConfig {
        &self.config
    }

    fn with_session(&self, builder: RequestBuilder, session: &AssetSession) -> RequestBuilder {
        builder
            .header(CONTENT_TYPE, "application/json")
            .header(APP_TOKEN_HEADER, &self.config.app_token)
            .header(SESSION_TOKEN_HEADER, session.token())
    }

    /// Open a session with the configured user token
    pub async fn open_session(&self) -> Result<AssetSession> {
        let builder = self
            .http
            .request(Method::GET, asset_api_path::INIT_SESSION)
            .header(CONTENT_TYPE, "application/json")
            .header(APP_TOKEN_HEADER, &self.config.app_token)
            .header(
                AUTHORIZATION,
                format!("{} {}", USER_TOKEN_SCHEME, self.config.user_token),
            );

        let response: AssetSessionResponse = match self.http.send_json(builder).await {
            Ok(response) => response,
            Err(ClientError::Timeout) => return Err(ClientError::Timeout),
            Err(e) => {
                return Err(ClientError::Auth(format!(
                    "asset session rejected: {}",
                    e.upstream_message()
                )));
            }
        };

        match response.session_token {
            Some(token) if !token.is_empty() => {
                debug!("Opened asset session");
                Ok(AssetSession { token })
            }
            _ => Err(ClientError::Auth(
                "asset system returned no session_token".to_string(),
            )),
        }
    }

    /// Close a session; consumes it so it cannot be reused
    pub async fn kill_session(&self, session: AssetSession) -> Result<()> {
        let builder = self.with_session(
            self.http.request(Method::GET, asset_api_path::KILL_SESSION),
            &session,
        );
        match self.http.send(builder).await {
            Ok(_) => {
                debug!("Closed asset session");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to close asset session: {}", e);
                Err(e)
            }
        }
    }

    /// Computers whose serial equals `serial_number`
    #[instrument(skip(self, session))]
    pub async fn search_by_serial(
        &self,
        session: &AssetSession,
        serial_number: &str,
    ) -> Result<Vec<AssetRecord>> {
        let field = ASSET_FIELD_SERIAL.to_string();
        let id_field = ASSET_FIELD_ID.to_string();
        let value = format!("^{}$", serial_number);
        let query = [
            ("criteria[0][field]", field.as_str()),
            ("criteria[0][searchtype]", "contains"),
            ("criteria[0][value]", value.as_str()),
            ("forcedisplay[0]", id_field.as_str()),
            ("forcedisplay[1]", field.as_str()),
        ];
        let builder = self.with_session(
            self.http
                .request(Method::GET, asset_api_path::SEARCH_COMPUTER)
                .query(&query),
            session,
        );

        let response: AssetSearchResponse = self.http.send_json(builder).await?;
        let records = response.records(ASSET_FIELD_ID, ASSET_FIELD_SERIAL);
        debug!(
            total = response.totalcount,
            "Found {} asset records",
            records.len()
        );
        Ok(records)
    }

    /// Set the lifecycle state of one computer record
    #[instrument(skip(self, session))]
    pub async fn update_state(
        &self,
        session: &AssetSession,
        asset_id: i64,
        states_id: i64,
    ) -> Result<Value> {
        let id = asset_id.to_string();
        let url = self
            .http
            .build_url_with_segments(asset_api_path::COMPUTER, &[&id])?;
        let builder = self.with_session(
            self.http
                .request_url(Method::PUT, url)
                .json(&AssetStateUpdate::new(states_id)),
            session,
        );
        let value = self.http.send_value(builder).await?;
        info!("Asset {} moved to state {}", asset_id, states_id);
        Ok(value)
    }
}
