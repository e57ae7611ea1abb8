//! Credential acquisition
//!
//! The MDM and NAC systems both issue bearer tokens through an OAuth2
//! client-credentials grant; they differ only in how the grant is encoded.
//! No token is cached: every logical call acquires a fresh one.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::http::UpstreamHttpClient;

/// OAuth2 client identity
#[derive(Clone, Default)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// How the grant body is sent to the token endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantEncoding {
    /// `application/x-www-form-urlencoded`
    Form,
    /// `application/json`
    Json,
}

#[derive(Serialize)]
struct ClientCredentialsGrant<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Acquire a bearer token with a client-credentials grant.
///
/// Any rejection by the token endpoint (non-2xx status, missing token,
/// unreadable body) is reported as [`ClientError::Auth`]; only a deadline
/// expiry keeps its own [`ClientError::Timeout`] variant.
pub async fn fetch_access_token(
    http: &UpstreamHttpClient,
    token_path: &str,
    credentials: &ClientCredentials,
    encoding: GrantEncoding,
) -> Result<String> {
    let grant = ClientCredentialsGrant {
        grant_type: "client_credentials",
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
    };

    let builder = http.request(Method::POST, token_path);
    let builder = match encoding {
        GrantEncoding::Form => builder.form(&grant),
        GrantEncoding::Json => builder.json(&grant),
    };

    let response: TokenResponse = match http.send_json(builder).await {
        Ok(response) => response,
        Err(ClientError::Timeout) => return Err(ClientError::Timeout),
        Err(ClientError::Status { status, body }) => {
            return Err(ClientError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }
        Err(e) => return Err(ClientError::Auth(e.to_string())),
    };

    match response.access_token {
        Some(token) if !token.is_empty() => {
            debug!(
                expires_in = response.expires_in.unwrap_or_default(),
                "Acquired access token from {}", token_path
            );
            Ok(token)
        }
        _ => Err(ClientError::Auth(
            "token endpoint returned no access_token".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = ClientCredentials::new("steward", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("steward"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_grant_form_encoding() {
        let grant = ClientCredentialsGrant {
            grant_type: "client_credentials",
            client_id: "id",
            client_secret: "secret",
        };
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["grant_type"], "client_credentials");
        assert_eq!(json["client_id"], "id");
    }
}
