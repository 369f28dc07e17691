//! OAuth refresh-token exchange.
//!
//! This tool never runs an interactive consent flow. It holds a long-lived refresh token in its
//! credentials file and exchanges it for short-lived access tokens against the drive's token
//! endpoint, re-exchanging shortly before expiry.

use crate::{utils, Result};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token";
const TOKEN_SCOPE: &str = "Files.ReadWrite Files.Read.All User.Read offline_access";

/// Exchange the token this many minutes before it would expire.
const EXPIRY_BUFFER_MINUTES: i64 = 5;

/// The token exchange came back without an access token. The endpoint gives no fixed error
/// schema, so the raw response body is carried for the user to inspect.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AuthError {
    body: String,
}

impl AuthError {
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The token response did not contain an access token. Raw response: {}",
            self.body
        )
    }
}

impl std::error::Error for AuthError {}

/// Represents the structure of the `credentials.json` file in the secrets directory.
///
/// Example:
/// ```json
/// {
///   "client_id": "00000000-0000-0000-0000-000000000000",
///   "client_secret": "YOUR_CLIENT_SECRET",
///   "refresh_token": "M.C519_BAY...",
///   "redirect_uri": "http://localhost"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct CredentialsFile {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    redirect_uri: String,

    /// Token endpoint override. Absent in normal use; points exchange at a stand-in server in
    /// tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    token_endpoint: Option<String>,
}

impl CredentialsFile {
    pub(crate) async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path)
            .await
            .context("Unable to read the credentials file")
    }

    fn token_endpoint(&self) -> &str {
        self.token_endpoint.as_deref().unwrap_or(TOKEN_ENDPOINT)
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        let buffer = Duration::minutes(EXPIRY_BUFFER_MINUTES);
        self.expires_at <= Utc::now() + buffer
    }
}

/// Produces valid access tokens, exchanging the refresh token when the cached one is missing or
/// about to expire.
pub struct TokenProvider {
    credentials: CredentialsFile,
    http: reqwest::Client,
    cached: Option<CachedToken>,
}

impl TokenProvider {
    /// Loads the credentials file and returns a provider with no token cached yet.
    pub async fn load(path: &Path) -> Result<Self> {
        let credentials = CredentialsFile::load(path).await?;
        Ok(Self::new(credentials))
    }

    pub(crate) fn new(credentials: CredentialsFile) -> Self {
        Self {
            credentials,
            http: reqwest::Client::new(),
            cached: None,
        }
    }

    /// Returns a valid access token, exchanging the refresh token first if needed.
    pub async fn token_with_refresh(&mut self) -> Result<String> {
        match &self.cached {
            Some(token) if !token.is_expired() => Ok(token.access_token.clone()),
            _ => {
                let token = self.exchange().await?;
                let access_token = token.access_token.clone();
                self.cached = Some(token);
                Ok(access_token)
            }
        }
    }

    /// When the currently-cached token expires, for reporting.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.cached.as_ref().map(|t| t.expires_at)
    }

    async fn exchange(&self) -> Result<CachedToken> {
        tracing::debug!("Exchanging refresh token for an access token");
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("scope", TOKEN_SCOPE),
        ];

        let response = self
            .http
            .post(self.credentials.token_endpoint())
            .form(&form)
            .send()
            .await
            .context("The token endpoint request failed")?;

        let body = response
            .text()
            .await
            .context("Unable to read the token endpoint response")?;

        // No fixed schema is guaranteed for failures, so probe the body instead of
        // deserializing into a struct.
        let json: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let access_token = match json.get("access_token").and_then(|v| v.as_str()) {
            Some(token) => token.to_string(),
            None => return Err(AuthError { body }.into()),
        };
        let expires_in = json
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);

        Ok(CachedToken {
            access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_starts_with_no_token() {
        let credentials = CredentialsFile {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            refresh_token: "refresh-token".to_string(),
            redirect_uri: "http://localhost".to_string(),
            token_endpoint: Some("http://127.0.0.1:1/token".to_string()),
        };
        assert_eq!(credentials.token_endpoint(), "http://127.0.0.1:1/token");
        let provider = TokenProvider::new(credentials);
        assert!(provider.expires_at().is_none());
    }

    #[tokio::test]
    async fn test_credentials_file_load() {
        use tempfile::TempDir;
        let json = r#"{
            "client_id": "abc",
            "client_secret": "def",
            "refresh_token": "ghi",
            "redirect_uri": "http://localhost"
        }"#;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        utils::write(&path, json).await.unwrap();

        let credentials = CredentialsFile::load(&path).await.unwrap();
        assert_eq!(credentials.client_id, "abc");
        assert_eq!(credentials.token_endpoint(), TOKEN_ENDPOINT);
    }

    #[tokio::test]
    async fn test_credentials_file_missing() {
        let result = CredentialsFile::load(Path::new("/no/such/credentials.json")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_cached_token_expiry_buffer() {
        let fresh = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!fresh.is_expired());

        let nearly = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() + Duration::minutes(2),
        };
        assert!(nearly.is_expired());
    }

    #[test]
    fn test_auth_error_carries_raw_body() {
        let err = AuthError {
            body: r#"{"error":"invalid_grant"}"#.to_string(),
        };
        assert!(err.to_string().contains("invalid_grant"));
    }
}
