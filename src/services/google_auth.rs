// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth2 credentials for the Sheets write.
//!
//! Handles:
//! - Loading/saving the cached access/refresh token pair
//! - Silent refresh when the access token has expired
//! - Interactive authorization-code flow with a local redirect
//!   listener when no usable credentials exist
//!
//! The cache file is read once and written at most once per run;
//! concurrent runs against the same file are not supported.

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Margin before token expiration when we treat it as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Page shown in the operator's browser after the redirect lands.
const REDIRECT_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n<html><body>Authorization complete. You can close this window.</body></html>";

/// Cached OAuth2 token pair, persisted between runs.
///
/// Serialization must round-trip faithfully: losing the refresh token
/// or expiry would force an interactive flow on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Lifecycle state of cached credentials at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Access token usable as-is.
    Valid,
    /// Expired, but a refresh token allows a silent renewal.
    Refreshable,
    /// Expired with no refresh token; interactive flow required.
    Unusable,
}

impl StoredCredentials {
    /// Classify these credentials relative to `now`.
    pub fn state(&self, now: DateTime<Utc>) -> CredentialState {
        if now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at {
            CredentialState::Valid
        } else if self.refresh_token.is_some() {
            CredentialState::Refreshable
        } else {
            CredentialState::Unusable
        }
    }
}

/// On-disk credential cache.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load cached credentials, or `None` if the file does not exist.
    pub fn load(&self) -> Result<Option<StoredCredentials>, AppError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::CredentialStore(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let creds = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::CredentialStore(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(creds))
    }

    /// Persist credentials, replacing any previous file contents.
    pub fn save(&self, creds: &StoredCredentials) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(creds)
            .map_err(|e| AppError::CredentialStore(format!("failed to serialize tokens: {}", e)))?;

        std::fs::write(&self.path, bytes).map_err(|e| {
            AppError::CredentialStore(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Resolves usable Google credentials through the cache lifecycle.
pub struct GoogleAuthenticator {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    store: CredentialStore,
}

impl GoogleAuthenticator {
    pub fn new(
        client_id: String,
        client_secret: String,
        scopes: Vec<String>,
        store: CredentialStore,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            scopes,
            store,
        }
    }

    /// Produce usable credentials, persisting them after any branch
    /// that obtained or changed them.
    ///
    /// Cached-and-valid credentials are returned without a network
    /// call or a cache rewrite. The interactive branch blocks on
    /// operator presence.
    pub async fn ensure_credentials(&self) -> Result<StoredCredentials, AppError> {
        let now = Utc::now();

        match self.store.load()? {
            Some(creds) if creds.state(now) == CredentialState::Valid => {
                tracing::debug!("Cached Google credentials still valid");
                Ok(creds)
            }
            Some(creds) if creds.state(now) == CredentialState::Refreshable => {
                tracing::info!("Cached Google credentials expired, refreshing");
                let refreshed = self.refresh(&creds).await?;
                self.store.save(&refreshed)?;
                Ok(refreshed)
            }
            _ => {
                tracing::info!("No usable cached Google credentials, starting interactive flow");
                let fresh = self.authorize_interactive().await?;
                self.store.save(&fresh)?;
                Ok(fresh)
            }
        }
    }

    /// Refresh an expired access token in place.
    async fn refresh(&self, creds: &StoredCredentials) -> Result<StoredCredentials, AppError> {
        let refresh_token = creds
            .refresh_token
            .as_deref()
            .ok_or_else(|| AppError::SheetsAuth("no refresh token available".to_string()))?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::SheetsAuth(format!("token refresh request failed: {}", e)))?;

        let token: TokenResponse = check_token_response(response).await?;

        // Google omits the refresh token on refresh responses; keep
        // the one we already have.
        Ok(credentials_from_token(
            token,
            creds.refresh_token.clone(),
            Utc::now(),
        ))
    }

    /// Run the interactive authorization-code flow.
    ///
    /// Binds an ephemeral localhost listener, prints the consent URL
    /// for the operator, waits for the single redirect, verifies the
    /// `state` parameter, and exchanges the code for tokens.
    async fn authorize_interactive(&self) -> Result<StoredCredentials, AppError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| AppError::SheetsAuth(format!("failed to bind redirect listener: {}", e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| AppError::SheetsAuth(format!("failed to resolve listener port: {}", e)))?
            .port();

        let redirect_uri = format!("http://127.0.0.1:{}", port);
        let state = one_shot_state();
        let url = build_auth_url(&self.client_id, &redirect_uri, &self.scopes, &state);

        println!("Open this URL in your browser to authorize spreadsheet access:");
        println!("{url}");

        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| AppError::SheetsAuth(format!("redirect listener failed: {}", e)))?;

        let mut buf = vec![0u8; 4096];
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| AppError::SheetsAuth(format!("failed to read redirect request: {}", e)))?;
        let request = String::from_utf8_lossy(&buf[..n]);
        let request_line = request.lines().next().unwrap_or_default();

        let code = redirect_code(request_line, &state).map_err(AppError::SheetsAuth)?;

        // The operator's browser gets its answer whether or not the
        // exchange below succeeds.
        if let Err(e) = stream.write_all(REDIRECT_RESPONSE.as_bytes()).await {
            tracing::warn!(error = %e, "Failed to write redirect response to browser");
        }

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::SheetsAuth(format!("code exchange request failed: {}", e)))?;

        let token: TokenResponse = check_token_response(response).await?;

        tracing::info!("Interactive Google authorization complete");
        Ok(credentials_from_token(token, None, Utc::now()))
    }
}

/// Token endpoint response (code exchange and refresh share a shape).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Check a token-endpoint response and parse its body.
async fn check_token_response(response: reqwest::Response) -> Result<TokenResponse, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::SheetsAuth(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::SheetsAuth(format!("invalid token response: {}", e)))
}

/// Build stored credentials from a token response, carrying forward a
/// previous refresh token when the response omits one.
fn credentials_from_token(
    token: TokenResponse,
    previous_refresh: Option<String>,
    now: DateTime<Utc>,
) -> StoredCredentials {
    StoredCredentials {
        access_token: token.access_token,
        refresh_token: token.refresh_token.or(previous_refresh),
        expires_at: now + Duration::seconds(token.expires_in),
    }
}

/// Build the consent-page URL for the authorization-code flow.
///
/// `access_type=offline` and `prompt=consent` make Google issue a
/// refresh token on the exchange.
fn build_auth_url(client_id: &str, redirect_uri: &str, scopes: &[String], state: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&access_type=offline&prompt=consent",
        AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scopes.join(" ")),
        urlencoding::encode(state),
    )
}

/// Extract and validate the authorization code from the redirect's
/// request line (`GET /?state=..&code=.. HTTP/1.1`).
fn redirect_code(request_line: &str, expected_state: &str) -> Result<String, String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| format!("malformed redirect request: {:?}", request_line))?;

    if let Some(error) = query_param(target, "error") {
        return Err(format!("authorization was denied: {}", error));
    }

    let state = query_param(target, "state")
        .ok_or_else(|| "redirect is missing the state parameter".to_string())?;
    if state != expected_state {
        return Err("redirect state parameter does not match".to_string());
    }

    query_param(target, "code").ok_or_else(|| "redirect is missing the code parameter".to_string())
}

/// Extract a single query parameter from a request target, decoded.
fn query_param(target: &str, name: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == name {
            urlencoding::decode(value).ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// One-shot CSRF state for the localhost redirect.
fn one_shot_state() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}{:x}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(expires_in_secs: i64, refresh: Option<&str>) -> StoredCredentials {
        StoredCredentials {
            access_token: "access".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    fn credential_state_valid() {
        let creds = creds(3600, Some("refresh"));
        assert_eq!(creds.state(Utc::now()), CredentialState::Valid);
    }

    #[test]
    fn credential_state_refreshable_when_expired_with_refresh_token() {
        let creds = creds(-10, Some("refresh"));
        assert_eq!(creds.state(Utc::now()), CredentialState::Refreshable);
    }

    #[test]
    fn credential_state_unusable_when_expired_without_refresh_token() {
        let creds = creds(-10, None);
        assert_eq!(creds.state(Utc::now()), CredentialState::Unusable);
    }

    #[test]
    fn expiry_margin_treats_nearly_expired_as_expired() {
        // Expires in 30s, under the 60s margin
        let creds = creds(30, Some("refresh"));
        assert_eq!(creds.state(Utc::now()), CredentialState::Refreshable);
    }

    #[test]
    fn refresh_response_without_token_keeps_previous() {
        let token = TokenResponse {
            access_token: "new_access".to_string(),
            refresh_token: None,
            expires_in: 3600,
        };

        let merged = credentials_from_token(token, Some("old_refresh".to_string()), Utc::now());
        assert_eq!(merged.access_token, "new_access");
        assert_eq!(merged.refresh_token.as_deref(), Some("old_refresh"));
    }

    #[test]
    fn redirect_code_happy_path() {
        let code = redirect_code("GET /?state=abc&code=4%2Fxyz HTTP/1.1", "abc")
            .expect("redirect should parse");
        assert_eq!(code, "4/xyz");
    }

    #[test]
    fn redirect_code_rejects_state_mismatch() {
        let err = redirect_code("GET /?state=evil&code=xyz HTTP/1.1", "abc").unwrap_err();
        assert!(err.contains("state"));
    }

    #[test]
    fn redirect_code_surfaces_denial() {
        let err = redirect_code("GET /?error=access_denied&state=abc HTTP/1.1", "abc").unwrap_err();
        assert!(err.contains("access_denied"));
    }

    #[test]
    fn redirect_code_requires_code() {
        let err = redirect_code("GET /?state=abc HTTP/1.1", "abc").unwrap_err();
        assert!(err.contains("code"));
    }

    #[test]
    fn auth_url_encodes_scopes_and_redirect() {
        let url = build_auth_url(
            "client",
            "http://127.0.0.1:8123",
            &[
                "https://www.googleapis.com/auth/spreadsheets".to_string(),
                "https://www.googleapis.com/auth/drive.file".to_string(),
            ],
            "xyz",
        );

        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8123"));
        // Space-joined scope list, percent-encoded
        assert!(url.contains("spreadsheets%20https"));
        assert!(url.contains("access_type=offline"));
    }
}
