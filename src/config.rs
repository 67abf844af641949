// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; the sync procedure itself never
//! touches the environment.

use std::env;
use std::path::PathBuf;

/// Google Sheets scope required for the range overwrite.
const DEFAULT_SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Default on-disk location of the cached Google OAuth tokens.
const DEFAULT_TOKEN_CACHE: &str = "token.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Garmin Connect account name
    pub garmin_username: String,
    /// Garmin Connect account password
    pub garmin_password: String,
    /// Target spreadsheet ID
    pub spreadsheet_id: String,
    /// A1-style range that is fully overwritten each run
    pub range_name: String,
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// OAuth scopes requested during the interactive flow
    pub google_scopes: Vec<String>,
    /// Where the access/refresh token pair is cached between runs
    pub token_cache_path: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            garmin_username: "athlete@example.com".to_string(),
            garmin_password: "hunter2".to_string(),
            spreadsheet_id: "test-spreadsheet-id".to_string(),
            range_name: "Weight!A2:G".to_string(),
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_secret".to_string(),
            google_scopes: vec![DEFAULT_SHEETS_SCOPE.to_string()],
            token_cache_path: PathBuf::from(DEFAULT_TOKEN_CACHE),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local
    /// runs; a cron deployment sets the variables directly.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            garmin_username: env::var("GARMIN_USERNAME")
                .map_err(|_| ConfigError::Missing("GARMIN_USERNAME"))?,
            garmin_password: env::var("GARMIN_PASSWORD")
                .map_err(|_| ConfigError::Missing("GARMIN_PASSWORD"))?,
            spreadsheet_id: env::var("SPREADSHEET_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SPREADSHEET_ID"))?,
            range_name: env::var("RANGE_NAME")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("RANGE_NAME"))?,
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            google_scopes: env::var("GOOGLE_OAUTH_SCOPES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec![DEFAULT_SHEETS_SCOPE.to_string()]),
            token_cache_path: env::var("TOKEN_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_CACHE)),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test covers the whole env surface: tests in this binary run
    // in parallel threads sharing the process environment.
    #[test]
    fn test_config_from_env() {
        env::set_var("GARMIN_USERNAME", "test_user");
        env::set_var("GARMIN_PASSWORD", "test_pass");
        env::set_var("SPREADSHEET_ID", "test_sheet");
        env::set_var("RANGE_NAME", "Weight!A2:G");
        env::set_var("GOOGLE_CLIENT_ID", "test_id");
        env::set_var("GOOGLE_CLIENT_SECRET", "test_secret");
        env::remove_var("GOOGLE_OAUTH_SCOPES");
        env::remove_var("TOKEN_CACHE_PATH");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.garmin_username, "test_user");
        assert_eq!(config.spreadsheet_id, "test_sheet");
        assert_eq!(config.range_name, "Weight!A2:G");
        assert_eq!(config.google_scopes, vec![DEFAULT_SHEETS_SCOPE.to_string()]);
        assert_eq!(config.token_cache_path, PathBuf::from("token.json"));

        env::set_var(
            "GOOGLE_OAUTH_SCOPES",
            "https://example.com/a, https://example.com/b",
        );
        env::set_var("TOKEN_CACHE_PATH", "/var/cache/scale-sync/token.json");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(
            config.google_scopes,
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string()
            ]
        );
        assert_eq!(
            config.token_cache_path,
            PathBuf::from("/var/cache/scale-sync/token.json")
        );

        env::remove_var("GOOGLE_OAUTH_SCOPES");
        env::remove_var("TOKEN_CACHE_PATH");
    }
}
