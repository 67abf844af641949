// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with a fixed exit-code taxonomy.
//!
//! Every failure in the sync procedure is fatal: the caller prints the
//! error's own message as a single diagnostic line and terminates with
//! the matching exit code. There is no retry layer.

use crate::config::ConfigError;

/// Application error type covering both remote services.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Garmin connection error: {0}")]
    GarminConnection(String),

    #[error("Garmin authentication error: {0}")]
    GarminAuth(String),

    #[error("Garmin rate limit exceeded: {0}")]
    GarminRateLimit(String),

    #[error("Garmin API error: {0}")]
    GarminApi(String),

    #[error("Google authorization error: {0}")]
    SheetsAuth(String),

    #[error("Sheets write error: {0}")]
    SheetsWrite(String),

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Process exit code for this error kind.
    ///
    /// 1 = source auth, 2 = source connection, 3 = source rate limit,
    /// 4 = destination auth (including the credential cache),
    /// 5 = write failure, 6 = unknown source API error,
    /// 64 = configuration, 70 = internal.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::GarminAuth(_) => 1,
            AppError::GarminConnection(_) => 2,
            AppError::GarminRateLimit(_) => 3,
            AppError::SheetsAuth(_) | AppError::CredentialStore(_) => 4,
            AppError::SheetsWrite(_) => 5,
            AppError::GarminApi(_) => 6,
            AppError::Config(_) => 64,
            AppError::Internal(_) => 70,
        }
    }

    /// Whether this error came from the source (Garmin) side.
    ///
    /// Used by tests to assert that source failures never reach the
    /// destination write.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            AppError::GarminConnection(_)
                | AppError::GarminAuth(_)
                | AppError::GarminRateLimit(_)
                | AppError::GarminApi(_)
        )
    }
}

/// Result type alias for the sync procedure.
pub type Result<T> = std::result::Result<T, AppError>;
