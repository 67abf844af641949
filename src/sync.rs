// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The synchronization procedure: Garmin session → fetch/transform →
//! Sheets overwrite, strictly in that order.
//!
//! Every stage failure propagates to the caller untouched; there is no
//! retry and no partial write. The destination stage never starts
//! before the full row list exists.

use crate::config::Config;
use crate::error::AppError;
use crate::models::weight_rows;
use crate::services::{CredentialStore, GarminClient, GoogleAuthenticator, SheetsClient};
use chrono::{NaiveDate, Utc};

/// Start of the query window. Weigh-ins predating smart scales don't
/// exist, so the window is effectively "entire account history".
fn history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Samples returned by the weight-service
    pub samples_fetched: usize,
    /// Rows written after dropping incomplete readings
    pub rows_written: usize,
    /// Cells the Sheets API reported as updated
    pub updated_cells: u32,
}

/// Run the full sync once.
pub async fn run(config: &Config) -> Result<SyncReport, AppError> {
    // Stage 1: source session
    let garmin = GarminClient::new();
    let session = garmin
        .login(&config.garmin_username, &config.garmin_password)
        .await?;

    // Stage 2: fetch and transform
    let today = Utc::now().date_naive();
    let samples = session.body_composition(history_start(), today).await?;
    let rows = weight_rows(&samples);
    tracing::info!(
        fetched = samples.len(),
        kept = rows.len(),
        dropped = samples.len() - rows.len(),
        "Samples transformed"
    );
    for row in &rows {
        tracing::debug!(
            date = %row.date,
            weight_kg = row.weight_kg,
            bone_mass_kg = row.bone_mass_kg,
            muscle_mass_kg = row.muscle_mass_kg,
            "Row"
        );
    }

    // Stage 3: destination credentials, then the range overwrite
    let authenticator = GoogleAuthenticator::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_scopes.clone(),
        CredentialStore::new(config.token_cache_path.clone()),
    );
    let credentials = authenticator.ensure_credentials().await?;

    let sheets = SheetsClient::new();
    let update = sheets
        .update_values(
            &credentials.access_token,
            &config.spreadsheet_id,
            &config.range_name,
            &rows,
        )
        .await?;

    Ok(SyncReport {
        samples_fetched: samples.len(),
        rows_written: rows.len(),
        updated_cells: update.updated_cells.unwrap_or(0),
    })
}
