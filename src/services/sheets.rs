// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Sheets client for the range overwrite.
//!
//! One call: `values.update` with `valueInputOption=USER_ENTERED`,
//! replacing the full contents of the target range in a single
//! request. The API applies that request atomically, so a run either
//! writes all rows or none.

use crate::error::AppError;
use crate::models::WeightRow;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "https://sheets.googleapis.com/v4";

/// Google Sheets API client.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for SheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetsClient {
    /// Create a client against the production Sheets endpoint.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Create a client against a custom endpoint (integration tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Overwrite `range` in `spreadsheet_id` with the given rows.
    ///
    /// Rows are written in order, row-major. The range is fixed by the
    /// operator; no range-growing is performed here, so a shrinking
    /// row list leaves trailing cells untouched unless the range is
    /// sized to cover them.
    pub async fn update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
        rows: &[WeightRow],
    ) -> Result<UpdateValuesResponse, AppError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            spreadsheet_id,
            urlencoding::encode(range)
        );

        let body = ValueRange {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: rows.iter().map(WeightRow::to_cells).collect(),
        };

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::SheetsWrite(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(AppError::SheetsAuth(format!("HTTP {}: {}", status, body)));
            }

            return Err(AppError::SheetsWrite(format!("HTTP {}: {}", status, body)));
        }

        let update: UpdateValuesResponse = response
            .json()
            .await
            .map_err(|e| AppError::SheetsWrite(format!("JSON parse error: {}", e)))?;

        tracing::info!(
            updated_range = update.updated_range.as_deref().unwrap_or("<unknown>"),
            updated_rows = update.updated_rows.unwrap_or(0),
            updated_cells = update.updated_cells.unwrap_or(0),
            "Spreadsheet range updated"
        );

        Ok(update)
    }
}

/// `values.update` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<serde_json::Value>>,
}

/// `values.update` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u32>,
    pub updated_columns: Option<u32>,
    pub updated_cells: Option<u32>,
}
