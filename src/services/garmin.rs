// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect client for session sign-in and body-composition
//! fetches.
//!
//! Handles:
//! - Username/password sign-in against the SSO endpoint
//! - Weight-service date-range queries
//! - Rate limit and auth error surfacing (fatal to the run)

use crate::error::AppError;
use crate::models::BodyCompositionSample;
use chrono::NaiveDate;
use serde::Deserialize;

const DEFAULT_SSO_URL: &str = "https://sso.garmin.com/sso";
const DEFAULT_API_URL: &str = "https://connectapi.garmin.com";

/// Garmin Connect client.
#[derive(Clone)]
pub struct GarminClient {
    http: reqwest::Client,
    sso_url: String,
    api_url: String,
}

impl Default for GarminClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GarminClient {
    /// Create a client against the production Garmin endpoints.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            sso_url: DEFAULT_SSO_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Create a client against custom endpoints (integration tests).
    pub fn with_base_urls(sso_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            sso_url: sso_url.into(),
            api_url: api_url.into(),
        }
    }

    /// Sign in with account credentials and return an authenticated
    /// session.
    ///
    /// Each run signs in fresh; the session token is never persisted,
    /// so every invocation consumes a login attempt against Garmin's
    /// rate limits. A 429 here is surfaced as its own error kind
    /// rather than retried.
    pub async fn login(&self, username: &str, password: &str) -> Result<GarminSession, AppError> {
        let url = format!("{}/signin", self.sso_url);

        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(connection_error)?;

        let body: SignInResponse = check_response_json(response).await?;

        tracing::info!("Garmin session established");
        Ok(GarminSession {
            http: self.http.clone(),
            api_url: self.api_url.clone(),
            access_token: body.access_token,
        })
    }
}

/// An authenticated Garmin session handle.
///
/// Lifetime is bounded by the remote service; it is re-obtained every
/// run and never written to disk.
#[derive(Clone, Debug)]
pub struct GarminSession {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl GarminSession {
    /// Fetch all body-composition samples in `[start, end]`.
    ///
    /// The weight-service returns the full window in one response;
    /// there is no pagination on this endpoint.
    pub async fn body_composition(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BodyCompositionSample>, AppError> {
        let url = format!("{}/weight-service/weight/dateRange", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("startDate", start.format("%Y-%m-%d").to_string()),
                ("endDate", end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await
            .map_err(connection_error)?;

        let body: BodyCompositionResponse = check_response_json(response).await?;

        tracing::info!(samples = body.date_weight_list.len(), "Weigh-ins fetched");
        Ok(body.date_weight_list)
    }
}

/// Map a transport-level failure to the connection error kind.
fn connection_error(e: reqwest::Error) -> AppError {
    AppError::GarminConnection(e.to_string())
}

/// Check response status, mapping auth and rate-limit statuses to
/// their own error kinds, then parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Garmin rate limit hit (429)");
            return Err(AppError::GarminRateLimit(format!("HTTP {}: {}", status, body)));
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::GarminAuth(format!("HTTP {}: {}", status, body)));
        }

        return Err(AppError::GarminApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::GarminApi(format!("JSON parse error: {}", e)))
}

/// Sign-in response carrying the opaque session token.
#[derive(Debug, Deserialize)]
struct SignInResponse {
    access_token: String,
}

/// Envelope returned by the weight-service date-range endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyCompositionResponse {
    date_weight_list: Vec<BodyCompositionSample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_envelope_parses() {
        let payload = r#"{
            "dateWeightList": [
                {
                    "date": 946684800000,
                    "weight": 70000.0,
                    "bmi": 22.1,
                    "bodyFat": 15.0,
                    "bodyWater": 55.0,
                    "boneMass": 3000.0,
                    "muscleMass": 32000.0
                },
                {
                    "date": 946771200000,
                    "weight": 69500.0,
                    "bmi": 21.9,
                    "bodyFat": 14.8,
                    "bodyWater": 55.2,
                    "boneMass": null,
                    "muscleMass": null
                }
            ]
        }"#;

        let body: BodyCompositionResponse =
            serde_json::from_str(payload).expect("envelope should parse");
        assert_eq!(body.date_weight_list.len(), 2);
        assert_eq!(body.date_weight_list[0].bone_mass, Some(3000.0));
        assert_eq!(body.date_weight_list[1].bone_mass, None);
    }
}
