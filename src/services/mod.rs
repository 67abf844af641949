// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service clients for the two external collaborators.

pub mod garmin;
pub mod google_auth;
pub mod sheets;

pub use garmin::{GarminClient, GarminSession};
pub use google_auth::{CredentialState, CredentialStore, GoogleAuthenticator, StoredCredentials};
pub use sheets::SheetsClient;
