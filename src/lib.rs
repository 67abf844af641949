// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scale-Sync: mirror Garmin Connect body-composition history into a
//! Google Sheets range.
//!
//! This crate implements one synchronization procedure: establish a
//! Garmin session, fetch and transform weigh-in samples, then
//! overwrite a fixed spreadsheet range with the result.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sync;
