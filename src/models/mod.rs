// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for body-composition samples and spreadsheet rows.

pub mod body_composition;

pub use body_composition::{weight_rows, BodyCompositionSample, WeightRow};
