// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body-composition sample model and the sample → row transform.
//!
//! Garmin reports mass fields in grams; the spreadsheet carries
//! kilograms and a `dd.mm.yyyy` date column. Samples missing a mass
//! field are partial scale readings and are dropped, not errors.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One raw weigh-in record from the Connect weight-service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCompositionSample {
    /// Measurement timestamp, epoch milliseconds
    pub date: i64,
    /// Weight in grams
    pub weight: f64,
    /// Body mass index
    pub bmi: f64,
    /// Body fat percentage
    pub body_fat: f64,
    /// Body water percentage
    pub body_water: f64,
    /// Bone mass in grams; absent on partial readings
    pub bone_mass: Option<f64>,
    /// Muscle mass in grams; absent on partial readings
    pub muscle_mass: Option<f64>,
}

/// One output row in spreadsheet column order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRow {
    /// Measurement date as `dd.mm.yyyy`
    pub date: String,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Body mass index
    pub bmi: f64,
    /// Body fat percentage
    pub body_fat: f64,
    /// Body water percentage
    pub body_water: f64,
    /// Bone mass in kilograms
    pub bone_mass_kg: f64,
    /// Muscle mass in kilograms
    pub muscle_mass_kg: f64,
}

impl WeightRow {
    /// Convert a sample into a row, or `None` if the reading is
    /// incomplete (missing a mass field).
    pub fn from_sample(sample: &BodyCompositionSample) -> Option<Self> {
        let bone_mass = sample.bone_mass?;
        let muscle_mass = sample.muscle_mass?;

        Some(Self {
            date: format_epoch_millis(sample.date),
            weight_kg: sample.weight / 1000.0,
            bmi: sample.bmi,
            body_fat: sample.body_fat,
            body_water: sample.body_water,
            bone_mass_kg: bone_mass / 1000.0,
            muscle_mass_kg: muscle_mass / 1000.0,
        })
    }

    /// Row-major cell values for the Sheets `values.update` body.
    pub fn to_cells(&self) -> Vec<serde_json::Value> {
        vec![
            serde_json::Value::from(self.date.clone()),
            serde_json::Value::from(self.weight_kg),
            serde_json::Value::from(self.bmi),
            serde_json::Value::from(self.body_fat),
            serde_json::Value::from(self.body_water),
            serde_json::Value::from(self.bone_mass_kg),
            serde_json::Value::from(self.muscle_mass_kg),
        ]
    }
}

/// Transform fetched samples into output rows, preserving fetch order
/// and dropping incomplete readings.
pub fn weight_rows(samples: &[BodyCompositionSample]) -> Vec<WeightRow> {
    samples.iter().filter_map(WeightRow::from_sample).collect()
}

/// Format an epoch-millisecond timestamp as `dd.mm.yyyy` in UTC.
///
/// UTC keeps the column deterministic across machines; out-of-range
/// timestamps clamp to the epoch rather than panic.
pub fn format_epoch_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .format("%d.%m.%Y")
        .to_string()
}
