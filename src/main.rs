// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scale-Sync CLI
//!
//! Mirrors Garmin Connect body-composition history into a Google
//! Sheets range. Intended to be invoked once per run by an external
//! scheduler; any failure terminates with a taxonomy exit code and a
//! single diagnostic line.

use scale_sync::config::Config;
use scale_sync::sync;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(64);
        }
    };

    match sync::run(&config).await {
        Ok(report) => {
            tracing::info!(
                samples = report.samples_fetched,
                rows = report.rows_written,
                cells = report.updated_cells,
                "Sync complete"
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Initialize tracing with an env-filter; defaults keep the crate at
/// info so a cron log shows one line per stage.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scale_sync=info".parse().unwrap()),
        )
        .with(format)
        .init();
}
