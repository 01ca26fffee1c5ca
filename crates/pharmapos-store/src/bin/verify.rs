//! # Schema Verify Utility
//!
//! Checks that the configured backing store carries every table the
//! application expects, and reports row counts for the ones it finds.
//!
//! ```text
//! $ pharmapos-verify
//! Backing store: remote
//!
//!   products                    ok      142 rows
//!   customers                   ok       12 rows
//!   ...
//!   payments                    MISSING
//!
//! 1 table missing. Run the schema migration against the project.
//! ```
//!
//! Exits non-zero when any table is missing or the store is unreachable,
//! so the check can gate a deployment script.

use std::process::ExitCode;

use tracing::error;

use pharmapos_core::Settings;
use pharmapos_store::{SettingsStore, Store, StoreConfig, StoreError, ALL_TABLES};

/// Data directory fallback when the environment does not name one.
const DEFAULT_DATA_DIR: &str = ".pharmapos";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let data_dir =
        std::env::var("PHARMAPOS_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

    let settings = match SettingsStore::new(&data_dir).load().await {
        Ok(settings) => settings,
        Err(e) => {
            error!("Could not load settings: {}", e);
            Settings::default()
        }
    };

    let config = StoreConfig::resolve(&settings, &data_dir);
    let store = match Store::from_config(&config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not build backing store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Backing store: {}\n", store.backend_kind());

    let mut missing = 0u32;
    let mut unreachable = false;

    for &table in ALL_TABLES {
        match store.count(table).await {
            Ok(rows) => println!("  {:<26} ok    {:>6} rows", table, rows),
            Err(StoreError::TableMissing { .. }) => {
                println!("  {:<26} MISSING", table);
                missing += 1;
            }
            Err(e) => {
                println!("  {:<26} ERROR  {}", table, e);
                unreachable = true;
            }
        }
    }

    println!();
    if unreachable {
        println!("Backing store unreachable; verification incomplete.");
        return ExitCode::FAILURE;
    }
    if missing > 0 {
        println!(
            "{} table{} missing. Run the schema migration against the project.",
            missing,
            if missing == 1 { "" } else { "s" }
        );
        return ExitCode::FAILURE;
    }

    println!("All {} tables present.", ALL_TABLES.len());
    ExitCode::SUCCESS
}
