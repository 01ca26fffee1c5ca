//! # Store Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / std::io::Error / serde_json::Error                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds table/column context                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (pharmapos-engine) ← Triggers checkout compensation       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller displays user-friendly message                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The UnknownColumn Variant
//! Remote schemas are allowed to be partial (a customers table without the
//! balance column is valid). The remote backend detects the table-store's
//! unknown-column response and surfaces it as `UnknownColumn` so the typed
//! Store can strip the field and retry once instead of failing outright.

use thiserror::Error;

/// Persistence adapter errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found in the backing store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The backing schema has no such column.
    ///
    /// ## When This Occurs
    /// Remote table-store rejects an insert/update because the payload names
    /// a column the table does not have (response code PGRST204).
    #[error("Table {table} has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// The backing schema has no such table.
    ///
    /// ## When This Occurs
    /// The remote project was never migrated, or only partially. The verify
    /// utility reports these per table.
    #[error("Table {table} does not exist in the backing store")]
    TableMissing { table: String },

    /// Remote request failed at the HTTP layer.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote table-store rejected the request.
    #[error("Table-store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Local file I/O failed.
    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote backend requested without a usable URL + key pair.
    #[error("Remote store credentials are missing or incomplete")]
    MissingCredentials,
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;
