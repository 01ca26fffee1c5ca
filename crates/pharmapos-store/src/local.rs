//! # Local Backend
//!
//! JSON-file storage for offline or unconfigured installs.
//!
//! ## Layout
//! One file per table namespace under a data directory:
//! ```text
//! <data_dir>/
//! ├── products.json          [ {..}, {..}, ... ]
//! ├── customers.json
//! ├── invoices.json
//! ├── invoice_items.json
//! └── ...
//! ```
//! A missing file is an empty table. Every write rewrites the whole file;
//! table sizes here are a pharmacy's worth of records, not a warehouse's,
//! and full-file rewrites keep the format trivially inspectable.
//!
//! ## Durability
//! No durability guarantees beyond what the filesystem provides. This
//! backend is the fallback when no remote store is configured.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{StoreError, StoreResult};

/// File-per-table JSON backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    data_dir: PathBuf,
}

impl LocalBackend {
    /// Creates a local backend rooted at `data_dir`. The directory is
    /// created on first write, not here.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        LocalBackend {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", table))
    }

    /// Reads a table file into a record array. Missing file = empty table.
    async fn read_table(&self, table: &str) -> StoreResult<Vec<Value>> {
        let path = self.table_path(table);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let records: Vec<Value> = serde_json::from_slice(&bytes)?;
        Ok(records)
    }

    /// Rewrites a table file with the full record array.
    async fn write_table(&self, table: &str, records: &[Value]) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.table_path(table);
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Backend for LocalBackend {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn list(&self, table: &str) -> StoreResult<Vec<Value>> {
        self.read_table(table).await
    }

    async fn insert(&self, table: &str, record: Value) -> StoreResult<Value> {
        debug!(table = %table, "local insert");
        let mut records = self.read_table(table).await?;
        records.push(record.clone());
        self.write_table(table, &records).await?;
        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> StoreResult<()> {
        debug!(table = %table, id = %id, "local update");
        let mut records = self.read_table(table).await?;

        let record = records
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::not_found(table, id))?;

        if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }

        self.write_table(table, &records).await
    }

    async fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        debug!(table = %table, id = %id, "local delete");
        let mut records = self.read_table(table).await?;
        records.retain(|r| record_id(r) != Some(id));
        self.write_table(table, &records).await
    }

    async fn delete_matching(&self, table: &str, column: &str, value: &str) -> StoreResult<()> {
        let mut records = self.read_table(table).await?;
        records.retain(|r| r.get(column).and_then(Value::as_str) != Some(value));
        self.write_table(table, &records).await
    }

    async fn count(&self, table: &str) -> StoreResult<u64> {
        Ok(self.read_table(table).await?.len() as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
