//! # Typed Store
//!
//! The typed persistence surface the engine talks to. Wraps a
//! [`Backend`] and owns three concerns the backends stay ignorant of:
//!
//! 1. **Typing**: entities go in and come out as their canonical structs;
//!    JSON exists only between here and the backend.
//! 2. **Identity**: records without an id get a UUID v4 before persisting,
//!    so ids are never minted by the backing store.
//! 3. **Partial schemas**: when a backend reports an unknown column the
//!    offending field is stripped and the write retried exactly once.
//!
//! ## Document Split/Join
//! Invoices and purchase orders persist as a header row plus a child-table
//! row per line (`invoice_items`, `purchase_order_items`), mirroring the
//! remote schema. Listing joins the lines back onto their header, ordered
//! by the `line_no` column written at insert time.

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use pharmapos_core::{Invoice, InvoiceLine, PurchaseOrder, PurchaseOrderLine};

use crate::backend::{Backend, Record};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Foreign-key column linking invoice line rows to their invoice.
const INVOICE_FK: &str = "invoice_id";

/// Foreign-key column linking purchase-order line rows to their order.
const PURCHASE_ORDER_FK: &str = "purchase_order_id";

/// Typed persistence adapter.
pub struct Store {
    backend: Box<dyn Backend>,
}

impl Store {
    /// Wraps an already-built backend. Tests inject doubles here.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Store { backend }
    }

    /// Builds the store a resolved configuration names.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Ok(Store::new(config.build_backend()?))
    }

    /// Which backend this store runs on ("local" or "remote").
    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    // =========================================================================
    // Generic Entity Operations
    // =========================================================================

    /// Lists every record of an entity type.
    pub async fn list<T: Record>(&self) -> StoreResult<Vec<T>> {
        let rows = self.backend.list(T::TABLE).await?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            entities.push(serde_json::from_value(row)?);
        }
        Ok(entities)
    }

    /// Persists a new entity, generating a UUID v4 id when none is set.
    /// Returns the entity as persisted (with its id).
    pub async fn create<T: Record>(&self, mut entity: T) -> StoreResult<T> {
        if entity.id().is_empty() {
            entity.set_id(Uuid::new_v4().to_string());
        }
        let record = serde_json::to_value(&entity)?;
        self.insert_with_fallback(T::TABLE, record).await?;
        Ok(entity)
    }

    /// Merges a partial patch into the record with the given id.
    pub async fn update<T: Record>(&self, id: &str, patch: Value) -> StoreResult<()> {
        self.update_with_fallback(T::TABLE, id, patch).await
    }

    /// Deletes the record with the given id.
    pub async fn delete<T: Record>(&self, id: &str) -> StoreResult<()> {
        self.backend.delete(T::TABLE, id).await
    }

    /// Row count for a table (diagnostics and the verify utility).
    pub async fn count(&self, table: &str) -> StoreResult<u64> {
        self.backend.count(table).await
    }

    // =========================================================================
    // Schema-Mismatch Fallback
    // =========================================================================

    /// Insert with the single-shot unknown-column retry.
    async fn insert_with_fallback(&self, table: &str, record: Value) -> StoreResult<Value> {
        match self.backend.insert(table, record.clone()).await {
            Err(StoreError::UnknownColumn { column, .. })
                if record.get(&column).is_some() =>
            {
                warn!(
                    table = %table,
                    column = %column,
                    "Backing schema has no such column; retrying without it"
                );
                self.backend.insert(table, strip_field(record, &column)).await
            }
            other => other,
        }
    }

    /// Update with the single-shot unknown-column retry.
    async fn update_with_fallback(&self, table: &str, id: &str, patch: Value) -> StoreResult<()> {
        match self.backend.update(table, id, patch.clone()).await {
            Err(StoreError::UnknownColumn { column, .. }) if patch.get(&column).is_some() => {
                warn!(
                    table = %table,
                    column = %column,
                    "Backing schema has no such column; retrying without it"
                );
                let stripped = strip_field(patch, &column);
                if stripped.as_object().is_some_and(|o| o.is_empty()) {
                    // Nothing left to write; the degraded schema simply
                    // does not track this field
                    return Ok(());
                }
                self.backend.update(table, id, stripped).await
            }
            other => other,
        }
    }

    // =========================================================================
    // Invoices (header + line table)
    // =========================================================================

    /// Lists invoices with their lines joined back on, newest date first.
    pub async fn list_invoices(&self) -> StoreResult<Vec<Invoice>> {
        let headers = self.backend.list(Invoice::TABLE).await?;
        let line_rows = self.backend.list("invoice_items").await?;

        let mut invoices = Vec::with_capacity(headers.len());
        for header in headers {
            let mut invoice: Invoice = serde_json::from_value(header)?;
            invoice.items = collect_lines::<InvoiceLine>(&line_rows, INVOICE_FK, &invoice.id)?;
            invoices.push(invoice);
        }

        invoices.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });
        Ok(invoices)
    }

    /// Persists an invoice as a header row plus one line row per item.
    ///
    /// The header goes first so line rows never reference a missing invoice.
    /// On failure the caller's compensation removes whatever landed via
    /// [`Store::delete_invoice`].
    pub async fn create_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        let header = strip_field(serde_json::to_value(invoice)?, "items");
        self.insert_with_fallback(Invoice::TABLE, header).await?;

        for (line_no, item) in invoice.items.iter().enumerate() {
            let row = line_row(item, INVOICE_FK, &invoice.id, line_no)?;
            self.insert_with_fallback("invoice_items", row).await?;
        }
        Ok(())
    }

    /// Deletes an invoice and all of its line rows.
    pub async fn delete_invoice(&self, id: &str) -> StoreResult<()> {
        self.backend
            .delete_matching("invoice_items", INVOICE_FK, id)
            .await?;
        self.backend.delete(Invoice::TABLE, id).await
    }

    // =========================================================================
    // Purchase Orders (header + line table)
    // =========================================================================

    /// Lists purchase orders with their lines joined back on, newest first.
    pub async fn list_purchase_orders(&self) -> StoreResult<Vec<PurchaseOrder>> {
        let headers = self.backend.list(PurchaseOrder::TABLE).await?;
        let line_rows = self.backend.list("purchase_order_items").await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            let mut order: PurchaseOrder = serde_json::from_value(header)?;
            order.items =
                collect_lines::<PurchaseOrderLine>(&line_rows, PURCHASE_ORDER_FK, &order.id)?;
            orders.push(order);
        }

        orders.sort_by(|a, b| {
            b.order_date
                .cmp(&a.order_date)
                .then_with(|| b.po_number.cmp(&a.po_number))
        });
        Ok(orders)
    }

    /// Persists a purchase order as a header row plus line rows.
    pub async fn create_purchase_order(&self, po: &PurchaseOrder) -> StoreResult<()> {
        let header = strip_field(serde_json::to_value(po)?, "items");
        self.insert_with_fallback(PurchaseOrder::TABLE, header).await?;
        self.write_purchase_order_lines(po).await
    }

    /// Rewrites an existing purchase order in place: the header is patched
    /// and the line rows are replaced wholesale.
    pub async fn replace_purchase_order(&self, po: &PurchaseOrder) -> StoreResult<()> {
        let header = strip_field(serde_json::to_value(po)?, "items");
        self.update_with_fallback(PurchaseOrder::TABLE, &po.id, header)
            .await?;
        self.rewrite_purchase_order_lines(po).await
    }

    /// Replaces a purchase order's line rows without touching the header.
    ///
    /// Receiving uses this so the header status flip can be issued
    /// separately as the final single write, and so a failed rewrite can
    /// be compensated by rewriting the original lines back.
    pub async fn rewrite_purchase_order_lines(&self, po: &PurchaseOrder) -> StoreResult<()> {
        self.backend
            .delete_matching("purchase_order_items", PURCHASE_ORDER_FK, &po.id)
            .await?;
        self.write_purchase_order_lines(po).await
    }

    /// Deletes a purchase order and all of its line rows.
    pub async fn delete_purchase_order(&self, id: &str) -> StoreResult<()> {
        self.backend
            .delete_matching("purchase_order_items", PURCHASE_ORDER_FK, id)
            .await?;
        self.backend.delete(PurchaseOrder::TABLE, id).await
    }

    async fn write_purchase_order_lines(&self, po: &PurchaseOrder) -> StoreResult<()> {
        for (line_no, item) in po.items.iter().enumerate() {
            let row = line_row(item, PURCHASE_ORDER_FK, &po.id, line_no)?;
            self.insert_with_fallback("purchase_order_items", row).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Row Shaping Helpers
// =============================================================================

/// Removes a field from a JSON object, returning the object.
fn strip_field(mut value: Value, field: &str) -> Value {
    if let Some(obj) = value.as_object_mut() {
        obj.remove(field);
    }
    value
}

/// Builds a child-table row: the serialized line plus id, foreign key and
/// position.
fn line_row<T: serde::Serialize>(
    line: &T,
    fk_column: &str,
    parent_id: &str,
    line_no: usize,
) -> StoreResult<Value> {
    let mut row = serde_json::to_value(line)?;
    if let Some(obj) = row.as_object_mut() {
        obj.insert("id".to_string(), Value::from(Uuid::new_v4().to_string()));
        obj.insert(fk_column.to_string(), Value::from(parent_id));
        obj.insert("line_no".to_string(), Value::from(line_no as u64));
    }
    Ok(row)
}

/// Picks the line rows belonging to one parent, ordered by `line_no`.
/// Rows without the column keep their list order (stable sort).
fn collect_lines<T: serde::de::DeserializeOwned>(
    rows: &[Value],
    fk_column: &str,
    parent_id: &str,
) -> StoreResult<Vec<T>> {
    let mut matching: Vec<&Value> = rows
        .iter()
        .filter(|r| r.get(fk_column).and_then(Value::as_str) == Some(parent_id))
        .collect();
    matching.sort_by_key(|r| r.get("line_no").and_then(Value::as_u64).unwrap_or(u64::MAX));

    let mut lines = Vec::with_capacity(matching.len());
    for row in matching {
        lines.push(serde_json::from_value(row.clone())?);
    }
    Ok(lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
