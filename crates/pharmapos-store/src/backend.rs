//! # Backend Contract
//!
//! The capability-polymorphic seam between the typed [`Store`] and its
//! backing storage. The same operations exist with identical signatures
//! whether records live in local JSON files or a remote table-store; callers
//! cannot tell the difference.
//!
//! ## Why `serde_json::Value` Payloads?
//! The trait must be object safe (the Store holds a `Box<dyn Backend>`), so
//! generic typed methods are out. Records cross this boundary as canonical
//! snake_case JSON objects and the typed translation lives in the Store.
//! This is also exactly the shape both backends need: the local backend
//! writes the JSON as-is and the remote backend sends it as a request body.
//!
//! [`Store`]: crate::store::Store

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use pharmapos_core::{Customer, Invoice, Product, PurchaseOrder, Supplier};

use crate::error::StoreResult;

// =============================================================================
// Table Names
// =============================================================================

/// Every table namespace the adapter knows about, in schema order.
///
/// The verify utility walks this list; the engine only touches the first
/// seven. The remaining tables are part of the expected remote schema even
/// though no engine operation writes them yet.
pub const ALL_TABLES: &[&str] = &[
    "products",
    "customers",
    "invoices",
    "invoice_items",
    "suppliers",
    "purchase_orders",
    "purchase_order_items",
    "sales_returns",
    "sales_return_items",
    "payments",
];

// =============================================================================
// Backend Trait
// =============================================================================

/// Uniform record operations over a backing store.
///
/// ## Contract
/// - `list` returns every record in a table; a table nobody has written to
///   is an empty list, not an error
/// - `insert` persists a record that already carries its id and returns the
///   stored representation
/// - `update` merges a partial patch into the record with the given id
/// - `delete` is idempotent on the local backend and may report NotFound on
///   the remote one; callers treat both as success for cleanup paths
/// - `delete_matching` removes every record whose `column` equals `value`
///   (used for invoice/purchase-order line tables)
/// - `count` is for diagnostics and the verify utility
///
/// No operation is cancellable once issued and no retries happen at this
/// layer; the single-shot unknown-column fallback lives above, in the Store.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend description for logs ("local", "remote").
    fn kind(&self) -> &'static str;

    async fn list(&self, table: &str) -> StoreResult<Vec<Value>>;

    async fn insert(&self, table: &str, record: Value) -> StoreResult<Value>;

    async fn update(&self, table: &str, id: &str, patch: Value) -> StoreResult<()>;

    async fn delete(&self, table: &str, id: &str) -> StoreResult<()>;

    async fn delete_matching(&self, table: &str, column: &str, value: &str) -> StoreResult<()>;

    async fn count(&self, table: &str) -> StoreResult<u64>;
}

// =============================================================================
// Record Trait
// =============================================================================

/// A domain entity that maps onto one table namespace.
///
/// Implemented here (not in pharmapos-core) so the core crate stays free of
/// any persistence vocabulary.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Table namespace this entity persists into.
    const TABLE: &'static str;

    /// Entity display name for error messages.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

impl Record for Product {
    const TABLE: &'static str = "products";
    const ENTITY: &'static str = "Product";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Customer {
    const TABLE: &'static str = "customers";
    const ENTITY: &'static str = "Customer";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Supplier {
    const TABLE: &'static str = "suppliers";
    const ENTITY: &'static str = "Supplier";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Invoice {
    const TABLE: &'static str = "invoices";
    const ENTITY: &'static str = "Invoice";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for PurchaseOrder {
    const TABLE: &'static str = "purchase_orders";
    const ENTITY: &'static str = "PurchaseOrder";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
