//! # Pharmacy Engine
//!
//! The single owner of all shared mutable state.
//!
//! ## State Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmacyEngine                                   │
//! │                                                                         │
//! │   products ─┐                                                           │
//! │   customers ├── entity lists, mirrored from the store                   │
//! │   suppliers ┘                                                           │
//! │   invoices ──── sale history, newest first                              │
//! │   purchase_orders                                                       │
//! │   cart ──────── the active POS session, never persisted                 │
//! │   settings ──── pharmacy profile + store credentials                    │
//! │                                                                         │
//! │   Callers read snapshots and invoke mutators. Every mutator             │
//! │   persists FIRST and touches in-memory state only on success,           │
//! │   so memory never shows a write the store refused.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout Saga
//! `complete_sale` is a multi-write operation against a store with no
//! transactions, so it runs as a saga with compensation:
//!
//! ```text
//! 1. persist invoice (header + lines)
//! 2. persist stock decrement per cart line     ─┐ on failure: restore the
//! 3. persist customer balance increment         ┘ stocks already written,
//!                                                 delete the invoice,
//! 4. commit to memory, clear the cart             propagate the error
//! ```
//!
//! In-memory state is untouched until step 4, so a failed checkout leaves
//! the engine exactly as it was. Receiving a purchase order follows the
//! same discipline.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pharmapos_core::invoice::next_document_number;
use pharmapos_core::validation::{
    validate_customer, validate_product, validate_purchase_order, validate_supplier,
};
use pharmapos_core::{
    Cart, CartLineUpdate, CartTotals, Customer, Invoice, InvoiceDocument, PaymentMethod, Product,
    PurchaseOrder, PurchaseOrderStatus, Settings, Supplier,
};
use pharmapos_store::{SettingsStore, Store, StoreConfig, StoreError};

use crate::error::{EngineError, EngineResult};
use crate::seed;

/// A planned stock change, carried through the saga so it can be undone.
#[derive(Debug, Clone)]
struct StockMove {
    product_id: String,
    old_stock: i64,
    new_stock: i64,
}

/// The domain state container.
pub struct PharmacyEngine {
    store: Store,
    data_dir: PathBuf,
    settings: Settings,
    products: Vec<Product>,
    customers: Vec<Customer>,
    suppliers: Vec<Supplier>,
    /// Newest first
    invoices: Vec<Invoice>,
    /// Newest first
    purchase_orders: Vec<PurchaseOrder>,
    cart: Cart,
}

impl PharmacyEngine {
    /// Opens the engine against a data directory: loads settings, resolves
    /// the backing store and pulls all state.
    pub async fn open(data_dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let data_dir = data_dir.into();
        let settings = SettingsStore::new(&data_dir).load().await?;
        let config = StoreConfig::resolve(&settings, &data_dir);
        let store = Store::from_config(&config)?;

        let mut engine = PharmacyEngine::with_store(store, settings, data_dir);
        engine.load().await?;
        Ok(engine)
    }

    /// Builds an engine around an injected store without loading anything.
    /// Tests use this to substitute throwaway or failing backends.
    pub fn with_store(store: Store, settings: Settings, data_dir: impl Into<PathBuf>) -> Self {
        PharmacyEngine {
            store,
            data_dir: data_dir.into(),
            settings,
            products: Vec::new(),
            customers: Vec::new(),
            suppliers: Vec::new(),
            invoices: Vec::new(),
            purchase_orders: Vec::new(),
            cart: Cart::new(),
        }
    }

    /// Pulls all entity state from the store, seeding demo data into a
    /// fresh local store so a new install is not an empty screen.
    pub async fn load(&mut self) -> EngineResult<()> {
        self.products = self.store.list().await?;
        self.customers = self.store.list().await?;
        self.suppliers = self.store.list().await?;
        self.invoices = self.store.list_invoices().await?;
        self.purchase_orders = self.store.list_purchase_orders().await?;

        let fresh = self.products.is_empty() && self.customers.is_empty()
            && self.invoices.is_empty();
        if fresh && self.store.backend_kind() == "local" {
            info!("Fresh local store, seeding demo data");
            for product in seed::demo_products() {
                let created = self.store.create(product).await?;
                self.products.push(created);
            }
            for customer in seed::demo_customers() {
                let created = self.store.create(customer).await?;
                self.customers.push(created);
            }
        }

        debug!(
            products = self.products.len(),
            customers = self.customers.len(),
            invoices = self.invoices.len(),
            "Engine state loaded"
        );
        Ok(())
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    /// Sale history, newest first.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    // =========================================================================
    // Product CRUD
    // =========================================================================

    /// Validates and persists a new product.
    pub async fn add_product(&mut self, product: Product) -> EngineResult<Product> {
        validate_product(&product)?;
        let created = self.store.create(product).await?;
        self.products.push(created.clone());
        Ok(created)
    }

    /// Validates and persists a full product rewrite.
    ///
    /// Invoice lines are unaffected: they carry frozen copies, not
    /// references.
    pub async fn update_product(&mut self, product: Product) -> EngineResult<()> {
        validate_product(&product)?;
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| EngineError::not_found("Product", &product.id))?;

        self.store
            .update::<Product>(&product.id, to_patch(&product)?)
            .await?;
        *slot = product;
        Ok(())
    }

    /// Deletes a product and drops any cart line referencing it.
    pub async fn delete_product(&mut self, id: &str) -> EngineResult<()> {
        if self.product(id).is_none() {
            return Err(EngineError::not_found("Product", id));
        }
        self.store.delete::<Product>(id).await?;
        self.products.retain(|p| p.id != id);
        self.cart.remove_line(id);
        Ok(())
    }

    // =========================================================================
    // Customer CRUD
    // =========================================================================

    pub async fn add_customer(&mut self, customer: Customer) -> EngineResult<Customer> {
        validate_customer(&customer)?;
        let created = self.store.create(customer).await?;
        self.customers.push(created.clone());
        Ok(created)
    }

    pub async fn update_customer(&mut self, customer: Customer) -> EngineResult<()> {
        validate_customer(&customer)?;
        let slot = self
            .customers
            .iter_mut()
            .find(|c| c.id == customer.id)
            .ok_or_else(|| EngineError::not_found("Customer", &customer.id))?;

        self.store
            .update::<Customer>(&customer.id, to_patch(&customer)?)
            .await?;
        *slot = customer;
        Ok(())
    }

    /// Deletes a customer. Past invoices keep their frozen customer name.
    pub async fn delete_customer(&mut self, id: &str) -> EngineResult<()> {
        if self.customer(id).is_none() {
            return Err(EngineError::not_found("Customer", id));
        }
        self.store.delete::<Customer>(id).await?;
        self.customers.retain(|c| c.id != id);
        Ok(())
    }

    // =========================================================================
    // Supplier CRUD
    // =========================================================================

    pub async fn add_supplier(&mut self, supplier: Supplier) -> EngineResult<Supplier> {
        validate_supplier(&supplier)?;
        let created = self.store.create(supplier).await?;
        self.suppliers.push(created.clone());
        Ok(created)
    }

    pub async fn update_supplier(&mut self, supplier: Supplier) -> EngineResult<()> {
        validate_supplier(&supplier)?;
        let slot = self
            .suppliers
            .iter_mut()
            .find(|s| s.id == supplier.id)
            .ok_or_else(|| EngineError::not_found("Supplier", &supplier.id))?;

        self.store
            .update::<Supplier>(&supplier.id, to_patch(&supplier)?)
            .await?;
        *slot = supplier;
        Ok(())
    }

    pub async fn delete_supplier(&mut self, id: &str) -> EngineResult<()> {
        if !self.suppliers.iter().any(|s| s.id == id) {
            return Err(EngineError::not_found("Supplier", id));
        }
        self.store.delete::<Supplier>(id).await?;
        self.suppliers.retain(|s| s.id != id);
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product to the active cart (or bumps its quantity).
    pub fn add_to_cart(&mut self, product_id: &str) -> EngineResult<()> {
        let product = self
            .product(product_id)
            .ok_or_else(|| EngineError::not_found("Product", product_id))?
            .clone();
        self.cart.add_product(&product);
        Ok(())
    }

    /// Merges a validated quantity/bonus/discount update into a cart line.
    pub fn update_cart_line(
        &mut self,
        product_id: &str,
        update: &CartLineUpdate,
    ) -> EngineResult<()> {
        self.cart.update_line(product_id, update)?;
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: &str) {
        self.cart.remove_line(product_id);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn cart_totals(&self) -> CartTotals {
        self.cart.totals()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Completes the sale in the active cart and returns the invoice number.
    ///
    /// ## Write Order (saga)
    /// 1. Invoice header + lines
    /// 2. Stock decrement per cart line (`stock -= quantity + bonus`)
    /// 3. Customer balance increment (`balance += total`, credit sales only)
    ///
    /// A failure at any step compensates the writes already applied before
    /// propagating; the engine's in-memory state never changes on failure.
    ///
    /// ## Errors
    /// - [`EngineError::EmptyCart`] when the cart has no lines
    /// - [`EngineError::NotFound`] when the customer or a cart line's
    ///   product no longer exists
    pub async fn complete_sale(
        &mut self,
        customer_id: Option<&str>,
        payment_method: PaymentMethod,
    ) -> EngineResult<String> {
        if self.cart.is_empty() {
            return Err(EngineError::EmptyCart);
        }

        let customer = match customer_id {
            Some(id) => Some(
                self.customer(id)
                    .ok_or_else(|| EngineError::not_found("Customer", id))?
                    .clone(),
            ),
            None => None,
        };

        // Resolve every cart line to a live product before writing anything
        let mut moves = Vec::with_capacity(self.cart.line_count());
        for line in self.cart.lines() {
            let product = self
                .product(&line.product_id)
                .ok_or_else(|| EngineError::not_found("Product", &line.product_id))?;
            moves.push(StockMove {
                product_id: product.id.clone(),
                old_stock: product.stock,
                new_stock: product.stock - line.stock_units(),
            });
        }

        let date = Local::now().date_naive();
        let used: HashSet<String> = self
            .invoices
            .iter()
            .map(|i| i.invoice_number.clone())
            .collect();
        let invoice_number = next_document_number("INV", date, &used)?;

        let invoice = Invoice::from_cart(
            Uuid::new_v4().to_string(),
            invoice_number.clone(),
            date,
            customer.as_ref(),
            payment_method,
            &self.cart,
        );

        // Step 1: the invoice write is itself a header row plus line rows,
        // so a failed line insert can strand the header. Deleting the
        // invoice removes whatever landed.
        if let Err(e) = self.store.create_invoice(&invoice).await {
            return Err(self.compensate_checkout(e, &invoice.id, &[]).await);
        }

        // Step 2: stock decrements
        let mut applied: Vec<StockMove> = Vec::new();
        for stock_move in &moves {
            let patch = json!({ "stock": stock_move.new_stock });
            if let Err(e) = self.store.update::<Product>(&stock_move.product_id, patch).await {
                return Err(self.compensate_checkout(e, &invoice.id, &applied).await);
            }
            if stock_move.new_stock < 0 {
                warn!(
                    product_id = %stock_move.product_id,
                    stock = stock_move.new_stock,
                    "Sale drove stock negative (backorder)"
                );
            }
            applied.push(stock_move.clone());
        }

        // Step 3: customer balance
        if let Some(customer) = &customer {
            let patch = json!({ "balance": customer.balance + invoice.total });
            if let Err(e) = self.store.update::<Customer>(&customer.id, patch).await {
                return Err(self.compensate_checkout(e, &invoice.id, &applied).await);
            }
        }

        // Every write landed; commit to memory
        for stock_move in moves {
            if let Some(product) = self.products.iter_mut().find(|p| p.id == stock_move.product_id)
            {
                product.stock = stock_move.new_stock;
            }
        }
        if let Some(customer) = &customer {
            if let Some(c) = self.customers.iter_mut().find(|c| c.id == customer.id) {
                c.balance += invoice.total;
            }
        }

        info!(
            invoice_number = %invoice_number,
            total = invoice.total,
            lines = invoice.items.len(),
            "Sale completed"
        );
        self.invoices.insert(0, invoice);
        self.cart.clear();
        Ok(invoice_number)
    }

    /// Undoes the checkout writes applied so far: stocks first, then the
    /// invoice. Returns the error checkout should propagate.
    async fn compensate_checkout(
        &self,
        original: StoreError,
        invoice_id: &str,
        applied: &[StockMove],
    ) -> EngineError {
        for stock_move in applied {
            let patch = json!({ "stock": stock_move.old_stock });
            if let Err(rollback) = self.store.update::<Product>(&stock_move.product_id, patch).await
            {
                return EngineError::RollbackFailed {
                    original: Box::new(original),
                    rollback: Box::new(rollback),
                };
            }
        }
        if let Err(rollback) = self.store.delete_invoice(invoice_id).await {
            return EngineError::RollbackFailed {
                original: Box::new(original),
                rollback: Box::new(rollback),
            };
        }

        warn!(error = %original, "Checkout write failed, compensated applied writes");
        EngineError::Store(original)
    }

    /// Composes the printable document for an invoice in the history.
    ///
    /// The customer's current balance feeds the previous-balance line; for
    /// a walk-in sale (or a since-deleted customer) it is zero.
    pub fn invoice_document(&self, invoice_id: &str) -> EngineResult<InvoiceDocument> {
        let invoice = self
            .invoices
            .iter()
            .find(|i| i.id == invoice_id)
            .ok_or_else(|| EngineError::not_found("Invoice", invoice_id))?;
        let customer = invoice
            .customer_id
            .as_deref()
            .and_then(|id| self.customer(id));
        Ok(InvoiceDocument::compose(invoice, customer, &self.settings)?)
    }

    /// Deletes an invoice from the store and the history. Stock and
    /// balances are NOT reverted; a deletion is a record correction, not a
    /// return.
    pub async fn delete_invoice(&mut self, id: &str) -> EngineResult<()> {
        if !self.invoices.iter().any(|i| i.id == id) {
            return Err(EngineError::not_found("Invoice", id));
        }
        self.store.delete_invoice(id).await?;
        self.invoices.retain(|i| i.id != id);
        Ok(())
    }

    // =========================================================================
    // Purchase Orders
    // =========================================================================

    /// Validates and persists a new purchase order.
    ///
    /// The engine fills in identity and derived fields: id, a checked
    /// `PO-YYYYMMDD-####` number, line totals, the order total and status
    /// Pending. The caller provides supplier, lines, delivery and notes.
    pub async fn create_purchase_order(
        &mut self,
        mut po: PurchaseOrder,
    ) -> EngineResult<PurchaseOrder> {
        if !self.suppliers.iter().any(|s| s.id == po.supplier_id) {
            return Err(EngineError::not_found("Supplier", &po.supplier_id));
        }
        validate_purchase_order(&po)?;

        let date = Local::now().date_naive();
        let used: HashSet<String> = self
            .purchase_orders
            .iter()
            .map(|p| p.po_number.clone())
            .collect();

        po.id = Uuid::new_v4().to_string();
        po.po_number = next_document_number("PO", date, &used)?;
        po.status = PurchaseOrderStatus::Pending;
        if po.order_date.is_empty() {
            po.order_date = date.format("%Y-%m-%d").to_string();
        }
        for line in &mut po.items {
            line.total = line.unit_price * line.quantity as f64;
            line.received_quantity = 0;
        }
        po.total_amount = po.items.iter().map(|l| l.total).sum();

        self.store.create_purchase_order(&po).await?;
        self.purchase_orders.insert(0, po.clone());
        Ok(po)
    }

    /// Rewrites a pending purchase order (lines, delivery, notes).
    pub async fn update_purchase_order(&mut self, mut po: PurchaseOrder) -> EngineResult<()> {
        let existing = self
            .purchase_orders
            .iter()
            .find(|p| p.id == po.id)
            .ok_or_else(|| EngineError::not_found("PurchaseOrder", &po.id))?;
        if existing.status != PurchaseOrderStatus::Pending {
            return Err(EngineError::NotPending {
                id: po.id.clone(),
                status: existing.status,
            });
        }
        validate_purchase_order(&po)?;

        for line in &mut po.items {
            line.total = line.unit_price * line.quantity as f64;
        }
        po.total_amount = po.items.iter().map(|l| l.total).sum();

        self.store.replace_purchase_order(&po).await?;
        if let Some(slot) = self.purchase_orders.iter_mut().find(|p| p.id == po.id) {
            *slot = po;
        }
        Ok(())
    }

    pub async fn delete_purchase_order(&mut self, id: &str) -> EngineResult<()> {
        if !self.purchase_orders.iter().any(|p| p.id == id) {
            return Err(EngineError::not_found("PurchaseOrder", id));
        }
        self.store.delete_purchase_order(id).await?;
        self.purchase_orders.retain(|p| p.id != id);
        Ok(())
    }

    /// Books a pending purchase order into stock.
    ///
    /// Each line's product gains the ordered quantity,
    /// `received_quantity` is set and the status flips to Received.
    ///
    /// ## Write Order (saga)
    /// 1. Stock increment per line
    /// 2. Line-row rewrite with the received quantities
    /// 3. Header status flip — last, and a single write, so the stored
    ///    order can never read `received` while its line rows are in doubt
    ///
    /// A failure at any step compensates what was applied: stocks are
    /// restored and, once step 2 has run, the original line rows are
    /// rewritten back.
    ///
    /// Lines whose product has been deleted since ordering are skipped
    /// with a warning; there is nothing left to restock.
    pub async fn receive_purchase_order(&mut self, id: &str) -> EngineResult<()> {
        let po = self
            .purchase_orders
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found("PurchaseOrder", id))?
            .clone();
        if po.status != PurchaseOrderStatus::Pending {
            return Err(EngineError::NotPending {
                id: id.to_string(),
                status: po.status,
            });
        }

        let mut moves = Vec::with_capacity(po.items.len());
        for line in &po.items {
            match self.product(&line.product_id) {
                Some(product) => moves.push(StockMove {
                    product_id: product.id.clone(),
                    old_stock: product.stock,
                    new_stock: product.stock + line.quantity,
                }),
                None => warn!(
                    product_id = %line.product_id,
                    po_number = %po.po_number,
                    "Ordered product no longer exists, skipping restock"
                ),
            }
        }

        let mut applied: Vec<StockMove> = Vec::new();
        for stock_move in &moves {
            let patch = json!({ "stock": stock_move.new_stock });
            if let Err(e) = self.store.update::<Product>(&stock_move.product_id, patch).await {
                return Err(self.compensate_receive(e, &applied, None).await);
            }
            applied.push(stock_move.clone());
        }

        let mut received = po.clone();
        received.status = PurchaseOrderStatus::Received;
        for line in &mut received.items {
            line.received_quantity = line.quantity;
        }
        if let Err(e) = self.store.rewrite_purchase_order_lines(&received).await {
            return Err(self.compensate_receive(e, &applied, Some(&po)).await);
        }

        // Status flip last, as a single write
        let status_patch = json!({ "status": PurchaseOrderStatus::Received });
        if let Err(e) = self.store.update::<PurchaseOrder>(&po.id, status_patch).await {
            return Err(self.compensate_receive(e, &applied, Some(&po)).await);
        }

        for stock_move in moves {
            if let Some(product) = self.products.iter_mut().find(|p| p.id == stock_move.product_id)
            {
                product.stock = stock_move.new_stock;
            }
        }
        info!(po_number = %received.po_number, "Purchase order received into stock");
        if let Some(slot) = self.purchase_orders.iter_mut().find(|p| p.id == id) {
            *slot = received;
        }
        Ok(())
    }

    /// Undoes the receiving writes applied so far: stock increments, and
    /// the line-row rewrite when it already ran (`restore_lines` carries
    /// the pre-receive order to write back).
    async fn compensate_receive(
        &self,
        original: StoreError,
        applied: &[StockMove],
        restore_lines: Option<&PurchaseOrder>,
    ) -> EngineError {
        for stock_move in applied {
            let patch = json!({ "stock": stock_move.old_stock });
            if let Err(rollback) = self.store.update::<Product>(&stock_move.product_id, patch).await
            {
                return EngineError::RollbackFailed {
                    original: Box::new(original),
                    rollback: Box::new(rollback),
                };
            }
        }
        if let Some(po) = restore_lines {
            if let Err(rollback) = self.store.rewrite_purchase_order_lines(po).await {
                return EngineError::RollbackFailed {
                    original: Box::new(original),
                    rollback: Box::new(rollback),
                };
            }
        }
        warn!(error = %original, "Receiving write failed, compensated applied writes");
        EngineError::Store(original)
    }

    // =========================================================================
    // Inventory Alerts
    // =========================================================================

    /// Products at or below their reorder level.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.stock <= p.reorder_level)
            .collect()
    }

    /// Products expiring within `days` from today, already-expired included.
    /// Products with an unparseable expiry date are skipped.
    pub fn expiring_soon(&self, days: i64) -> Vec<&Product> {
        let cutoff = Local::now().date_naive() + Duration::days(days);
        self.products
            .iter()
            .filter(|p| {
                NaiveDate::parse_from_str(&p.expiry, "%Y-%m-%d")
                    .map(|expiry| expiry <= cutoff)
                    .unwrap_or(false)
            })
            .collect()
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Persists new settings. When the store credentials changed, the
    /// backing store is rebuilt from the re-resolved configuration and all
    /// state is reloaded from it.
    pub async fn update_settings(&mut self, settings: Settings) -> EngineResult<()> {
        let credentials_changed = settings.service_url != self.settings.service_url
            || settings.service_key != self.settings.service_key;

        SettingsStore::new(&self.data_dir).save(&settings).await?;
        self.settings = settings;

        if credentials_changed {
            info!("Store credentials changed, reconnecting");
            let config = StoreConfig::resolve(&self.settings, &self.data_dir);
            self.store = Store::from_config(&config)?;
            self.load().await?;
        }
        Ok(())
    }
}

/// Serializes an entity into a full-record patch.
fn to_patch<T: serde::Serialize>(entity: &T) -> EngineResult<serde_json::Value> {
    Ok(serde_json::to_value(entity).map_err(StoreError::from)?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pharmapos_core::{PurchaseOrderLine, MONEY_EPSILON, WALK_IN_CUSTOMER};
    use pharmapos_store::{Backend, LocalBackend, StoreResult};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine_on(dir: &tempfile::TempDir) -> PharmacyEngine {
        let store = Store::new(Box::new(LocalBackend::new(dir.path())));
        PharmacyEngine::with_store(store, Settings::default(), dir.path())
    }

    fn product(id_hint: &str, price: f64, stock: i64) -> Product {
        Product {
            id: String::new(),
            item_code: id_hint.to_string(),
            name: format!("Product {}", id_hint),
            batch: "B123".to_string(),
            expiry: "2030-12-31".to_string(),
            price,
            stock,
            category: "Medicine".to_string(),
            reorder_level: 10,
            optimum_level: 100,
        }
    }

    fn customer(name: &str, balance: f64) -> Customer {
        Customer {
            id: String::new(),
            name: name.to_string(),
            phone: "0300-1234567".to_string(),
            email: None,
            address: None,
            balance,
        }
    }

    // -------------------------------------------------------------------------
    // Loading and seeding
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_fresh_local_store_is_seeded_once() {
        let dir = tempfile::tempdir().unwrap();

        let mut engine = engine_on(&dir);
        engine.load().await.unwrap();
        assert_eq!(engine.products().len(), 5);
        assert_eq!(engine.customers().len(), 2);

        // A second engine on the same directory sees the same data, not
        // a second copy of the seed
        let mut reopened = engine_on(&dir);
        reopened.load().await.unwrap();
        assert_eq!(reopened.products().len(), 5);
        assert_eq!(reopened.customers().len(), 2);
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_to_cart_unknown_product_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);

        let err = engine.add_to_cart("missing").unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "Product", .. }));
    }

    #[tokio::test]
    async fn test_add_to_cart_twice_merges() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine.add_to_cart(&p.id).unwrap();

        assert_eq!(engine.cart().line_count(), 1);
        assert_eq!(engine.cart().lines()[0].quantity, 2);
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_cart_sale_fails_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        engine.add_product(product("001", 5.0, 100)).await.unwrap();

        let err = engine.complete_sale(None, PaymentMethod::Cash).await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyCart));
        assert!(engine.invoices().is_empty());
        assert_eq!(engine.products()[0].stock, 100);
    }

    #[tokio::test]
    async fn test_sale_flow_totals_stock_and_balance() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p1 = engine.add_product(product("001", 5.0, 100)).await.unwrap();
        let p2 = engine.add_product(product("002", 12.5, 50)).await.unwrap();
        let c = engine.add_customer(customer("Pharmacy One", 0.0)).await.unwrap();

        engine.add_to_cart(&p1.id).unwrap();
        engine
            .update_cart_line(&p1.id, &CartLineUpdate { quantity: Some(10), ..Default::default() })
            .unwrap();
        engine.add_to_cart(&p2.id).unwrap();
        engine
            .update_cart_line(
                &p2.id,
                &CartLineUpdate {
                    quantity: Some(2),
                    discount: Some(10.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let number = engine
            .complete_sale(Some(&c.id), PaymentMethod::Credit)
            .await
            .unwrap();
        assert!(number.starts_with("INV-"));

        let invoice = &engine.invoices()[0];
        assert_eq!(invoice.invoice_number, number);
        assert!((invoice.subtotal - 75.0).abs() < MONEY_EPSILON);
        assert!((invoice.discount - 2.5).abs() < MONEY_EPSILON);
        assert!((invoice.total - 72.5).abs() < MONEY_EPSILON);
        assert_eq!(invoice.customer_name, "Pharmacy One");

        assert_eq!(engine.product(&p1.id).unwrap().stock, 90);
        assert_eq!(engine.product(&p2.id).unwrap().stock, 48);
        assert!((engine.customer(&c.id).unwrap().balance - 72.5).abs() < MONEY_EPSILON);
        assert!(engine.cart().is_empty());

        // All of it survived the round trip to the store
        let mut reopened = engine_on(&dir);
        reopened.load().await.unwrap();
        assert_eq!(reopened.invoices().len(), 1);
        assert_eq!(reopened.invoices()[0].items.len(), 2);
        assert_eq!(reopened.product(&p1.id).unwrap().stock, 90);
        assert!((reopened.customer(&c.id).unwrap().balance - 72.5).abs() < MONEY_EPSILON);
    }

    #[tokio::test]
    async fn test_walk_in_sale_touches_no_balance() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();
        let c = engine.add_customer(customer("Pharmacy One", 40.0)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine.complete_sale(None, PaymentMethod::Cash).await.unwrap();

        assert_eq!(engine.invoices()[0].customer_name, WALK_IN_CUSTOMER);
        assert!(engine.invoices()[0].customer_id.is_none());
        assert!((engine.customer(&c.id).unwrap().balance - 40.0).abs() < MONEY_EPSILON);
    }

    #[tokio::test]
    async fn test_bonus_units_deduct_stock_and_stock_may_go_negative() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 3)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine
            .update_cart_line(
                &p.id,
                &CartLineUpdate {
                    quantity: Some(3),
                    bonus: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();

        engine.complete_sale(None, PaymentMethod::Cash).await.unwrap();

        // 3 charged + 2 bonus against a stock of 3
        assert_eq!(engine.product(&p.id).unwrap().stock, -2);
        // Bonus units are free: total is 3 x 5.00
        assert!((engine.invoices()[0].total - 15.0).abs() < MONEY_EPSILON);
    }

    #[tokio::test]
    async fn test_consecutive_sales_get_distinct_invoice_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        let first = engine.complete_sale(None, PaymentMethod::Cash).await.unwrap();
        engine.add_to_cart(&p.id).unwrap();
        let second = engine.complete_sale(None, PaymentMethod::Cash).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_invoice_document_for_credit_sale() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();
        let c = engine.add_customer(customer("Pharmacy One", 0.0)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine
            .update_cart_line(&p.id, &CartLineUpdate { quantity: Some(10), ..Default::default() })
            .unwrap();
        engine
            .complete_sale(Some(&c.id), PaymentMethod::Credit)
            .await
            .unwrap();

        let doc = engine.invoice_document(&engine.invoices()[0].id.clone()).unwrap();
        // The sale already posted to the balance, so it shows as previous
        // balance and the total amount doubles up
        assert!((doc.totals.invoice_total - 50.0).abs() < MONEY_EPSILON);
        assert!((doc.totals.previous_balance - 50.0).abs() < MONEY_EPSILON);
        assert!((doc.totals.total_amount - 100.0).abs() < MONEY_EPSILON);
        assert_eq!(doc.meta.customer_name, "Pharmacy One");
        assert!(doc.render_text().contains("One Hundred Rupees Only."));
    }

    #[tokio::test]
    async fn test_delete_invoice() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine.complete_sale(None, PaymentMethod::Cash).await.unwrap();
        let id = engine.invoices()[0].id.clone();

        engine.delete_invoice(&id).await.unwrap();
        assert!(engine.invoices().is_empty());

        // Deleting does not refund stock
        assert_eq!(engine.product(&p.id).unwrap().stock, 99);

        let err = engine.delete_invoice(&id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    // -------------------------------------------------------------------------
    // Checkout compensation
    // -------------------------------------------------------------------------

    /// Backend double that fails writes to one table. Everything else
    /// passes through to a real local backend. `always` keeps the table
    /// down for good; `once` fails a single write and then recovers, which
    /// exercises the compensation paths end to end.
    struct FailingTableBackend {
        inner: LocalBackend,
        fail_table: &'static str,
        failures_left: AtomicUsize,
    }

    impl FailingTableBackend {
        fn always(inner: LocalBackend, fail_table: &'static str) -> Self {
            FailingTableBackend {
                inner,
                fail_table,
                failures_left: AtomicUsize::new(usize::MAX),
            }
        }

        fn once(inner: LocalBackend, fail_table: &'static str) -> Self {
            FailingTableBackend {
                inner,
                fail_table,
                failures_left: AtomicUsize::new(1),
            }
        }

        fn refuse(&self, table: &str) -> StoreResult<()> {
            if table != self.fail_table {
                return Ok(());
            }
            let left = self.failures_left.load(Ordering::SeqCst);
            if left == 0 {
                return Ok(());
            }
            if left != usize::MAX {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
            }
            Err(StoreError::Api {
                status: 503,
                message: format!("{} is down", table),
            })
        }
    }

    #[async_trait]
    impl Backend for FailingTableBackend {
        fn kind(&self) -> &'static str {
            "failing"
        }

        async fn list(&self, table: &str) -> StoreResult<Vec<Value>> {
            self.inner.list(table).await
        }

        async fn insert(&self, table: &str, record: Value) -> StoreResult<Value> {
            self.refuse(table)?;
            self.inner.insert(table, record).await
        }

        async fn update(&self, table: &str, id: &str, patch: Value) -> StoreResult<()> {
            self.refuse(table)?;
            self.inner.update(table, id, patch).await
        }

        async fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
            self.inner.delete(table, id).await
        }

        async fn delete_matching(&self, table: &str, column: &str, value: &str) -> StoreResult<()> {
            self.inner.delete_matching(table, column, value).await
        }

        async fn count(&self, table: &str) -> StoreResult<u64> {
            self.inner.count(table).await
        }
    }

    #[tokio::test]
    async fn test_failed_balance_write_rolls_back_stock_and_invoice() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(Box::new(FailingTableBackend::always(
            LocalBackend::new(dir.path()),
            "customers",
        )));
        let mut engine = PharmacyEngine::with_store(store, Settings::default(), dir.path());

        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();
        // Insert the customer behind the failing backend's back so only the
        // balance update can fail
        LocalBackend::new(dir.path())
            .insert(
                "customers",
                serde_json::to_value(Customer {
                    id: "c1".to_string(),
                    ..customer("Pharmacy One", 0.0)
                })
                .unwrap(),
            )
            .await
            .unwrap();
        engine.load().await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        let err = engine
            .complete_sale(Some("c1"), PaymentMethod::Credit)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(StoreError::Api { .. })));

        // Engine state untouched
        assert!(engine.invoices().is_empty());
        assert_eq!(engine.product(&p.id).unwrap().stock, 100);
        assert_eq!(engine.cart().line_count(), 1);

        // Store state compensated: no invoice, stock restored
        let check = LocalBackend::new(dir.path());
        assert_eq!(check.count("invoices").await.unwrap(), 0);
        assert_eq!(check.count("invoice_items").await.unwrap(), 0);
        let products = check.list("products").await.unwrap();
        assert_eq!(products[0]["stock"], 100);
    }

    #[tokio::test]
    async fn test_failed_line_write_removes_stranded_invoice_header() {
        let dir = tempfile::tempdir().unwrap();
        // The header insert succeeds, every line insert fails
        let store = Store::new(Box::new(FailingTableBackend::always(
            LocalBackend::new(dir.path()),
            "invoice_items",
        )));
        let mut engine = PharmacyEngine::with_store(store, Settings::default(), dir.path());
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        let err = engine.complete_sale(None, PaymentMethod::Cash).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        assert!(engine.invoices().is_empty());
        assert_eq!(engine.product(&p.id).unwrap().stock, 100);

        // No stranded header: a reload must not surface a phantom invoice
        let check = LocalBackend::new(dir.path());
        assert_eq!(check.count("invoices").await.unwrap(), 0);
        assert_eq!(check.count("invoice_items").await.unwrap(), 0);
        let mut reopened = engine_on(&dir);
        reopened.load().await.unwrap();
        assert!(reopened.invoices().is_empty());
    }

    #[tokio::test]
    async fn test_failed_invoice_write_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(Box::new(FailingTableBackend::always(
            LocalBackend::new(dir.path()),
            "invoices",
        )));
        let mut engine = PharmacyEngine::with_store(store, Settings::default(), dir.path());
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        let err = engine.complete_sale(None, PaymentMethod::Cash).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        assert!(engine.invoices().is_empty());
        assert_eq!(engine.product(&p.id).unwrap().stock, 100);
    }

    // -------------------------------------------------------------------------
    // Entity CRUD
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_product_validation_blocks_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);

        let err = engine.add_product(product("001", -1.0, 10)).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(engine.products().is_empty());
        assert_eq!(engine.store.count("products").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_product_rewrites_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let mut p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        p.price = 6.0;
        p.batch = "B999".to_string();
        engine.update_product(p.clone()).await.unwrap();
        assert_eq!(engine.product(&p.id).unwrap().batch, "B999");

        let mut reopened = engine_on(&dir);
        reopened.load().await.unwrap();
        assert!((reopened.product(&p.id).unwrap().price - 6.0).abs() < MONEY_EPSILON);
    }

    #[tokio::test]
    async fn test_delete_product_drops_cart_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine.delete_product(&p.id).await.unwrap();

        assert!(engine.products().is_empty());
        assert!(engine.cart().is_empty());
    }

    #[tokio::test]
    async fn test_invoice_keeps_snapshot_after_product_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let mut p = engine.add_product(product("001", 5.0, 100)).await.unwrap();

        engine.add_to_cart(&p.id).unwrap();
        engine.complete_sale(None, PaymentMethod::Cash).await.unwrap();

        p.price = 99.0;
        p.name = "Renamed".to_string();
        engine.update_product(p).await.unwrap();

        let line = &engine.invoices()[0].items[0];
        assert_eq!(line.name, "Product 001");
        assert!((line.price - 5.0).abs() < MONEY_EPSILON);
    }

    // -------------------------------------------------------------------------
    // Purchase orders
    // -------------------------------------------------------------------------

    fn draft_po(supplier_id: &str, product_id: &str, quantity: i64, unit_price: f64) -> PurchaseOrder {
        PurchaseOrder {
            id: String::new(),
            po_number: String::new(),
            supplier_id: supplier_id.to_string(),
            order_date: String::new(),
            expected_delivery: "2030-01-15".to_string(),
            status: PurchaseOrderStatus::Pending,
            notes: String::new(),
            total_amount: 0.0,
            items: vec![PurchaseOrderLine {
                product_id: product_id.to_string(),
                name: "Product 001".to_string(),
                quantity,
                unit_price,
                total: 0.0,
                received_quantity: 0,
            }],
        }
    }

    async fn supplier_fixture(engine: &mut PharmacyEngine) -> Supplier {
        engine
            .add_supplier(Supplier {
                id: String::new(),
                name: "MedSupply Co".to_string(),
                contact_person: "Ali Raza".to_string(),
                phone: "042-1234567".to_string(),
                email: None,
                address: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_purchase_order_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 10)).await.unwrap();
        let s = supplier_fixture(&mut engine).await;

        let po = engine
            .create_purchase_order(draft_po(&s.id, &p.id, 40, 3.5))
            .await
            .unwrap();
        assert!(po.po_number.starts_with("PO-"));
        assert!((po.total_amount - 140.0).abs() < MONEY_EPSILON);
        assert_eq!(po.status, PurchaseOrderStatus::Pending);

        engine.receive_purchase_order(&po.id).await.unwrap();

        assert_eq!(engine.product(&p.id).unwrap().stock, 50);
        let received = &engine.purchase_orders()[0];
        assert_eq!(received.status, PurchaseOrderStatus::Received);
        assert_eq!(received.items[0].received_quantity, 40);

        // Receiving twice is rejected
        let err = engine.receive_purchase_order(&po.id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotPending { .. }));
        assert_eq!(engine.product(&p.id).unwrap().stock, 50);
    }

    #[tokio::test]
    async fn test_create_purchase_order_requires_known_supplier() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);
        let p = engine.add_product(product("001", 5.0, 10)).await.unwrap();

        let err = engine
            .create_purchase_order(draft_po("missing", &p.id, 10, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "Supplier", .. }));
    }

    #[tokio::test]
    async fn test_failed_receive_restores_stock() {
        let dir = tempfile::tempdir().unwrap();
        // purchase_orders table refuses writes, so the final status flip
        // fails after the stock increment and line rewrite landed
        let store = Store::new(Box::new(FailingTableBackend::always(
            LocalBackend::new(dir.path()),
            "purchase_orders",
        )));
        let mut engine = PharmacyEngine::with_store(store, Settings::default(), dir.path());
        let p = engine.add_product(product("001", 5.0, 10)).await.unwrap();
        let s = supplier_fixture(&mut engine).await;

        // Create the order behind the failing backend's back
        let local = Store::new(Box::new(LocalBackend::new(dir.path())));
        let mut po = draft_po(&s.id, &p.id, 40, 3.5);
        po.id = "po1".to_string();
        po.po_number = "PO-20240315-1000".to_string();
        po.order_date = "2024-03-15".to_string();
        local.create_purchase_order(&po).await.unwrap();
        engine.load().await.unwrap();

        let err = engine.receive_purchase_order("po1").await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        // Stock compensated in both memory and the store
        assert_eq!(engine.product(&p.id).unwrap().stock, 10);
        let check = LocalBackend::new(dir.path());
        let products = check.list("products").await.unwrap();
        assert_eq!(products[0]["stock"], 10);
        assert_eq!(
            engine.purchase_orders()[0].status,
            PurchaseOrderStatus::Pending
        );

        // Stored header never flipped and the line rows were written back
        let orders = check.list("purchase_orders").await.unwrap();
        assert_eq!(orders[0]["status"], "pending");
        let lines = check.list("purchase_order_items").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["received_quantity"], 0);
    }

    #[tokio::test]
    async fn test_failed_line_rewrite_restores_order_lines() {
        let dir = tempfile::tempdir().unwrap();
        // One refused write: the received-quantity rewrite fails, then the
        // compensating rewrite of the original lines goes through
        let store = Store::new(Box::new(FailingTableBackend::once(
            LocalBackend::new(dir.path()),
            "purchase_order_items",
        )));
        let mut engine = PharmacyEngine::with_store(store, Settings::default(), dir.path());
        let p = engine.add_product(product("001", 5.0, 10)).await.unwrap();
        let s = supplier_fixture(&mut engine).await;

        let local = Store::new(Box::new(LocalBackend::new(dir.path())));
        let mut po = draft_po(&s.id, &p.id, 40, 3.5);
        po.id = "po1".to_string();
        po.po_number = "PO-20240315-1000".to_string();
        po.order_date = "2024-03-15".to_string();
        local.create_purchase_order(&po).await.unwrap();
        engine.load().await.unwrap();

        let err = engine.receive_purchase_order("po1").await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        // Everything back where it was: stock, header status, line rows
        assert_eq!(engine.product(&p.id).unwrap().stock, 10);
        assert_eq!(
            engine.purchase_orders()[0].status,
            PurchaseOrderStatus::Pending
        );
        let check = LocalBackend::new(dir.path());
        let products = check.list("products").await.unwrap();
        assert_eq!(products[0]["stock"], 10);
        let orders = check.list("purchase_orders").await.unwrap();
        assert_eq!(orders[0]["status"], "pending");
        let lines = check.list("purchase_order_items").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["received_quantity"], 0);
    }

    #[tokio::test]
    async fn test_stuck_line_table_never_flips_stored_order() {
        let dir = tempfile::tempdir().unwrap();
        // Line table down for good: the rewrite fails and so does the
        // compensating rewrite, which is a rollback failure. The header
        // write was never issued, so the stored order stays pending.
        let store = Store::new(Box::new(FailingTableBackend::always(
            LocalBackend::new(dir.path()),
            "purchase_order_items",
        )));
        let mut engine = PharmacyEngine::with_store(store, Settings::default(), dir.path());
        let p = engine.add_product(product("001", 5.0, 10)).await.unwrap();
        let s = supplier_fixture(&mut engine).await;

        let local = Store::new(Box::new(LocalBackend::new(dir.path())));
        let mut po = draft_po(&s.id, &p.id, 40, 3.5);
        po.id = "po1".to_string();
        po.po_number = "PO-20240315-1000".to_string();
        po.order_date = "2024-03-15".to_string();
        local.create_purchase_order(&po).await.unwrap();
        engine.load().await.unwrap();

        let err = engine.receive_purchase_order("po1").await.unwrap_err();
        assert!(matches!(err, EngineError::RollbackFailed { .. }));

        // Stocks were compensated before the line restore gave up
        let check = LocalBackend::new(dir.path());
        let products = check.list("products").await.unwrap();
        assert_eq!(products[0]["stock"], 10);
        let orders = check.list("purchase_orders").await.unwrap();
        assert_eq!(orders[0]["status"], "pending");
        assert_eq!(
            engine.purchase_orders()[0].status,
            PurchaseOrderStatus::Pending
        );
    }

    // -------------------------------------------------------------------------
    // Inventory alerts
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_low_stock_and_expiring_soon() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);

        let mut low = product("001", 5.0, 10);
        low.reorder_level = 10;
        engine.add_product(low).await.unwrap();

        let mut fine = product("002", 5.0, 80);
        fine.reorder_level = 10;
        engine.add_product(fine).await.unwrap();

        let mut expired = product("003", 5.0, 80);
        expired.expiry = "2020-01-01".to_string();
        engine.add_product(expired).await.unwrap();

        let mut unparseable = product("004", 5.0, 80);
        unparseable.expiry = "soon".to_string();
        engine.add_product(unparseable).await.unwrap();

        let low_stock = engine.low_stock();
        assert_eq!(low_stock.len(), 1);
        assert_eq!(low_stock[0].item_code, "001");

        // "003" is long expired; "001"/"002" expire 2030; "004" is skipped
        let expiring = engine.expiring_soon(30);
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].item_code, "003");
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_settings_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_on(&dir);

        let mut settings = Settings::default();
        settings.name = "City Pharmacy".to_string();
        engine.update_settings(settings).await.unwrap();
        assert_eq!(engine.settings().name, "City Pharmacy");

        let saved = SettingsStore::new(dir.path()).load().await.unwrap();
        assert_eq!(saved.name, "City Pharmacy");
    }
}
