//! # Domain Types
//!
//! Canonical entity definitions for PharmaPOS.
//!
//! ## One Schema, One Spelling
//! Every entity has exactly one canonical shape, with snake_case field names
//! that match the persisted column names. The previous system let the same
//! record circulate as `itemCode` in one place and `item_code` in another;
//! here any field-name translation happens at the persistence boundary only,
//! and inside the engine there is nothing to translate.
//!
//! ## Identity
//! All entities carry a UUID v4 string id. Ids are generated before a record
//! is persisted, never by the backing store, so the same record keeps its
//! identity whether it lives in a JSON file or a remote table.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Product
// =============================================================================

/// A stocked pharmacy item.
///
/// ## Mutation Points
/// - Inventory edits (price, batch, levels)
/// - Checkout: `stock` is decremented by quantity + bonus per cart line
/// - Purchase-order receiving: `stock` is incremented by ordered quantity
///
/// ## Stock Can Go Negative
/// Checkout never blocks on stock. A sale that outruns inventory drives
/// `stock` below zero and the engine logs a warning; the negative value acts
/// as a backorder marker until receiving catches up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Entity UUID
    pub id: String,

    /// Short human-entered code shown on invoices (e.g. "001")
    pub item_code: String,

    /// Display name (e.g. "Paracetamol 500mg")
    pub name: String,

    /// Manufacturer batch number (e.g. "B123")
    pub batch: String,

    /// Expiry date as YYYY-MM-DD
    pub expiry: String,

    /// Unit price. Non-negative, validated on create/update.
    pub price: f64,

    /// On-hand quantity. Signed: negative means backordered.
    pub stock: i64,

    /// Free-form category (e.g. "Antibiotic")
    pub category: String,

    /// Stock level at or below which the item shows up in low-stock alerts.
    /// Alerting only, never enforced by checkout.
    #[serde(default)]
    pub reorder_level: i64,

    /// Target stock level used when suggesting reorder quantities.
    #[serde(default)]
    pub optimum_level: i64,
}

// =============================================================================
// Customer
// =============================================================================

/// A credit customer.
///
/// `balance` is a signed running accumulator of invoice totals: every
/// completed sale for this customer adds the invoice total to it. Payments
/// against the balance are out of scope for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Running balance. Defaults to zero when the backing schema has no
    /// balance column (partial remote schemas are tolerated).
    #[serde(default)]
    pub balance: f64,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier purchase orders are placed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Invoice
// =============================================================================

/// How a sale was settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Credit,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::Credit => write!(f, "Credit"),
        }
    }
}

/// A single invoice line, frozen at sale time.
///
/// ## Point-In-Time Snapshot
/// Fields are copied out of the cart line when the sale completes. Editing or
/// deleting the underlying Product later must not change what the invoice
/// says was sold, so there is no product_id reference here at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub item_code: String,
    pub name: String,
    pub batch: String,
    pub expiry: String,
    /// Units charged for
    pub quantity: i64,
    /// Unit price at sale time
    pub price: f64,
    /// Free units given with the sale. Deducted from stock, excluded from
    /// revenue.
    #[serde(default)]
    pub bonus: i64,
    /// Line discount in percent (0-100)
    #[serde(default)]
    pub discount: f64,
}

impl InvoiceLine {
    /// Line amount before discount.
    pub fn gross(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Discount amount for this line.
    pub fn discount_amount(&self) -> f64 {
        self.gross() * self.discount / 100.0
    }

    /// Line amount after discount.
    pub fn net(&self) -> f64 {
        self.gross() - self.discount_amount()
    }
}

/// A completed sale.
///
/// Created exactly once by checkout and immutable afterwards except for
/// deletion. Stored aggregates (`subtotal`, `discount`, `total`) are written
/// from the same math the cart used; the printable document recomputes them
/// from the lines rather than trusting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Generated as INV-YYYYMMDD-#### with a checked, monotonic suffix
    pub invoice_number: String,
    /// None for a walk-in sale
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Customer display name frozen at sale time
    pub customer_name: String,
    /// Sale date as YYYY-MM-DD
    pub date: String,
    /// Sum of line gross amounts
    pub subtotal: f64,
    /// Sum of line discount amounts
    pub discount: f64,
    /// Grand total (subtotal - discount)
    pub total: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Ordered line snapshots. Persisted in a separate table remotely, so
    /// a bare invoice row deserializes with an empty list and the store
    /// joins the lines back in.
    #[serde(default)]
    pub items: Vec<InvoiceLine>,
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// Purchase order lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    /// Ordered, not yet delivered
    #[default]
    Pending,
    /// Delivered and booked into stock
    Received,
    /// Abandoned before delivery
    Cancelled,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseOrderStatus::Pending => write!(f, "pending"),
            PurchaseOrderStatus::Received => write!(f, "received"),
            PurchaseOrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One ordered item on a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// Product this line restocks
    pub product_id: String,
    /// Product name at order time
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// quantity * unit_price, stored for display
    pub total: f64,
    /// Units booked into stock so far. Set to `quantity` on receiving.
    #[serde(default)]
    pub received_quantity: i64,
}

/// An order placed with a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    /// Generated as PO-YYYYMMDD-#### with the same checked numbering scheme
    /// invoices use
    pub po_number: String,
    pub supplier_id: String,
    /// Order date as YYYY-MM-DD
    pub order_date: String,
    #[serde(default)]
    pub expected_delivery: String,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub notes: String,
    pub total_amount: f64,
    #[serde(default)]
    pub items: Vec<PurchaseOrderLine>,
}

// =============================================================================
// Settings
// =============================================================================

/// Pharmacy profile plus optional remote-store override credentials.
///
/// One instance per process. Persisted to a local JSON file on every change;
/// changing the credentials makes the engine rebuild its persistence adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Pharmacy display name, printed on invoices
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Pharmacy license number, printed on invoices
    pub license: String,
    /// Free-form footer message for invoices
    #[serde(default)]
    pub invoice_notes: String,
    /// Remote table-store URL override. When both this and `service_key` are
    /// set they take priority over environment configuration.
    #[serde(default)]
    pub service_url: Option<String>,
    /// Remote table-store access key override
    #[serde(default)]
    pub service_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            name: "PharmaPOS".to_string(),
            address: "123 Medical Center, Main Road".to_string(),
            phone: "0300-0000000".to_string(),
            license: "L-123456".to_string(),
            invoice_notes: String::new(),
            service_url: None,
            service_key: None,
        }
    }
}

impl Settings {
    /// Returns the credential override pair when both halves are present.
    pub fn credential_override(&self) -> Option<(&str, &str)> {
        match (self.service_url.as_deref(), self.service_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_line_math() {
        let line = InvoiceLine {
            item_code: "001".to_string(),
            name: "Paracetamol 500mg".to_string(),
            batch: "B123".to_string(),
            expiry: "2025-12-31".to_string(),
            quantity: 2,
            price: 12.50,
            bonus: 0,
            discount: 10.0,
        };

        assert!((line.gross() - 25.0).abs() < 1e-9);
        assert!((line.discount_amount() - 2.5).abs() < 1e-9);
        assert!((line.net() - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_bare_invoice_row_deserializes_without_items() {
        // A remote invoices row has no items column; lines live in a
        // separate table and are joined back by the store.
        let row = r#"{
            "id": "abc",
            "invoice_number": "INV-20240101-1000",
            "customer_id": null,
            "customer_name": "Walk-in",
            "date": "2024-01-01",
            "subtotal": 10.0,
            "discount": 0.0,
            "total": 10.0
        }"#;

        let invoice: Invoice = serde_json::from_str(row).unwrap();
        assert!(invoice.items.is_empty());
        assert_eq!(invoice.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_customer_defaults_balance_when_column_missing() {
        let row = r#"{"id": "c1", "name": "Pharmacy One", "phone": "0321-9876543"}"#;
        let customer: Customer = serde_json::from_str(row).unwrap();
        assert_eq!(customer.balance, 0.0);
        assert!(customer.email.is_none());
    }

    #[test]
    fn test_settings_credential_override() {
        let mut settings = Settings::default();
        assert!(settings.credential_override().is_none());

        settings.service_url = Some("https://example.supabase.co".to_string());
        assert!(settings.credential_override().is_none());

        settings.service_key = Some("anon-key".to_string());
        assert_eq!(
            settings.credential_override(),
            Some(("https://example.supabase.co", "anon-key"))
        );
    }
}
