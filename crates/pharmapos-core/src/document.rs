//! # Invoice Document
//!
//! Composes a printable invoice document from an invoice record, the
//! customer it belongs to (if any) and the pharmacy settings.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Header        pharmacy name / address / phone / license               │
//! │  Meta block    invoice number, date, order type │ customer, remarks    │
//! │  Line table    code, name, batch, expiry, qty, bonus, rate,            │
//! │                gross, disc%, net                                       │
//! │  Totals        gross, discount, invoice total,                         │
//! │                previous balance, total amount                          │
//! │  Words         total amount rendered in words                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Never Trust Stored Aggregates
//! Every displayed amount is recomputed from the line snapshots. The stored
//! `subtotal`/`discount`/`total` fields are written by the same math, but the
//! document derives its own numbers so display consistency survives any
//! future drift in persisted records.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::types::{Customer, Invoice, Settings};
use crate::words::amount_in_words;

/// Sale order type printed in the meta block. The engine only produces
/// regular sales.
const ORDER_TYPE: &str = "REGULAR";

// =============================================================================
// Document Structure
// =============================================================================

/// Pharmacy identity block at the top of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub pharmacy_name: String,
    pub address: String,
    pub phone: String,
    pub license: String,
}

/// Two-column metadata block under the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaBlock {
    pub invoice_number: String,
    /// Formatted as DD/MM/YYYY
    pub invoice_date: String,
    pub order_type: String,
    pub customer_name: String,
    /// Payment method, printed under "Remarks"
    pub remarks: String,
}

/// One row of the line-item table, fully derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub item_code: String,
    pub name: String,
    pub batch: String,
    pub expiry: String,
    pub quantity: i64,
    pub bonus: i64,
    pub rate: f64,
    pub gross: f64,
    pub discount_percent: f64,
    pub net: f64,
}

/// Totals block, fully derived from the lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsBlock {
    /// Sum of charged quantities across lines
    pub total_items: i64,
    pub gross_amount: f64,
    pub discount_amount: f64,
    /// gross_amount - discount_amount
    pub invoice_total: f64,
    /// The customer's running balance at composition time; zero for walk-in
    pub previous_balance: f64,
    /// invoice_total + previous_balance
    pub total_amount: f64,
}

/// A fully composed, printable invoice document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub header: DocumentHeader,
    pub meta: MetaBlock,
    pub lines: Vec<DocumentLine>,
    pub totals: TotalsBlock,
    /// `totals.total_amount` rendered in words
    pub amount_in_words: String,
    /// Free-form footer from settings
    pub footer_notes: String,
}

// =============================================================================
// Composition
// =============================================================================

impl InvoiceDocument {
    /// Composes the document. Pure function of its three inputs.
    ///
    /// ## Arguments
    /// * `invoice` - The sale record; only its lines and identity fields are
    ///   trusted, amounts are recomputed
    /// * `customer` - Supplies the previous balance; `None` means walk-in
    /// * `settings` - Pharmacy display fields
    pub fn compose(
        invoice: &Invoice,
        customer: Option<&Customer>,
        settings: &Settings,
    ) -> CoreResult<InvoiceDocument> {
        let lines: Vec<DocumentLine> = invoice
            .items
            .iter()
            .map(|item| DocumentLine {
                item_code: item.item_code.clone(),
                name: item.name.clone(),
                batch: item.batch.clone(),
                expiry: item.expiry.clone(),
                quantity: item.quantity,
                bonus: item.bonus,
                rate: item.price,
                gross: item.gross(),
                discount_percent: item.discount,
                net: item.net(),
            })
            .collect();

        let gross_amount: f64 = lines.iter().map(|l| l.gross).sum();
        let discount_amount: f64 = lines.iter().map(|l| l.gross - l.net).sum();
        let invoice_total = gross_amount - discount_amount;
        let previous_balance = customer.map(|c| c.balance).unwrap_or(0.0);
        let total_amount = invoice_total + previous_balance;

        Ok(InvoiceDocument {
            header: DocumentHeader {
                pharmacy_name: settings.name.clone(),
                address: settings.address.clone(),
                phone: settings.phone.clone(),
                license: settings.license.clone(),
            },
            meta: MetaBlock {
                invoice_number: invoice.invoice_number.clone(),
                invoice_date: display_date(&invoice.date),
                order_type: ORDER_TYPE.to_string(),
                customer_name: invoice.customer_name.clone(),
                remarks: invoice.payment_method.to_string(),
            },
            totals: TotalsBlock {
                total_items: lines.iter().map(|l| l.quantity).sum(),
                gross_amount,
                discount_amount,
                invoice_total,
                previous_balance,
                total_amount,
            },
            amount_in_words: amount_in_words(total_amount)?,
            footer_notes: settings.invoice_notes.clone(),
            lines,
        })
    }

    /// Renders the fixed printable layout as plain text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(96);
        let thin = "-".repeat(96);

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("{:^96}\n", self.header.pharmacy_name.to_uppercase()));
        out.push_str(&format!("{:^96}\n", self.header.address));
        out.push_str(&format!(
            "{:^96}\n",
            format!("Phone: {}   License: {}", self.header.phone, self.header.license)
        ));
        out.push_str(&rule);
        out.push('\n');

        out.push_str(&format!(
            "{:<18}{:<30}{:<12}{}\n",
            "Invoice #:", self.meta.invoice_number, "Customer:", self.meta.customer_name
        ));
        out.push_str(&format!(
            "{:<18}{:<30}{:<12}{}\n",
            "Invoice Date:", self.meta.invoice_date, "Remarks:", self.meta.remarks
        ));
        out.push_str(&format!(
            "{:<18}{:<30}\n",
            "Sale Order Type:", self.meta.order_type
        ));
        out.push_str(&thin);
        out.push('\n');

        out.push_str(&format!(
            "{:<8}{:<26}{:<8}{:<12}{:>5}{:>6}{:>9}{:>10}{:>6}{:>10}\n",
            "Code", "Item Name", "Batch", "Expiry", "Qty", "Bonus", "Rate", "Gross", "Disc%", "Net"
        ));
        out.push_str(&thin);
        out.push('\n');
        for line in &self.lines {
            out.push_str(&format!(
                "{:<8}{:<26}{:<8}{:<12}{:>5}{:>6}{:>9.2}{:>10.2}{:>6.1}{:>10.2}\n",
                line.item_code,
                truncate(&line.name, 25),
                line.batch,
                line.expiry,
                line.quantity,
                line.bonus,
                line.rate,
                line.gross,
                line.discount_percent,
                line.net
            ));
        }
        out.push_str(&thin);
        out.push('\n');

        out.push_str(&format!("Total Items: {}\n", self.totals.total_items));
        out.push_str(&format!("{:>76}{:>20.2}\n", "Gross Amount:", self.totals.gross_amount));
        out.push_str(&format!(
            "{:>76}{:>20.2}\n",
            "Discount Amount:", self.totals.discount_amount
        ));
        out.push_str(&format!(
            "{:>76}{:>20.2}\n",
            "Invoice Total:", self.totals.invoice_total
        ));
        out.push_str(&format!(
            "{:>76}{:>20.2}\n",
            "Previous Balance:", self.totals.previous_balance
        ));
        out.push_str(&format!(
            "{:>76}{:>20.2}\n",
            "Total Amount:", self.totals.total_amount
        ));
        out.push_str(&thin);
        out.push('\n');
        out.push_str(&format!("{:^96}\n", format!("--{}--", self.amount_in_words)));
        if !self.footer_notes.is_empty() {
            out.push_str(&format!("{:^96}\n", self.footer_notes));
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }
}

/// Reformats YYYY-MM-DD into DD/MM/YYYY. Falls back to the raw string when
/// the stored date does not parse.
fn display_date(date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InvoiceLine, PaymentMethod};

    fn test_invoice() -> Invoice {
        Invoice {
            id: "inv-1".to_string(),
            invoice_number: "INV-20240315-1000".to_string(),
            customer_id: Some("c1".to_string()),
            customer_name: "Dr. Gulam Murtaza".to_string(),
            date: "2024-03-15".to_string(),
            // Deliberately wrong stored aggregates; compose must ignore them
            subtotal: 999.0,
            discount: 999.0,
            total: 999.0,
            payment_method: PaymentMethod::Cash,
            items: vec![
                InvoiceLine {
                    item_code: "001".to_string(),
                    name: "Paracetamol 500mg".to_string(),
                    batch: "B123".to_string(),
                    expiry: "2025-12-31".to_string(),
                    quantity: 10,
                    price: 5.0,
                    bonus: 0,
                    discount: 0.0,
                },
                InvoiceLine {
                    item_code: "002".to_string(),
                    name: "Amoxicillin 250mg".to_string(),
                    batch: "B124".to_string(),
                    expiry: "2024-10-20".to_string(),
                    quantity: 2,
                    price: 12.5,
                    bonus: 1,
                    discount: 10.0,
                },
            ],
        }
    }

    fn test_customer(balance: f64) -> Customer {
        Customer {
            id: "c1".to_string(),
            name: "Dr. Gulam Murtaza".to_string(),
            phone: "0300-1234567".to_string(),
            email: None,
            address: None,
            balance,
        }
    }

    #[test]
    fn test_compose_recomputes_and_ignores_stored_aggregates() {
        let doc =
            InvoiceDocument::compose(&test_invoice(), Some(&test_customer(0.0)), &Settings::default())
                .unwrap();

        assert!((doc.totals.gross_amount - 75.0).abs() < 1e-9);
        assert!((doc.totals.discount_amount - 2.5).abs() < 1e-9);
        assert!((doc.totals.invoice_total - 72.5).abs() < 1e-9);
    }

    #[test]
    fn test_previous_balance_feeds_total_amount() {
        let doc = InvoiceDocument::compose(
            &test_invoice(),
            Some(&test_customer(100.0)),
            &Settings::default(),
        )
        .unwrap();

        assert!((doc.totals.previous_balance - 100.0).abs() < 1e-9);
        assert!((doc.totals.total_amount - 172.5).abs() < 1e-9);
        assert_eq!(
            doc.amount_in_words,
            "One Hundred Seventy Two Rupees and Fifty Paisa Only."
        );
    }

    #[test]
    fn test_walk_in_has_zero_previous_balance() {
        let mut invoice = test_invoice();
        invoice.customer_id = None;
        invoice.customer_name = "Walk-in".to_string();

        let doc = InvoiceDocument::compose(&invoice, None, &Settings::default()).unwrap();
        assert_eq!(doc.totals.previous_balance, 0.0);
        assert!((doc.totals.total_amount - 72.5).abs() < 1e-9);
    }

    #[test]
    fn test_meta_block() {
        let doc =
            InvoiceDocument::compose(&test_invoice(), None, &Settings::default()).unwrap();
        assert_eq!(doc.meta.invoice_date, "15/03/2024");
        assert_eq!(doc.meta.order_type, "REGULAR");
        assert_eq!(doc.meta.remarks, "Cash");
    }

    #[test]
    fn test_render_text_contains_key_sections() {
        let doc = InvoiceDocument::compose(
            &test_invoice(),
            Some(&test_customer(0.0)),
            &Settings::default(),
        )
        .unwrap();
        let text = doc.render_text();

        assert!(text.contains("PHARMAPOS"));
        assert!(text.contains("INV-20240315-1000"));
        assert!(text.contains("Paracetamol 500mg"));
        assert!(text.contains("Total Items: 12"));
        assert!(text.contains("Seventy Two Rupees and Fifty Paisa Only."));
    }

    #[test]
    fn test_total_items_counts_charged_units_only() {
        // bonus units are stock, not sold items
        let doc =
            InvoiceDocument::compose(&test_invoice(), None, &Settings::default()).unwrap();
        assert_eq!(doc.totals.total_items, 12);
    }
}
