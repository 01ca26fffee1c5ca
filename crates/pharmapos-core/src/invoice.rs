//! # Invoice Construction
//!
//! Builds invoice records from the active cart and issues checked document
//! numbers.
//!
//! ## Checked Numbering
//! Document numbers have the shape `INV-YYYYMMDD-####` (invoices) and
//! `PO-YYYYMMDD-####` (purchase orders). The previous system drew the
//! four-digit suffix at random without a uniqueness check, a latent
//! collision bug. Here the suffix is a per-day monotonic counter starting at
//! 1000, and the generator is given the set of numbers already in use so a
//! collision cannot be issued.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::types::{Customer, Invoice, PaymentMethod};
use crate::WALK_IN_CUSTOMER;

/// First suffix issued on each day. Keeps the number four digits wide.
const SUFFIX_START: u32 = 1000;

/// Last valid suffix. 9000 documents per prefix per day.
const SUFFIX_END: u32 = 9999;

/// Issues the next free document number for a prefix and date.
///
/// ## Arguments
/// * `prefix` - Document family, e.g. `"INV"` or `"PO"`
/// * `date` - The document date (suffixes restart per day)
/// * `used` - Every number already issued, across all days
///
/// ## Example
/// ```rust
/// use std::collections::HashSet;
/// use chrono::NaiveDate;
/// use pharmapos_core::invoice::next_document_number;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let mut used = HashSet::new();
///
/// let first = next_document_number("INV", date, &used).unwrap();
/// assert_eq!(first, "INV-20240315-1000");
///
/// used.insert(first);
/// let second = next_document_number("INV", date, &used).unwrap();
/// assert_eq!(second, "INV-20240315-1001");
/// ```
pub fn next_document_number(
    prefix: &str,
    date: NaiveDate,
    used: &HashSet<String>,
) -> CoreResult<String> {
    let stamp = date.format("%Y%m%d");
    for suffix in SUFFIX_START..=SUFFIX_END {
        let candidate = format!("{}-{}-{}", prefix, stamp, suffix);
        if !used.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(CoreError::NumberSpaceExhausted {
        prefix: prefix.to_string(),
        date: stamp.to_string(),
    })
}

impl Invoice {
    /// Builds an invoice from the cart, freezing every line.
    ///
    /// Totals are computed from the same line math the cart exposes, so the
    /// stored aggregates and the cart display always agree:
    /// `subtotal = Σ(price × qty)`, `total = Σnet`,
    /// `discount = subtotal − total`.
    ///
    /// The caller supplies the id and the already-checked invoice number;
    /// this stays a pure function of its inputs.
    pub fn from_cart(
        id: String,
        invoice_number: String,
        date: NaiveDate,
        customer: Option<&Customer>,
        payment_method: PaymentMethod,
        cart: &Cart,
    ) -> Invoice {
        let subtotal = cart.subtotal();
        let total = cart.total();

        Invoice {
            id,
            invoice_number,
            customer_id: customer.map(|c| c.id.clone()),
            customer_name: customer
                .map(|c| c.name.clone())
                .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
            date: date.format("%Y-%m-%d").to_string(),
            subtotal,
            discount: subtotal - total,
            total,
            payment_method,
            items: cart.snapshot_lines(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
