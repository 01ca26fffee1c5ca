//! # Cart
//!
//! The active point-of-sale cart and its checkout math.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  POS Action               Engine Call             Cart Change          │
//! │  ──────────               ───────────             ───────────          │
//! │                                                                         │
//! │  Click Product ──────────► add_to_cart() ───────► line.quantity += 1   │
//! │                                                   (or push new line)    │
//! │                                                                         │
//! │  Edit qty/bonus/disc% ───► update_cart_line() ──► merge validated      │
//! │                                                   fields into line      │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ──► lines.retain(..)     │
//! │                                                                         │
//! │  Complete Sale ──────────► complete_sale() ─────► snapshot + clear     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Math
//! Per line: `gross = price × quantity`, `line_discount = gross × discount/100`,
//! `net = gross − line_discount`. Across lines: `subtotal = Σgross`,
//! `total = Σnet`, `discount_total = subtotal − total`. Bonus units never
//! enter the money math; they only affect stock at checkout.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{InvoiceLine, Product};
use crate::MAX_DISCOUNT_PERCENT;

// =============================================================================
// Cart Line
// =============================================================================

/// A transient line in the active cart.
///
/// ## Design Notes
/// - `product_id` keeps the reference for the stock decrement at checkout
/// - The remaining fields are frozen copies taken when the product was added,
///   so the cart keeps displaying consistent data even if the product is
///   edited mid-session
/// - Never persisted; lives only for the duration of a POS session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID), used for the stock decrement at checkout
    pub product_id: String,

    /// Item code at time of adding (frozen)
    pub item_code: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Batch at time of adding (frozen)
    pub batch: String,

    /// Expiry at time of adding (frozen)
    pub expiry: String,

    /// Unit price at time of adding (frozen). We lock in the price when the
    /// product enters the cart.
    pub price: f64,

    /// Units charged for. Always >= 1.
    pub quantity: i64,

    /// Free units, deducted from stock but not charged. Always >= 0.
    pub bonus: i64,

    /// Line discount in percent, 0-100.
    pub discount: f64,
}

impl CartLine {
    /// Creates a cart line from a product with quantity 1 and no bonus or
    /// discount.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            item_code: product.item_code.clone(),
            name: product.name.clone(),
            batch: product.batch.clone(),
            expiry: product.expiry.clone(),
            price: product.price,
            quantity: 1,
            bonus: 0,
            discount: 0.0,
        }
    }

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

    /// Units to deduct from stock at checkout (charged plus free).
    pub fn stock_units(&self) -> i64 {
        self.quantity + self.bonus
    }

    /// Freezes this line into an invoice line snapshot.
    pub fn snapshot(&self) -> InvoiceLine {
        InvoiceLine {
            item_code: self.item_code.clone(),
            name: self.name.clone(),
            batch: self.batch.clone(),
            expiry: self.expiry.clone(),
            quantity: self.quantity,
            price: self.price,
            bonus: self.bonus,
            discount: self.discount,
        }
    }
}

// =============================================================================
// Cart Line Update
// =============================================================================

/// Partial update merged into a cart line.
///
/// Absent fields are left untouched. Values are validated before anything is
/// merged; validation used to live in the presentation layer and was easy to
/// bypass, so the cart now enforces it itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartLineUpdate {
    pub quantity: Option<i64>,
    pub bonus: Option<i64>,
    pub discount: Option<f64>,
}

impl CartLineUpdate {
    /// Validates the update against cart line bounds.
    ///
    /// ## Rules
    /// - quantity >= 1
    /// - bonus >= 0
    /// - discount in [0, 100]
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(quantity) = self.quantity {
            if quantity < 1 {
                return Err(ValidationError::QuantityTooSmall {
                    requested: quantity,
                });
            }
        }
        if let Some(bonus) = self.bonus {
            if bonus < 0 {
                return Err(ValidationError::MustBeNonNegative {
                    field: "bonus".to_string(),
                });
            }
        }
        if let Some(discount) = self.discount {
            if !(0.0..=MAX_DISCOUNT_PERCENT).contains(&discount) {
                return Err(ValidationError::out_of_range(
                    "discount",
                    0.0,
                    MAX_DISCOUNT_PERCENT,
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The active cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product again
///   increments quantity)
/// - quantity >= 1, bonus >= 0, discount in [0, 100] on every line
/// - Cleared on checkout or explicit clear; never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity increments by 1
    /// - New product: a fresh line with quantity 1, bonus 0, discount 0
    ///
    /// No stock check happens here; availability is only reconciled at
    /// checkout, where stock may go negative.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine::from_product(product));
    }

    /// Merges a validated partial update into the line for `product_id`.
    ///
    /// ## Behavior
    /// - Invalid values are rejected before anything changes
    /// - Unknown product_id is a no-op (the cart is left unchanged)
    pub fn update_line(
        &mut self,
        product_id: &str,
        update: &CartLineUpdate,
    ) -> Result<(), ValidationError> {
        update.validate()?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            if let Some(quantity) = update.quantity {
                line.quantity = quantity;
            }
            if let Some(bonus) = update.bonus {
                line.bonus = bonus;
            }
            if let Some(discount) = update.discount {
                line.discount = discount;
            }
        }

        Ok(())
    }

    /// Removes the line for `product_id`, if present.
    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Removes all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Read-only view of the lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of line gross amounts.
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|l| l.gross()).sum()
    }

    /// Sum of line net amounts.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.net()).sum()
    }

    /// Total discount across lines (subtotal - total).
    pub fn discount_total(&self) -> f64 {
        self.subtotal() - self.total()
    }

    /// Totals summary for display.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: self.line_count(),
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
            subtotal: self.subtotal(),
            discount_total: self.discount_total(),
            total: self.total(),
        }
    }

    /// Freezes every line into an invoice line snapshot, in cart order.
    pub fn snapshot_lines(&self) -> Vec<InvoiceLine> {
        self.lines.iter().map(CartLine::snapshot).collect()
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: f64,
    pub discount_total: f64,
    pub total: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
