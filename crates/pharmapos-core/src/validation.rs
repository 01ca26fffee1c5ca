//! # Validation Module
//!
//! Business rule validation for entities before they are persisted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (form handling, out of scope here)                    │
//! │  └── Immediate user feedback on required fields                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE, invoked by the engine                           │
//! │  └── Business rule validation before any persistence call              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backing store constraints (when remote)                      │
//! │                                                                         │
//! │  The engine never persists an entity this module rejects.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Customer, Product, PurchaseOrder, Supplier};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a product before create or update.
///
/// ## Rules
/// - item_code and name are required
/// - price must not be negative
/// - reorder/optimum levels must not be negative
///
/// Stock is deliberately NOT validated here: it is allowed to be negative
/// (backorder semantics).
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    require("item_code", &product.item_code)?;
    require("name", &product.name)?;

    if product.price < 0.0 || !product.price.is_finite() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    if product.reorder_level < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "reorder_level".to_string(),
        });
    }
    if product.optimum_level < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "optimum_level".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer before create or update.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    require("name", &customer.name)?;
    require("phone", &customer.phone)?;
    Ok(())
}

/// Validates a supplier before create or update.
pub fn validate_supplier(supplier: &Supplier) -> ValidationResult<()> {
    require("name", &supplier.name)?;
    require("phone", &supplier.phone)?;
    Ok(())
}

/// Validates a purchase order before create or update.
///
/// ## Rules
/// - A supplier must be selected
/// - At least one line
/// - Every line needs quantity >= 1 and a non-negative unit price
pub fn validate_purchase_order(po: &PurchaseOrder) -> ValidationResult<()> {
    require("supplier_id", &po.supplier_id)?;

    if po.items.is_empty() {
        return Err(ValidationError::required("items"));
    }
    for line in &po.items {
        if line.quantity < 1 {
            return Err(ValidationError::QuantityTooSmall {
                requested: line.quantity,
            });
        }
        if line.unit_price < 0.0 || !line.unit_price.is_finite() {
            return Err(ValidationError::MustBeNonNegative {
                field: "unit_price".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
