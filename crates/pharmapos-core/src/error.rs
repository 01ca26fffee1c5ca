//! # Error Types
//!
//! Domain-specific error types for pharmapos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmapos-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pharmapos-store errors (separate crate)                               │
//! │  └── StoreError       - Persistence adapter failures                   │
//! │                                                                         │
//! │  pharmapos-engine errors (separate crate)                              │
//! │  └── EngineError      - Checkout/state-container failures              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, amount)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Amount-in-words was asked to render a value it refuses to define.
    ///
    /// ## When This Occurs
    /// - Negative amounts (a printed invoice never owes the customer words)
    /// - NaN or infinite amounts from upstream float math
    #[error("Cannot render amount in words: {reason}")]
    UnrepresentableAmount { reason: String },

    /// Document numbering space for the day is exhausted.
    ///
    /// ## When This Occurs
    /// The four-digit suffix allows 9000 documents per prefix per day.
    /// Running out means something upstream is looping.
    #[error("Document number space exhausted for {prefix} on {date}")]
    NumberSpaceExhausted { prefix: String, date: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Quantity below the minimum of one unit.
    #[error("quantity must be at least 1, got {requested}")]
    QuantityTooSmall { requested: i64 },

    /// Invalid format (e.g., bad date string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for a field name.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an OutOfRange error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
