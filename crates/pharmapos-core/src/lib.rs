//! # pharmapos-core: Pure Business Logic for PharmaPOS
//!
//! This crate is the **heart** of PharmaPOS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PharmaPOS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 pharmapos-engine (state container)              │   │
//! │  │    add_to_cart ──► complete_sale ──► receive_purchase_order    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ pharmapos-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │  invoice  │  │   words   │  │   │
//! │  │   │  Product  │  │   Cart    │  │  numbers  │  │ Rupees in │  │   │
//! │  │   │  Invoice  │  │ CartLine  │  │ snapshots │  │   words   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               pharmapos-store (persistence adapter)             │   │
//! │  │           local JSON files or remote REST table-store           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Invoice, etc.)
//! - [`cart`] - The active cart and its checkout math
//! - [`invoice`] - Invoice snapshots and checked document numbering
//! - [`words`] - Amount-in-words rendering for printed invoices
//! - [`document`] - Printable invoice document composition
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Frozen Snapshots**: Invoice lines are copies taken at sale time and
//!    never reference live products
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod document;
pub mod error;
pub mod invoice;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pharmapos_core::Cart` instead of
// `use pharmapos_core::cart::Cart`

pub use cart::{Cart, CartLine, CartLineUpdate, CartTotals};
pub use document::InvoiceDocument;
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;
pub use words::{amount_in_words, number_to_words};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display name used for sales with no customer record attached.
pub const WALK_IN_CUSTOMER: &str = "Walk-in";

/// Maximum line discount in percent.
///
/// ## Business Reason
/// A discount above 100% would turn a sale into a payout. The engine rejects
/// it instead of silently accepting it the way the previous system did.
pub const MAX_DISCOUNT_PERCENT: f64 = 100.0;

/// Absolute tolerance used when comparing recomputed monetary totals against
/// stored ones.
pub const MONEY_EPSILON: f64 = 1e-9;
