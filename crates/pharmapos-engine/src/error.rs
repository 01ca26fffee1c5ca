//! # Engine Error Types
//!
//! Error types for engine operations.
//!
//! Validation and persistence failures convert in via `#[from]`; the
//! variants defined here are the failures only the engine can detect
//! (empty cart, wrong purchase-order state, a rollback that itself failed).

use thiserror::Error;

use pharmapos_core::{CoreError, PurchaseOrderStatus, ValidationError};
use pharmapos_store::StoreError;

/// Engine operation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Checkout was attempted with nothing in the cart.
    #[error("Cannot complete a sale with an empty cart")]
    EmptyCart,

    /// An id the caller passed does not exist in engine state.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Receiving was attempted on a purchase order that is not pending.
    #[error("Purchase order {id} is {status}, only pending orders can be received")]
    NotPending {
        id: String,
        status: PurchaseOrderStatus,
    },

    /// A business rule rejected the input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Core domain logic failed (e.g. document number space exhausted).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence adapter failed. For checkout and receiving this is
    /// raised only after compensation restored the prior store state.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A persistence failure AND the compensation for it failed.
    ///
    /// ## When This Occurs
    /// Checkout or receiving applied some writes, a later write failed, and
    /// undoing the applied writes failed too. The store may hold partial
    /// state; the in-memory state is still pre-operation.
    #[error("{original}; rollback also failed ({rollback}), store may hold partial writes")]
    RollbackFailed {
        original: Box<StoreError>,
        rollback: Box<StoreError>,
    },
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
