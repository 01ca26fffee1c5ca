//! # PharmaPOS Engine
//!
//! The domain state container tying the pure core to the persistence
//! adapter.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    pharmapos-engine (THIS CRATE)                        │
//! │                                                                         │
//! │   PharmacyEngine                                                        │
//! │   ├── entity state (products, customers, suppliers, orders)             │
//! │   ├── invoice history + checked document numbering                      │
//! │   ├── the active cart                                                   │
//! │   └── complete_sale / receive_purchase_order sagas                      │
//! │           │                          │                                  │
//! │           ▼                          ▼                                  │
//! │   pharmapos-core              pharmapos-store                           │
//! │   pure math, snapshots,       injected Store over a local or            │
//! │   validation, rendering       remote backend                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is injected at construction, never reached through a global,
//! so every test runs the full engine against a throwaway directory or a
//! deliberately failing backend.

pub mod engine;
pub mod error;
pub mod seed;

pub use engine::PharmacyEngine;
pub use error::{EngineError, EngineResult};
