//! # PharmaPOS Store
//!
//! Persistence adapter for PharmaPOS: one typed [`Store`] API over two
//! interchangeable backends.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        pharmapos-store                                  │
//! │                                                                         │
//! │   ┌──────────────┐      ┌──────────────────────────────────────────┐   │
//! │   │    Store     │      │             Backend (trait)              │   │
//! │   │  typed API,  │─────▶│                                          │   │
//! │   │  id minting, │      │  ┌──────────────┐    ┌────────────────┐  │   │
//! │   │  split/join, │      │  │ LocalBackend │    │ RemoteBackend  │  │   │
//! │   │  col fallback│      │  │  JSON files  │    │ REST / hosted  │  │   │
//! │   └──────────────┘      │  └──────────────┘    └────────────────┘  │   │
//! │                         └──────────────────────────────────────────┘   │
//! │   ┌──────────────┐      ┌──────────────┐                               │
//! │   │ StoreConfig  │      │SettingsStore │                               │
//! │   │ tier-ordered │      │ settings.json│                               │
//! │   │ resolution   │      │ always local │                               │
//! │   └──────────────┘      └──────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine owns a [`Store`] and never sees which backend is behind it.
//! Configuration resolution ([`StoreConfig::resolve`]) decides the backend
//! from saved settings, the process environment and compiled-in defaults,
//! in that order, and falls back to local files with a warning.

pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod remote;
pub mod settings;
pub mod store;

pub use backend::{Backend, Record, ALL_TABLES};
pub use config::{StoreConfig, ENV_SERVICE_KEY, ENV_SERVICE_URL};
pub use error::{StoreError, StoreResult};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use settings::SettingsStore;
pub use store::Store;
