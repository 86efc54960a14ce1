//! worldsync-core: reconciliation engine for the world-planner store.
//!
//! Given a freshly parsed item catalog and the local asset directories, the
//! engine diffs that state against the persisted SQLite store and applies
//! the minimal corrective writes, preserving operator-curated fields.
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::SyncError`] inside the engine, `anyhow`
//!   at crate boundaries that touch config and the store file.
//! - **Logging**: `tracing` macros; one structured event per decision.

pub mod assets;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod hash;
pub mod ids;
pub mod lock;
pub mod reconcile;

pub use assets::{AssetClass, LocalAsset};
pub use catalog::{LocalItem, RawCatalog};
pub use classify::{Category, Classifier, ClassifierConfig};
pub use config::SyncConfig;
pub use error::{ErrorCode, SyncError};
pub use reconcile::{RunReport, run};
