//! The reconciliation engine.
//!
//! Compares freshly computed local state (catalog items plus fingerprinted
//! assets) against the persisted store and applies the minimal corrective
//! writes, one fully-applied decision at a time:
//!
//! - [`assets::AssetReconciler`] diffs `(name, hash)` pairs per collection
//! - [`items::ItemReconciler`] diffs item rows field-by-field over the
//!   descriptor table in [`fields`], honoring the override-protection flag
//! - [`driver::run`] sequences the phases and aggregates a [`report::RunReport`]
//!
//! Every decision is re-derived from current persisted state on each run, so
//! a second run over unchanged inputs performs zero writes and re-running is
//! the recovery strategy after any mid-run failure.

pub mod assets;
pub mod decision;
pub mod driver;
pub mod fields;
pub mod items;
pub mod report;

pub use decision::{AssetDecision, FieldUpdate};
pub use driver::run;
pub use report::{PhaseReport, PhaseStats, RunReport};
