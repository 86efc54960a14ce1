//! Reconciliation decisions.
//!
//! Decisions are a design concept, not persisted state: each reconciler
//! derives one per asset or item, applies it, and reports it through
//! structured tracing events and the phase counters.

use crate::reconcile::fields::FieldValue;

/// Outcome for a single local asset against its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDecision {
    /// Nothing to do: hash and name both resolve to the same row, or the
    /// bytes are already persisted under a different name. In the second
    /// case no row exists for the local name at all; consumers holding a
    /// duplicate-content name must resolve it through the hash column.
    NoOp,
    /// No row matched by hash or name; a fresh row was inserted.
    Create {
        /// Newly generated snowflake id.
        id: u64,
    },
    /// The name matched but the content changed; bytes and hash were
    /// rewritten in place, id unchanged.
    Update {
        /// Id of the row that was refreshed.
        id: u64,
        /// Hash the row held before the update.
        old_hash: String,
    },
    /// Hash and name matched two different rows: the store was inconsistent.
    /// Both rows were deleted and a fresh one inserted.
    Conflict {
        /// Id of the row that matched by hash.
        hash_match_id: u64,
        /// Id of the row that matched by name.
        name_match_id: u64,
        /// Id of the replacement row.
        new_id: u64,
    },
}

/// One applied field-level item update.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Store column the update touched.
    pub column: &'static str,
    /// Value the row held before.
    pub old: FieldValue,
    /// Value written.
    pub new: FieldValue,
}
