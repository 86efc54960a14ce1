//! Asset reconciliation: diff local `(name, hash)` pairs against one store
//! collection and apply one decision per asset.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::assets::{AssetClass, LocalAsset};
use crate::db::store;
use crate::error::SyncError;
use crate::ids::AssetIdGenerator;
use crate::reconcile::decision::AssetDecision;
use crate::reconcile::report::PhaseStats;

/// Reconciles one asset class against its backing collection.
///
/// Works strictly sequentially: each asset's decision is derived and fully
/// applied before the next asset is considered, because the hash lookup for
/// a later asset may observe a row written moments earlier.
pub struct AssetReconciler<'conn> {
    conn: &'conn Connection,
    class: AssetClass,
}

impl<'conn> AssetReconciler<'conn> {
    #[must_use]
    pub const fn new(conn: &'conn Connection, class: AssetClass) -> Self {
        Self { conn, class }
    }

    /// Reconcile a de-duplicated local asset set, applying every decision.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] on the first failed read or write; the
    /// run must stop there because later decisions may depend on it.
    pub fn reconcile_all(
        &self,
        assets: &[LocalAsset],
        ids: &mut AssetIdGenerator,
    ) -> Result<PhaseStats, SyncError> {
        let mut stats = PhaseStats::default();
        for asset in assets {
            stats.seen += 1;
            match self.reconcile_one(asset, ids)? {
                AssetDecision::NoOp => stats.unchanged += 1,
                AssetDecision::Create { .. } => {
                    stats.created += 1;
                    stats.writes += 1;
                }
                AssetDecision::Update { .. } => {
                    stats.updated += 1;
                    stats.writes += 1;
                }
                AssetDecision::Conflict { .. } => {
                    stats.conflicts += 1;
                    stats.writes += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Derive and apply the decision for a single asset.
    ///
    /// The hash lookup runs first: identical content already on file takes
    /// precedence over a name match when the two disagree.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] on any read or write failure. A missing
    /// row is never an error.
    pub fn reconcile_one(
        &self,
        asset: &LocalAsset,
        ids: &mut AssetIdGenerator,
    ) -> Result<AssetDecision, SyncError> {
        let by_hash = store::find_asset_by_hash(self.conn, self.class, &asset.digest)?;
        let by_name = store::find_asset_by_name(self.conn, self.class, &asset.name)?;

        let decision = match (by_hash, by_name) {
            (Some(hash_match), Some(name_match)) if hash_match.id == name_match.id => {
                debug!(
                    collection = %self.class,
                    name = %asset.name,
                    id = hash_match.id,
                    "asset up to date"
                );
                AssetDecision::NoOp
            }
            (Some(hash_match), Some(name_match)) => {
                // Two rows independently claim this asset: repair by removing
                // both and inserting a single authoritative replacement.
                store::delete_asset(self.conn, self.class, hash_match.id)?;
                store::delete_asset(self.conn, self.class, name_match.id)?;
                let new_id = ids.next_id();
                store::insert_asset(
                    self.conn,
                    self.class,
                    new_id,
                    &asset.name,
                    &asset.digest,
                    &asset.bytes,
                )?;
                warn!(
                    collection = %self.class,
                    name = %asset.name,
                    hash_match_id = hash_match.id,
                    name_match_id = name_match.id,
                    new_id,
                    "repaired conflicting asset rows"
                );
                AssetDecision::Conflict {
                    hash_match_id: hash_match.id,
                    name_match_id: name_match.id,
                    new_id,
                }
            }
            (None, Some(name_match)) => {
                store::update_asset_contents(
                    self.conn,
                    self.class,
                    &asset.name,
                    &asset.digest,
                    &asset.bytes,
                )?;
                info!(
                    collection = %self.class,
                    name = %asset.name,
                    id = name_match.id,
                    old_hash = %name_match.hash,
                    new_hash = %asset.digest,
                    "asset content changed"
                );
                AssetDecision::Update {
                    id: name_match.id,
                    old_hash: name_match.hash,
                }
            }
            (Some(hash_match), None) => {
                // Identical content is already on file under another name.
                // Creating a second row would break the one-row-per-hash
                // lookup contract, so the hash match wins.
                debug!(
                    collection = %self.class,
                    name = %asset.name,
                    existing = %hash_match.name,
                    id = hash_match.id,
                    "content already on file under another name"
                );
                AssetDecision::NoOp
            }
            (None, None) => {
                let id = ids.next_id();
                store::insert_asset(
                    self.conn,
                    self.class,
                    id,
                    &asset.name,
                    &asset.digest,
                    &asset.bytes,
                )?;
                info!(
                    collection = %self.class,
                    name = %asset.name,
                    id,
                    hash = %asset.digest,
                    "asset created"
                );
                AssetDecision::Create { id }
            }
        };

        Ok(decision)
    }
}
