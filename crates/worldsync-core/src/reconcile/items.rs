//! Item reconciliation: diff in-scope catalog items against persisted rows
//! field-by-field, driven by the descriptor table in [`crate::reconcile::fields`].

use rusqlite::Connection;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::catalog::LocalItem;
use crate::classify::Classifier;
use crate::db::store::{self, ItemRecord};
use crate::error::SyncError;
use crate::ids::PackedItemId;
use crate::reconcile::decision::FieldUpdate;
use crate::reconcile::fields::{FIELDS, FieldGroup, LocalItemState};
use crate::reconcile::report::PhaseStats;

/// Reconciles the in-scope item set against the `items` collection.
pub struct ItemReconciler<'a> {
    conn: &'a Connection,
    classifier: &'a Classifier,
    /// Bare texture name to current content digest, from the resolved asset
    /// set the asset phase just wrote through.
    texture_hashes: &'a BTreeMap<String, String>,
}

impl<'a> ItemReconciler<'a> {
    #[must_use]
    pub const fn new(
        conn: &'a Connection,
        classifier: &'a Classifier,
        texture_hashes: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            conn,
            classifier,
            texture_hashes,
        }
    }

    /// Reconcile every item, applying each decision before the next item.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] on the first failed read or write, and
    /// [`SyncError::MissingTextures`] if an item's texture is unresolved,
    /// which the preflight should have made impossible.
    pub fn reconcile_all(&self, items: &[LocalItem]) -> Result<PhaseStats, SyncError> {
        let mut stats = PhaseStats::default();
        for item in items {
            stats.seen += 1;
            self.reconcile_one(item, &mut stats)?;
        }
        Ok(stats)
    }

    fn reconcile_one(&self, item: &LocalItem, stats: &mut PhaseStats) -> Result<(), SyncError> {
        let texture_hash =
            self.texture_hashes
                .get(&item.texture)
                .ok_or_else(|| SyncError::MissingTextures {
                    missing: vec![item.texture.clone()],
                })?;

        let category_code = self.classifier.persisted_code(item.category);
        if category_code.is_none() {
            warn!(
                game_id = item.game_id,
                name = %item.name,
                category = %item.category,
                "no persisted code for category"
            );
            stats.anomalies += 1;
        }

        let state = LocalItemState {
            item,
            texture_hash,
            category_code,
        };

        match store::find_item(self.conn, item.game_id)? {
            None => {
                self.create(&state)?;
                stats.created += 1;
                stats.writes += 1;
            }
            Some(record) => {
                let updates = self.update_diverged_fields(&state, &record)?;
                if updates.is_empty() {
                    debug!(game_id = item.game_id, name = %item.name, "item up to date");
                    stats.unchanged += 1;
                } else {
                    stats.updated += 1;
                    stats.field_updates += updates.len();
                    stats.writes += updates.len();
                }
            }
        }
        Ok(())
    }

    /// Insert a full row. An unmapped category is stored as NULL; the
    /// anomaly was already reported and never blocks the insert.
    fn create(&self, state: &LocalItemState<'_>) -> Result<(), SyncError> {
        let item = state.item;
        let id = PackedItemId::generate_default(item.game_id);
        let record = ItemRecord {
            id: id.to_hex(),
            game_id: item.game_id,
            action_type: item.action_type,
            item_category: state.category_code,
            name: item.name.clone(),
            texture: item.texture.clone(),
            texture_hash: state.texture_hash.to_string(),
            texture_x: item.texture_x,
            texture_y: item.texture_y,
            spread_type: item.spread_type,
            collision_type: item.collision_type,
            rarity: item.rarity,
            max_amount: item.max_amount,
            break_hits: item.break_hits,
            override_item_data: false,
        };
        store::insert_item(self.conn, &record)?;
        info!(game_id = item.game_id, name = %item.name, id = %id, "item created");
        Ok(())
    }

    /// Walk the descriptor table and rewrite each diverged field.
    ///
    /// Override-protected fields are skipped entirely when the row is
    /// operator-curated. Every applied update also regenerates the row's
    /// packed id; only `game_id` is stable across writes.
    fn update_diverged_fields(
        &self,
        state: &LocalItemState<'_>,
        record: &ItemRecord,
    ) -> Result<Vec<FieldUpdate>, SyncError> {
        let mut updates = Vec::new();

        for spec in FIELDS {
            if spec.group == FieldGroup::OverrideProtected && record.override_item_data {
                continue;
            }
            // An unavailable local value was already reported as an anomaly.
            let Some(local) = (spec.local)(state) else {
                continue;
            };
            let persisted = (spec.persisted)(record);
            if local == persisted {
                continue;
            }

            let new_id = PackedItemId::generate_default(record.game_id);
            store::update_item_field(
                self.conn,
                record.game_id,
                spec.column,
                &local,
                &new_id.to_hex(),
            )?;
            info!(
                game_id = record.game_id,
                name = %state.item.name,
                column = spec.column,
                old = %persisted,
                new = %local,
                "item field updated"
            );
            updates.push(FieldUpdate {
                column: spec.column,
                old: persisted,
                new: local,
            });
        }

        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::ItemReconciler;
    use crate::catalog::LocalItem;
    use crate::classify::{Category, Classifier};
    use crate::db::store;
    use crate::error::SyncError;
    use crate::reconcile::report::PhaseStats;
    use rusqlite::Connection;
    use std::collections::BTreeMap;

    fn store_conn() -> Connection {
        crate::db::open_in_memory().expect("open in-memory store")
    }

    fn dirt() -> LocalItem {
        LocalItem {
            game_id: 2,
            name: "Dirt".to_string(),
            category: Category::Foreground,
            action_type: 2,
            texture: "tiles_dirt".to_string(),
            texture_x: 1,
            texture_y: 0,
            spread_type: 4,
            collision_type: 1,
            rarity: 1,
            max_amount: 200,
            break_hits: 1,
        }
    }

    fn hashes() -> BTreeMap<String, String> {
        [("tiles_dirt".to_string(), "hash-1".to_string())].into()
    }

    fn run(conn: &Connection, items: &[LocalItem], hashes: &BTreeMap<String, String>) -> PhaseStats {
        let classifier = Classifier::default();
        ItemReconciler::new(conn, &classifier, hashes)
            .reconcile_all(items)
            .expect("reconcile")
    }

    #[test]
    fn first_sight_creates_full_row() {
        let conn = store_conn();
        let stats = run(&conn, &[dirt()], &hashes());
        assert_eq!(stats.created, 1);

        let record = store::find_item(&conn, 2).expect("query").expect("present");
        assert_eq!(record.name, "Dirt");
        assert_eq!(record.item_category, Some(1));
        assert_eq!(record.texture_hash, "hash-1");
        assert!(!record.override_item_data);
        assert_eq!(record.id.len(), 18);
    }

    #[test]
    fn unchanged_item_is_a_noop_and_keeps_its_id() {
        let conn = store_conn();
        run(&conn, &[dirt()], &hashes());
        let before = store::find_item(&conn, 2).expect("query").expect("present");

        let stats = run(&conn, &[dirt()], &hashes());
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.writes, 0);

        let after = store::find_item(&conn, 2).expect("query").expect("present");
        assert_eq!(after.id, before.id);
    }

    #[test]
    fn each_diverged_field_is_one_update_and_regenerates_the_id() {
        let conn = store_conn();
        run(&conn, &[dirt()], &hashes());
        let before = store::find_item(&conn, 2).expect("query").expect("present");

        let mut changed = dirt();
        changed.rarity = 5;
        changed.max_amount = 150;
        let stats = run(&conn, &[changed], &hashes());
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.field_updates, 2);

        let after = store::find_item(&conn, 2).expect("query").expect("present");
        assert_eq!(after.rarity, 5);
        assert_eq!(after.max_amount, 150);
        assert_ne!(after.id, before.id);
        assert_eq!(&after.id[4..12], &before.id[4..12], "embedded game_id is stable");
    }

    #[test]
    fn override_flag_protects_authoring_fields_only() {
        let conn = store_conn();
        run(&conn, &[dirt()], &hashes());
        conn.execute("UPDATE items SET override_item_data = 1 WHERE game_id = 2", [])
            .expect("flag");

        let mut changed = dirt();
        changed.action_type = 999;
        changed.texture_x = 7;
        changed.spread_type = 2;
        changed.rarity = 5;
        let stats = run(&conn, &[changed], &hashes());
        assert_eq!(stats.field_updates, 1, "only rarity may flow");

        let record = store::find_item(&conn, 2).expect("query").expect("present");
        assert_eq!(record.rarity, 5);
        assert_eq!(record.action_type, 2);
        assert_eq!(record.texture_x, 1);
        assert_eq!(record.spread_type, 4);
        assert!(record.override_item_data);
    }

    #[test]
    fn changed_texture_hash_flows_despite_override() {
        let conn = store_conn();
        run(&conn, &[dirt()], &hashes());
        conn.execute("UPDATE items SET override_item_data = 1 WHERE game_id = 2", [])
            .expect("flag");

        let new_hashes: BTreeMap<String, String> =
            [("tiles_dirt".to_string(), "hash-2".to_string())].into();
        let stats = run(&conn, &[dirt()], &new_hashes);
        assert_eq!(stats.field_updates, 1);

        let record = store::find_item(&conn, 2).expect("query").expect("present");
        assert_eq!(record.texture_hash, "hash-2");
    }

    #[test]
    fn unmapped_category_is_an_anomaly_not_a_failure() {
        let conn = store_conn();
        let mut item = dirt();
        item.category = Category::Seed;

        let stats = run(&conn, &[item], &hashes());
        assert_eq!(stats.anomalies, 1);
        assert_eq!(stats.created, 1);

        let record = store::find_item(&conn, 2).expect("query").expect("present");
        assert_eq!(record.item_category, None);
    }

    #[test]
    fn unresolved_texture_is_fatal() {
        let conn = store_conn();
        let classifier = Classifier::default();
        let empty = BTreeMap::new();
        let err = ItemReconciler::new(&conn, &classifier, &empty)
            .reconcile_all(&[dirt()])
            .expect_err("should fail");
        assert!(matches!(err, SyncError::MissingTextures { .. }));
    }
}
