//! Phase orchestration for a full reconciliation run.

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

use crate::assets::{AssetClass, LocalAsset, verify_referenced};
use crate::catalog::{RawCatalog, in_scope_items, referenced_textures};
use crate::classify::Classifier;
use crate::db::migrations;
use crate::error::SyncError;
use crate::ids::AssetIdGenerator;
use crate::reconcile::assets::AssetReconciler;
use crate::reconcile::items::ItemReconciler;
use crate::reconcile::report::{PhaseReport, RunReport};

/// Run the full reconciliation pipeline against an open store.
///
/// Sequencing is fixed: ensure schema, then textures, then items (which read
/// the hashes the texture phase just settled), then weather. A failure in an
/// earlier phase aborts everything after it.
///
/// The missing-texture preflight runs before any reconciliation write, so a
/// fatal precondition leaves the store untouched by this pass.
///
/// The caller owns `ids` and must hold exactly one generator per process;
/// repeated runs drawing from the same generator never reissue an asset id,
/// even when the runs land in the same clock millisecond.
///
/// # Errors
///
/// Returns [`SyncError::MissingTextures`] from the preflight and
/// [`SyncError::Store`] from the first failed store access.
pub fn run(
    conn: &mut Connection,
    classifier: &Classifier,
    ids: &mut AssetIdGenerator,
    catalog: &RawCatalog,
    textures: &[LocalAsset],
    weather: &[LocalAsset],
) -> Result<RunReport, SyncError> {
    migrations::migrate(conn)?;

    let items = in_scope_items(catalog, classifier);
    let required = referenced_textures(&items);
    verify_referenced(&required, textures)?;

    let mut report = RunReport::default();

    let started = Instant::now();
    let stats = AssetReconciler::new(conn, AssetClass::Texture).reconcile_all(textures, ids)?;
    report
        .phases
        .push(PhaseReport::new("textures", started.elapsed(), stats));
    info!(
        seen = stats.seen,
        writes = stats.writes,
        conflicts = stats.conflicts,
        "texture phase complete"
    );

    // The texture phase settled every name's stored hash to the local
    // digest, so the local set is the authoritative name -> hash view.
    let texture_hashes: BTreeMap<String, String> = textures
        .iter()
        .map(|asset| (asset.name.clone(), asset.digest.clone()))
        .collect();

    let started = Instant::now();
    let stats = ItemReconciler::new(conn, classifier, &texture_hashes).reconcile_all(&items)?;
    report
        .phases
        .push(PhaseReport::new("items", started.elapsed(), stats));
    info!(
        seen = stats.seen,
        writes = stats.writes,
        anomalies = stats.anomalies,
        "item phase complete"
    );

    let started = Instant::now();
    let stats = AssetReconciler::new(conn, AssetClass::Weather).reconcile_all(weather, ids)?;
    report
        .phases
        .push(PhaseReport::new("weather", started.elapsed(), stats));
    info!(seen = stats.seen, writes = stats.writes, "weather phase complete");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::assets::LocalAsset;
    use crate::catalog::{RawCatalog, RawItem};
    use crate::classify::Classifier;
    use crate::error::SyncError;
    use crate::ids::AssetIdGenerator;

    fn catalog() -> RawCatalog {
        RawCatalog {
            item_dat_version: 19,
            items: vec![
                RawItem {
                    id: 2,
                    name: "Dirt".to_string(),
                    action_type: 2,
                    texture: "tiles_dirt.rttex".to_string(),
                    texture_x: 1,
                    texture_y: 0,
                    spread_type: 4,
                    collision_type: 1,
                    rarity: 1,
                    max_amount: 200,
                    break_hits: 4,
                },
                RawItem {
                    id: 8,
                    name: "Door Mover".to_string(),
                    action_type: 8,
                    texture: "mover.rttex".to_string(),
                    texture_x: 0,
                    texture_y: 0,
                    spread_type: 0,
                    collision_type: 0,
                    rarity: 0,
                    max_amount: 0,
                    break_hits: 0,
                },
            ],
        }
    }

    #[test]
    fn phases_run_in_order_and_out_of_scope_items_are_ignored() {
        let mut conn = crate::db::open_in_memory().expect("open store");
        let classifier = Classifier::default();
        let mut ids = AssetIdGenerator::new(1);
        let textures = vec![LocalAsset::new("tiles_dirt", b"pixels".to_vec())];
        let weather = vec![LocalAsset::new("rain", b"drops".to_vec())];

        let report = run(&mut conn, &classifier, &mut ids, &catalog(), &textures, &weather)
            .expect("run should succeed");

        let names: Vec<&str> = report.phases.iter().map(|phase| phase.phase).collect();
        assert_eq!(names, ["textures", "items", "weather"]);
        assert_eq!(report.phases[1].stats.seen, 1, "Door Mover is out of scope");
        assert_eq!(report.total_writes(), 3);
    }

    #[test]
    fn second_run_with_unchanged_inputs_writes_nothing() {
        let mut conn = crate::db::open_in_memory().expect("open store");
        let classifier = Classifier::default();
        let mut ids = AssetIdGenerator::new(1);
        let textures = vec![LocalAsset::new("tiles_dirt", b"pixels".to_vec())];
        let weather = vec![LocalAsset::new("rain", b"drops".to_vec())];

        run(&mut conn, &classifier, &mut ids, &catalog(), &textures, &weather)
            .expect("first run");
        let second = run(&mut conn, &classifier, &mut ids, &catalog(), &textures, &weather)
            .expect("second run");

        assert_eq!(second.total_writes(), 0);
    }

    #[test]
    fn back_to_back_runs_on_one_generator_never_reissue_asset_ids() {
        // Fresh stores make every run insert; without a shared generator two
        // runs inside one clock millisecond replay the same id sequence.
        let classifier = Classifier::default();
        let mut ids = AssetIdGenerator::new(1);
        let textures = vec![LocalAsset::new("tiles_dirt", b"pixels".to_vec())];
        let weather = vec![LocalAsset::new("rain", b"drops".to_vec())];

        let mut all_ids = Vec::new();
        for _ in 0..50 {
            let mut conn = crate::db::open_in_memory().expect("open store");
            run(&mut conn, &classifier, &mut ids, &catalog(), &textures, &weather)
                .expect("run");
            let mut stmt = conn
                .prepare("SELECT id FROM textures UNION ALL SELECT id FROM weather")
                .expect("prepare");
            let rows: Vec<u64> = stmt
                .query_map([], |row| row.get(0))
                .expect("query")
                .collect::<Result<_, _>>()
                .expect("rows");
            all_ids.extend(rows);
        }

        let mut deduped = all_ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), all_ids.len(), "an asset id was reissued");
    }

    #[test]
    fn missing_texture_aborts_before_any_write() {
        let mut conn = crate::db::open_in_memory().expect("open store");
        let classifier = Classifier::default();
        let mut ids = AssetIdGenerator::new(1);

        let err = run(&mut conn, &classifier, &mut ids, &catalog(), &[], &[])
            .expect_err("should fail");
        assert!(matches!(err, SyncError::MissingTextures { .. }));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM textures", [], |row| row.get(0))
            .expect("count");
        assert_eq!(rows, 0);
    }
}
