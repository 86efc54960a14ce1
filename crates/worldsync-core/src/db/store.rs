//! Typed access helpers for the three store collections.
//!
//! All functions take a shared `&Connection` and return typed records, never
//! raw rows. "Not found" is an explicit `Option::None` via `optional()`;
//! only genuine SQLite failures surface as errors, and those abort the run.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::assets::AssetClass;

/// A persisted asset row, bytes omitted (decisions never read them back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub id: u64,
    pub name: String,
    pub hash: String,
}

/// A persisted item row keyed by `game_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Packed identifier in hex form; rewritten on every update.
    pub id: String,
    pub game_id: i32,
    pub action_type: i32,
    /// `None` when the item's category had no persisted-code mapping.
    pub item_category: Option<i16>,
    pub name: String,
    pub texture: String,
    pub texture_hash: String,
    pub texture_x: i16,
    pub texture_y: i16,
    pub spread_type: i16,
    pub collision_type: i16,
    pub rarity: i16,
    pub max_amount: i16,
    pub break_hits: i16,
    pub override_item_data: bool,
}

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<AssetRecord> {
    Ok(AssetRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        hash: row.get(2)?,
    })
}

/// Look up an asset by content hash.
///
/// # Errors
///
/// Returns an error only on genuine SQLite failure, never for a missing row.
pub fn find_asset_by_hash(
    conn: &Connection,
    class: AssetClass,
    hash: &str,
) -> rusqlite::Result<Option<AssetRecord>> {
    let sql = format!("SELECT id, name, hash FROM {} WHERE hash = ?1", class.table());
    conn.query_row(&sql, params![hash], asset_from_row).optional()
}

/// Look up an asset by bare name.
///
/// # Errors
///
/// Returns an error only on genuine SQLite failure, never for a missing row.
pub fn find_asset_by_name(
    conn: &Connection,
    class: AssetClass,
    name: &str,
) -> rusqlite::Result<Option<AssetRecord>> {
    let sql = format!("SELECT id, name, hash FROM {} WHERE name = ?1", class.table());
    conn.query_row(&sql, params![name], asset_from_row).optional()
}

/// Insert a fresh asset row.
///
/// # Errors
///
/// Returns an error if the insert fails (including a name uniqueness
/// violation, which indicates a bug in the caller's decision logic).
pub fn insert_asset(
    conn: &Connection,
    class: AssetClass,
    id: u64,
    name: &str,
    hash: &str,
    contents: &[u8],
) -> rusqlite::Result<()> {
    let sql = format!(
        "INSERT INTO {} (id, name, hash, contents) VALUES (?1, ?2, ?3, ?4)",
        class.table()
    );
    conn.execute(&sql, params![id, name, hash, contents])?;
    Ok(())
}

/// Replace an asset's bytes and hash in place; the id is left unchanged.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_asset_contents(
    conn: &Connection,
    class: AssetClass,
    name: &str,
    hash: &str,
    contents: &[u8],
) -> rusqlite::Result<()> {
    let sql = format!(
        "UPDATE {} SET hash = ?1, contents = ?2 WHERE name = ?3",
        class.table()
    );
    conn.execute(&sql, params![hash, contents, name])?;
    Ok(())
}

/// Delete an asset row by id. Only the conflict repair path does this.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_asset(conn: &Connection, class: AssetClass, id: u64) -> rusqlite::Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", class.table());
    conn.execute(&sql, params![id])?;
    Ok(())
}

const ITEM_COLUMNS: &str = "id, game_id, action_type, item_category, name, texture, \
     texture_hash, texture_x, texture_y, spread_type, collision_type, rarity, \
     max_amount, break_hits, override_item_data";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemRecord> {
    Ok(ItemRecord {
        id: row.get(0)?,
        game_id: row.get(1)?,
        action_type: row.get(2)?,
        item_category: row.get(3)?,
        name: row.get(4)?,
        texture: row.get(5)?,
        texture_hash: row.get(6)?,
        texture_x: row.get(7)?,
        texture_y: row.get(8)?,
        spread_type: row.get(9)?,
        collision_type: row.get(10)?,
        rarity: row.get(11)?,
        max_amount: row.get(12)?,
        break_hits: row.get(13)?,
        override_item_data: row.get(14)?,
    })
}

/// Look up an item row by its stable numeric key.
///
/// # Errors
///
/// Returns an error only on genuine SQLite failure, never for a missing row.
pub fn find_item(conn: &Connection, game_id: i32) -> rusqlite::Result<Option<ItemRecord>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE game_id = ?1");
    conn.query_row(&sql, params![game_id], item_from_row).optional()
}

/// Insert a full item row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_item(conn: &Connection, record: &ItemRecord) -> rusqlite::Result<()> {
    let sql = format!(
        "INSERT INTO items ({ITEM_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
    );
    conn.execute(
        &sql,
        params![
            record.id,
            record.game_id,
            record.action_type,
            record.item_category,
            record.name,
            record.texture,
            record.texture_hash,
            record.texture_x,
            record.texture_y,
            record.spread_type,
            record.collision_type,
            record.rarity,
            record.max_amount,
            record.break_hits,
            record.override_item_data,
        ],
    )?;
    Ok(())
}

/// Update exactly one item column, rewriting the packed id alongside it.
///
/// `column` comes from the static field-descriptor table, never from input.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_item_field(
    conn: &Connection,
    game_id: i32,
    column: &'static str,
    value: &dyn rusqlite::ToSql,
    new_id: &str,
) -> rusqlite::Result<()> {
    let sql = format!("UPDATE items SET {column} = ?1, id = ?2 WHERE game_id = ?3");
    conn.execute(&sql, params![value, new_id, game_id])?;
    Ok(())
}
