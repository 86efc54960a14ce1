//! Canonical SQLite schema for the world-planner store.
//!
//! Three collections, normalized for the reconciliation access paths:
//! - `items` keeps one row per `game_id` with the latest catalog fields
//! - `textures` and `weather` keep one row per asset name with its content
//!   hash and raw bytes
//!
//! Asset rows carry a `UNIQUE` name so the one-record-per-name invariant is
//! enforced by the store itself; the one-record-per-hash invariant is only
//! expected, and its violation is what the conflict repair path handles.

/// Migration v1: the three collections.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id TEXT NOT NULL CHECK (length(id) = 18),
    game_id INTEGER PRIMARY KEY,
    action_type INTEGER NOT NULL,
    item_category INTEGER,
    name TEXT NOT NULL,
    texture TEXT NOT NULL,
    texture_hash TEXT NOT NULL,
    texture_x INTEGER NOT NULL,
    texture_y INTEGER NOT NULL,
    spread_type INTEGER NOT NULL,
    collision_type INTEGER NOT NULL,
    rarity INTEGER NOT NULL,
    max_amount INTEGER NOT NULL,
    break_hits INTEGER NOT NULL,
    override_item_data INTEGER NOT NULL DEFAULT 0 CHECK (override_item_data IN (0, 1))
);

CREATE TABLE IF NOT EXISTS textures (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    hash TEXT NOT NULL,
    contents BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS weather (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    hash TEXT NOT NULL,
    contents BLOB NOT NULL
);
";

/// Migration v2: hash-lookup indexes for the asset reconciler's read path.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_textures_hash ON textures(hash);

CREATE INDEX IF NOT EXISTS idx_weather_hash ON weather(hash);
";
