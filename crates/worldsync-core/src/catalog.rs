//! Catalog ingestion: parse the authored item file and derive the in-scope
//! local item set.
//!
//! The catalog is a JSON envelope `{item_dat_version, items: [...]}`. A
//! malformed envelope is rejected outright before any store access; the rest
//! of the pipeline assumes a well-formed catalog.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::classify::{Category, Classifier};
use crate::error::SyncError;

/// An envelope with fewer entries than this is a truncated export.
pub const MIN_CATALOG_ITEMS: usize = 11_000;

/// Hits of damage a single break consumes.
const HITS_PER_BREAK: i32 = 6;

/// The raw catalog file as authored.
#[derive(Debug, Deserialize)]
pub struct RawCatalog {
    #[serde(default)]
    pub item_dat_version: u32,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// One catalog entry before classification and derivation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: i32,
    pub name: String,
    pub action_type: i32,
    pub texture: String,
    #[serde(default)]
    pub texture_x: i16,
    #[serde(default)]
    pub texture_y: i16,
    #[serde(default)]
    pub spread_type: i16,
    #[serde(default)]
    pub collision_type: i16,
    #[serde(default)]
    pub rarity: i16,
    #[serde(default)]
    pub max_amount: i16,
    #[serde(default)]
    pub break_hits: i32,
}

impl RawCatalog {
    /// Read and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] when the file cannot be read and
    /// [`SyncError::CatalogRejected`] when the JSON or the envelope is
    /// malformed (missing version, missing items, truncated item list).
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Self =
            serde_json::from_str(&text).map_err(|err| SyncError::CatalogRejected {
                reason: format!("invalid JSON: {err}"),
            })?;
        catalog.validate_envelope()?;
        Ok(catalog)
    }

    /// Envelope rules: a version must be present and the item list must not
    /// look truncated.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CatalogRejected`] with the failed rule.
    pub fn validate_envelope(&self) -> Result<(), SyncError> {
        if self.item_dat_version == 0 {
            return Err(SyncError::CatalogRejected {
                reason: "missing item_dat_version".to_string(),
            });
        }
        if self.items.len() < MIN_CATALOG_ITEMS {
            return Err(SyncError::CatalogRejected {
                reason: format!(
                    "expected at least {MIN_CATALOG_ITEMS} items, found {}",
                    self.items.len()
                ),
            });
        }
        Ok(())
    }
}

/// An item selected for persistence, fields already derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalItem {
    /// Stable numeric key (`game_id` column).
    pub game_id: i32,
    pub name: String,
    /// Semantic category from the classifier.
    pub category: Category,
    pub action_type: i32,
    /// Bare texture name, extension stripped.
    pub texture: String,
    pub texture_x: i16,
    pub texture_y: i16,
    pub spread_type: i16,
    pub collision_type: i16,
    pub rarity: i16,
    /// Derived: source zero becomes 1.
    pub max_amount: i16,
    /// Derived: `max(1, raw / 6)`.
    pub break_hits: i16,
}

impl LocalItem {
    /// Classify and derive a raw entry. Callers filter for scope separately.
    #[must_use]
    pub fn from_raw(raw: &RawItem, classifier: &Classifier) -> Self {
        Self {
            game_id: raw.id,
            name: raw.name.clone(),
            category: classifier.classify(raw.action_type),
            action_type: raw.action_type,
            texture: bare_texture_name(&raw.texture),
            texture_x: raw.texture_x,
            texture_y: raw.texture_y,
            spread_type: raw.spread_type,
            collision_type: raw.collision_type,
            rarity: raw.rarity,
            max_amount: derive_max_amount(raw.max_amount),
            break_hits: derive_break_hits(raw.break_hits),
        }
    }
}

/// Select and transform the catalog entries eligible for persistence.
#[must_use]
pub fn in_scope_items(catalog: &RawCatalog, classifier: &Classifier) -> Vec<LocalItem> {
    catalog
        .items
        .iter()
        .map(|raw| LocalItem::from_raw(raw, classifier))
        .filter(|item| classifier.in_scope(item.category, &item.name))
        .collect()
}

/// Distinct bare texture names referenced by the in-scope item set.
#[must_use]
pub fn referenced_textures(items: &[LocalItem]) -> BTreeSet<String> {
    items.iter().map(|item| item.texture.clone()).collect()
}

/// Strip the extension suffix from a texture file name.
#[must_use]
pub fn bare_texture_name(file_name: &str) -> String {
    file_name
        .split_once('.')
        .map_or(file_name, |(bare, _)| bare)
        .to_string()
}

/// Persisted break hits: one per six hits of damage, floored, minimum 1.
#[must_use]
pub fn derive_break_hits(raw: i32) -> i16 {
    let derived = raw / HITS_PER_BREAK;
    i16::try_from(derived.max(1)).unwrap_or(i16::MAX)
}

/// Persisted max amount: a zero source value means a stack of one.
#[must_use]
pub const fn derive_max_amount(raw: i16) -> i16 {
    if raw == 0 { 1 } else { raw }
}
