//! Local asset resolution: walk an image directory into fingerprinted,
//! name-deduplicated [`LocalAsset`]s.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::error::SyncError;
use crate::hash::digest_hex;

/// File extensions treated as asset images.
const IMAGE_EXTENSIONS: &[&str] = &["png"];

/// The two asset classes, each persisted in its own store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Texture,
    Weather,
}

impl AssetClass {
    /// Store collection backing this class.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Texture => "textures",
            Self::Weather => "weather",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A named binary asset recomputed from disk every run.
///
/// Identity for reconciliation is `name`; `digest` is the change key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    /// Bare file name, extension stripped.
    pub name: String,
    pub bytes: Vec<u8>,
    pub digest: String,
}

impl LocalAsset {
    /// Build an asset from raw bytes, fingerprinting them.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let digest = digest_hex(&bytes);
        Self {
            name: name.into(),
            bytes,
            digest,
        }
    }
}

/// Read every image file directly under `dir` into a de-duplicated,
/// name-ordered asset list.
///
/// Non-image entries and subdirectories are ignored. Two files that strip to
/// the same bare name keep whichever sorts last, so the result has one asset
/// per name.
///
/// # Errors
///
/// Returns [`SyncError::Io`] when the directory or any image file cannot be
/// read.
pub fn resolve_dir(dir: &Path) -> Result<Vec<LocalAsset>, SyncError> {
    let mut by_name: BTreeMap<String, LocalAsset> = BTreeMap::new();

    let entries = std::fs::read_dir(dir).map_err(|source| SyncError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| SyncError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let bytes = std::fs::read(&path).map_err(|source| SyncError::Io {
            path: path.clone(),
            source,
        })?;
        by_name.insert(stem.to_string(), LocalAsset::new(stem, bytes));
    }

    Ok(by_name.into_values().collect())
}

/// Preflight: every referenced texture must resolve to a local asset before
/// any write path opens.
///
/// # Errors
///
/// Returns [`SyncError::MissingTextures`] listing the unresolved names.
pub fn verify_referenced(
    required: &BTreeSet<String>,
    assets: &[LocalAsset],
) -> Result<(), SyncError> {
    let resolved: BTreeSet<&str> = assets.iter().map(|asset| asset.name.as_str()).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !resolved.contains(name.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SyncError::MissingTextures { missing })
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|image| ext.eq_ignore_ascii_case(image)))
}
