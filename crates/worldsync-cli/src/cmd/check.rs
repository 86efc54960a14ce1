use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use worldsync_core::assets::{resolve_dir, verify_referenced};
use worldsync_core::catalog::{RawCatalog, in_scope_items, referenced_textures};
use worldsync_core::classify::Classifier;
use worldsync_core::config::SyncConfig;
use worldsync_core::error::SyncError;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the item catalog JSON file.
    pub catalog: PathBuf,

    /// Texture image directory (overrides worldsync.toml).
    #[arg(long)]
    pub textures: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    item_dat_version: u32,
    total_items: usize,
    in_scope_items: usize,
    referenced_textures: usize,
    missing_textures: Vec<String>,
}

/// Validate the catalog and texture directory without touching the store.
///
/// Exits non-zero when the sync preflight would fail.
pub fn run(args: &CheckArgs, mode: OutputMode) -> Result<()> {
    let mut config = SyncConfig::load_from_dir(Path::new("."))?;
    if let Some(textures) = &args.textures {
        config.textures_dir.clone_from(textures);
    }

    let catalog = RawCatalog::load(&args.catalog)?;
    let classifier = Classifier::default();
    let items = in_scope_items(&catalog, &classifier);
    let required = referenced_textures(&items);
    let assets = resolve_dir(&config.textures_dir)?;

    let missing = match verify_referenced(&required, &assets) {
        Ok(()) => Vec::new(),
        Err(SyncError::MissingTextures { missing }) => missing,
        Err(err) => return Err(err.into()),
    };

    let report = CheckReport {
        item_dat_version: catalog.item_dat_version,
        total_items: catalog.items.len(),
        in_scope_items: items.len(),
        referenced_textures: required.len(),
        missing_textures: missing,
    };

    render(mode, &report, |report, out| {
        writeln!(out, "catalog version:     {}", report.item_dat_version)?;
        writeln!(out, "items total:         {}", report.total_items)?;
        writeln!(out, "items in scope:      {}", report.in_scope_items)?;
        writeln!(out, "textures referenced: {}", report.referenced_textures)?;
        if report.missing_textures.is_empty() {
            writeln!(out, "all referenced textures resolve")
        } else {
            writeln!(out, "missing textures:    {}", report.missing_textures.join(", "))
        }
    })?;

    if report.missing_textures.is_empty() {
        Ok(())
    } else {
        Err(SyncError::MissingTextures {
            missing: report.missing_textures,
        }
        .into())
    }
}
