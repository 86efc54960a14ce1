use anyhow::{Context as _, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use worldsync_core::assets::resolve_dir;
use worldsync_core::catalog::RawCatalog;
use worldsync_core::classify::Classifier;
use worldsync_core::config::SyncConfig;
use worldsync_core::db::open_store;
use worldsync_core::ids::AssetIdGenerator;
use worldsync_core::lock::RunLock;
use worldsync_core::reconcile;

use crate::output::{OutputMode, render};

/// How long a run waits for a concurrent run to finish.
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the item catalog JSON file.
    pub catalog: PathBuf,

    /// SQLite store path (overrides worldsync.toml).
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Texture image directory (overrides worldsync.toml).
    #[arg(long)]
    pub textures: Option<PathBuf>,

    /// Weather overlay directory (overrides worldsync.toml).
    #[arg(long)]
    pub weather: Option<PathBuf>,

    /// Worker discriminant embedded in generated asset ids.
    #[arg(long)]
    pub worker_id: Option<u16>,
}

impl SyncArgs {
    fn effective_config(&self) -> Result<SyncConfig> {
        let mut config = SyncConfig::load_from_dir(Path::new("."))?;
        if let Some(store) = &self.store {
            config.store_path.clone_from(store);
        }
        if let Some(textures) = &self.textures {
            config.textures_dir.clone_from(textures);
        }
        if let Some(weather) = &self.weather {
            config.weather_dir.clone_from(weather);
        }
        if let Some(worker_id) = self.worker_id {
            config.worker_id = worker_id;
        }
        Ok(config)
    }
}

/// Run one full reconciliation pass and print the per-phase report.
pub fn run(args: &SyncArgs, mode: OutputMode) -> Result<()> {
    let config = args.effective_config()?;

    let _lock = RunLock::acquire(&config.lock_path(), LOCK_TIMEOUT)?;

    let catalog = RawCatalog::load(&args.catalog)?;
    let textures = resolve_dir(&config.textures_dir)?;
    let weather = if config.weather_dir.is_dir() {
        resolve_dir(&config.weather_dir)?
    } else {
        warn!(dir = %config.weather_dir.display(), "weather directory absent, skipping class");
        Vec::new()
    };

    let mut conn = open_store(&config.store_path)
        .with_context(|| format!("open store {}", config.store_path.display()))?;

    let classifier = Classifier::default();
    let mut ids = AssetIdGenerator::new(config.worker_id);
    let report = reconcile::run(
        &mut conn,
        &classifier,
        &mut ids,
        &catalog,
        &textures,
        &weather,
    )?;

    render(mode, &report, |report, out| writeln!(out, "{report}"))
}
