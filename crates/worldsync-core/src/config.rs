use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name probed in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "worldsync.toml";

/// Sync configuration, loaded from `worldsync.toml`.
///
/// Every field has a default so a missing file or a partial file both work;
/// CLI flags override whatever was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// SQLite store path.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Directory of texture images.
    #[serde(default = "default_textures_dir")]
    pub textures_dir: PathBuf,
    /// Directory of weather overlay images.
    #[serde(default = "default_weather_dir")]
    pub weather_dir: PathBuf,
    /// Worker discriminant embedded in generated asset ids (10 bits used).
    #[serde(default = "default_worker_id")]
    pub worker_id: u16,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            textures_dir: default_textures_dir(),
            weather_dir: default_weather_dir(),
            worker_id: default_worker_id(),
        }
    }
}

impl SyncConfig {
    /// Parse a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Load `worldsync.toml` from `dir` when present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file exists but fails to parse; an
    /// absent file is not an error.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Lock file guarding the store against concurrent sync runs.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.store_path.with_extension("lock")
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("world-planner.sqlite3")
}

fn default_textures_dir() -> PathBuf {
    PathBuf::from("textures")
}

fn default_weather_dir() -> PathBuf {
    PathBuf::from("weather")
}

const fn default_worker_id() -> u16 {
    1
}
