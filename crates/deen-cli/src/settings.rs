//! Where the store and backups live.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = "~/.config/deen/config.toml";
const DEFAULT_STORE: &str = "~/.local/share/deen/journal.db";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file.
  pub store_path: PathBuf,
  /// Directory `deen export` writes into when `--out` is not given.
  pub backup_dir: PathBuf,
}

impl Settings {
  /// Layer built-in defaults, the TOML config file, `DEEN_*` environment
  /// variables and finally `--store`.
  ///
  /// The default config file may be absent; an explicit `--config` must
  /// exist.
  pub fn load(config_file: Option<&Path>, store: Option<PathBuf>) -> Result<Self> {
    let file = match config_file {
      Some(path) => path.to_path_buf(),
      None => expand_tilde(Path::new(DEFAULT_CONFIG)),
    };

    let mut settings: Settings = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE)?
      .set_default("backup_dir", ".")?
      .add_source(config::File::from(file.as_path()).required(config_file.is_some()))
      .add_source(config::Environment::with_prefix("DEEN"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")?;

    if let Some(store) = store {
      settings.store_path = store;
    }
    settings.store_path = expand_tilde(&settings.store_path);
    settings.backup_dir = expand_tilde(&settings.backup_dir);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
