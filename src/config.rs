use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for the header (defaults to "worg")
  pub title: Option<String>,
  /// Cloud sync; absent means local-only operation
  pub sync: Option<SyncConfig>,
  /// Offline asset prefetch; absent disables the asset cache
  pub assets: Option<AssetsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  /// Base URL of the document store
  pub url: String,
  /// Account the remote document is keyed by
  pub account_id: String,
  pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
  /// Origin serving the application's own static assets
  pub origin: String,
  /// Same-origin asset paths prefetched on install
  #[serde(default)]
  pub prefetch: Vec<String>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./worg.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/worg/config.yaml
  ///
  /// No file found is not an error: the app runs local-only with defaults.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("worg.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("worg").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the sync service token from the environment.
  pub fn get_sync_token() -> Result<String> {
    std::env::var("WORG_SYNC_TOKEN")
      .map_err(|_| eyre!("Sync token not found. Set the WORG_SYNC_TOKEN environment variable."))
  }
}
