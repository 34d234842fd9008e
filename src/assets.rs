//! Offline-first cache for the application's own static assets.
//!
//! The disk layout mirrors a service worker cache: one generation directory
//! named by [`ASSET_CACHE_VERSION`]; install prefetches a fixed asset list
//! into it, activation prunes every generation with any other name.
//! Fetching the app shell (a navigation to the origin root) is
//! network-first with fallback to the cached shell; other same-origin
//! fetches are cache-first with a background refresh. Cross-origin requests
//! are never intercepted.

use color_eyre::{eyre::eyre, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, warn};
use url::Url;

/// Cache generation name; bumping it invalidates everything on activate.
pub const ASSET_CACHE_VERSION: &str = "ws-cache-v1";

/// Install/activate completion, reported to the event loop.
#[derive(Debug)]
pub enum AssetEvent {
  Ready { cached: usize },
  Failed(String),
}

#[derive(Clone)]
pub struct AssetCache {
  http: reqwest::Client,
  origin: Url,
  /// Parent directory of all cache generations
  root: PathBuf,
}

impl AssetCache {
  pub fn new(origin: &str, root: PathBuf) -> Result<Self> {
    let origin = Url::parse(origin).map_err(|e| eyre!("Invalid asset origin {}: {}", origin, e))?;
    if origin.host_str().is_none() {
      return Err(eyre!("Asset origin has no host: {}", origin));
    }

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, origin, root })
  }

  /// Default generation parent under the user cache directory.
  pub fn default_root() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
      .ok_or_else(|| eyre!("Could not determine cache directory"))?;

    Ok(cache_dir.join("worg").join("assets"))
  }

  fn generation_dir(&self) -> PathBuf {
    self.root.join(ASSET_CACHE_VERSION)
  }

  /// Entry file for a same-origin URL, addressed by its path and query.
  fn entry_path(&self, url: &Url) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.path().as_bytes());
    if let Some(query) = url.query() {
      hasher.update(b"?");
      hasher.update(query.as_bytes());
    }
    self.generation_dir().join(hex::encode(hasher.finalize()))
  }

  /// Prefetch the fixed asset list into the current generation.
  ///
  /// Individual fetch failures are skipped (missing assets must not abort
  /// the install); returns how many entries were cached.
  pub async fn install(&self, paths: &[String]) -> Result<usize> {
    std::fs::create_dir_all(self.generation_dir())
      .map_err(|e| eyre!("Failed to create asset cache: {}", e))?;

    let mut cached = 0;
    for path in paths {
      let url = match self.origin.join(path) {
        Ok(url) => url,
        Err(e) => {
          warn!("skipping unjoinable asset path {}: {}", path, e);
          continue;
        }
      };
      match self.network_get(url.clone()).await {
        Ok(body) => {
          self.write_entry(&url, &body);
          cached += 1;
        }
        Err(e) => {
          debug!("asset {} not prefetched: {}", path, e);
        }
      }
    }

    Ok(cached)
  }

  /// Prune every cache generation other than the current one.
  pub fn activate(&self) -> Result<()> {
    let entries = match std::fs::read_dir(&self.root) {
      Ok(entries) => entries,
      Err(_) => return Ok(()), // nothing installed yet
    };

    for entry in entries.flatten() {
      let path = entry.path();
      if path.is_dir() && entry.file_name() != ASSET_CACHE_VERSION {
        if let Err(e) = std::fs::remove_dir_all(&path) {
          warn!("failed to prune stale asset cache {}: {}", path.display(), e);
        }
      }
    }

    Ok(())
  }

  /// Fetch a URL through the cache strategies.
  pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    let url = Url::parse(url).map_err(|e| eyre!("Invalid asset URL {}: {}", url, e))?;

    if !self.is_same_origin(&url) {
      // Not intercepted: plain network fetch, nothing cached.
      return self.network_get(url).await;
    }

    if url.path() == "/" {
      self.fetch_navigation(url).await
    } else {
      self.fetch_cache_first(url).await
    }
  }

  /// The app shell, network-first with fallback to the cached root.
  pub async fn fetch_app_shell(&self) -> Result<Vec<u8>> {
    let root = self.origin.join("/").map_err(|e| eyre!("Bad origin: {}", e))?;
    self.fetch_navigation(root).await
  }

  async fn fetch_navigation(&self, url: Url) -> Result<Vec<u8>> {
    match self.network_get(url.clone()).await {
      Ok(body) => {
        self.write_entry(&url, &body);
        Ok(body)
      }
      Err(e) => {
        debug!("navigation fetch failed, trying cached shell: {}", e);
        self
          .read_entry(&url)
          .ok_or_else(|| eyre!("Offline and no cached shell: {}", e))
      }
    }
  }

  async fn fetch_cache_first(&self, url: Url) -> Result<Vec<u8>> {
    if let Some(cached) = self.read_entry(&url) {
      // Serve the cached copy now; refresh it behind the response.
      let this = self.clone();
      tokio::spawn(async move {
        if let Ok(body) = this.network_get(url.clone()).await {
          this.write_entry(&url, &body);
        }
      });
      return Ok(cached);
    }

    let body = self.network_get(url.clone()).await?;
    self.write_entry(&url, &body);
    Ok(body)
  }

  async fn network_get(&self, url: Url) -> Result<Vec<u8>> {
    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch {}: {}", url, e))?;

    if !response.status().is_success() {
      return Err(eyre!("{} returned {}", url, response.status()));
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read {}: {}", url, e))?;

    Ok(body.to_vec())
  }

  fn is_same_origin(&self, url: &Url) -> bool {
    url.scheme() == self.origin.scheme()
      && url.host_str() == self.origin.host_str()
      && url.port_or_known_default() == self.origin.port_or_known_default()
  }

  fn read_entry(&self, url: &Url) -> Option<Vec<u8>> {
    std::fs::read(self.entry_path(url)).ok()
  }

  fn write_entry(&self, url: &Url, body: &[u8]) {
    let path = self.entry_path(url);
    if let Some(parent) = path.parent() {
      let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = std::fs::write(&path, body) {
      warn!("failed to cache asset {}: {}", url, e);
    }
  }
}
