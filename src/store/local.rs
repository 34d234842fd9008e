//! The durable local store: working copy, cache snapshot, and theme
//! preference, all under fixed string keys.
//!
//! Failures here never halt the app. A store that cannot be opened or fails
//! its startup probe degrades to memory-only for the session; corrupt
//! records are treated as absent.

use chrono::Utc;
use color_eyre::Result;
use std::path::Path;
use tracing::{info, warn};

use super::kv::KvStore;
use super::snapshot::{CacheEnvelope, CacheStatus};
use crate::model::{self, Collection};

/// Key for the JSON-serialized working copy.
pub const GROUPS_KEY: &str = "websiteSaverGroups";
/// Key for the cache envelope record.
pub const CACHE_KEY: &str = "websiteSaverCache";
/// Key for the theme preference (`"light"` or `"dark"`).
pub const THEME_KEY: &str = "websiteSaverTheme";

/// Durable local store with a probed, optional backing KV store.
pub struct LocalStore {
  kv: Option<KvStore>,
}

impl LocalStore {
  /// Open the default store, probing viability. On any failure the store
  /// runs memory-only and every operation becomes a no-op.
  pub fn open() -> Self {
    match KvStore::open() {
      Ok(kv) if kv.probe() => Self { kv: Some(kv) },
      Ok(_) => {
        warn!("local store failed its write probe, running memory-only");
        Self { kv: None }
      }
      Err(e) => {
        warn!("local store unavailable, running memory-only: {}", e);
        Self { kv: None }
      }
    }
  }

  /// Open a store at an explicit path (tests).
  pub fn open_at(path: &Path) -> Result<Self> {
    let kv = KvStore::open_at(path)?;
    Ok(Self { kv: Some(kv) })
  }

  /// A store with no persistence at all.
  pub fn memory_only() -> Self {
    Self { kv: None }
  }

  /// Whether the backing store survived the startup probe.
  pub fn is_available(&self) -> bool {
    self.kv.is_some()
  }

  /// Persist the working copy. Errors are returned for the caller's
  /// one-time warning; the in-memory copy is unaffected either way.
  pub fn save(&self, groups: &Collection) -> Result<()> {
    let Some(kv) = &self.kv else { return Ok(()) };
    kv.set(GROUPS_KEY, &model::to_json(groups)?)
  }

  /// Load the previously saved working copy. Absent or corrupt records
  /// yield `None`; corruption is logged and the record discarded.
  pub fn load(&self) -> Option<Collection> {
    let kv = self.kv.as_ref()?;
    let raw = match kv.get(GROUPS_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        warn!("failed to read stored groups: {}", e);
        return None;
      }
    };

    match model::parse_collection(&raw) {
      Ok(groups) => Some(groups),
      Err(e) => {
        warn!("stored groups are corrupt, discarding: {}", e);
        let _ = kv.remove(GROUPS_KEY);
        None
      }
    }
  }

  /// Write a cache envelope with the current timestamp and version tag.
  pub fn save_to_cache(&self, groups: &Collection) -> Result<()> {
    let Some(kv) = &self.kv else { return Ok(()) };
    kv.set(CACHE_KEY, &CacheEnvelope::now(groups.clone()).to_json()?)
  }

  /// Load the cached collection if the envelope is within its 7-day
  /// expiry. Expired or corrupt envelopes are evicted and treated as a
  /// miss.
  pub fn load_from_cache(&self) -> Option<Collection> {
    let kv = self.kv.as_ref()?;
    let envelope = self.read_envelope()?;

    if envelope.is_expired(Utc::now().timestamp_millis()) {
      info!("cache envelope expired, evicting");
      let _ = kv.remove(CACHE_KEY);
      return None;
    }

    Some(envelope.data)
  }

  /// Unconditionally evict the cache envelope.
  pub fn clear_cache(&self) {
    if let Some(kv) = &self.kv {
      let _ = kv.remove(CACHE_KEY);
    }
  }

  /// Snapshot summary for the cache status display.
  pub fn cache_status(&self) -> Option<CacheStatus> {
    let envelope = self.read_envelope()?;
    Some(CacheStatus {
      version: envelope.version.clone(),
      age_days: envelope.age_days(Utc::now().timestamp_millis()),
      groups: envelope.data.len(),
      keywords: envelope.data.iter().map(|g| g.keywords.len()).sum(),
    })
  }

  fn read_envelope(&self) -> Option<CacheEnvelope> {
    let kv = self.kv.as_ref()?;
    let raw = kv.get(CACHE_KEY).ok()??;
    match CacheEnvelope::from_json(&raw) {
      Ok(envelope) => Some(envelope),
      Err(e) => {
        warn!("cache envelope is corrupt, evicting: {}", e);
        let _ = kv.remove(CACHE_KEY);
        None
      }
    }
  }

  pub fn save_theme(&self, theme: &str) {
    if let Some(kv) = &self.kv {
      if let Err(e) = kv.set(THEME_KEY, theme) {
        warn!("failed to save theme preference: {}", e);
      }
    }
  }

  pub fn load_theme(&self) -> Option<String> {
    self.kv.as_ref()?.get(THEME_KEY).ok()?
  }

  #[cfg(test)]
  pub(crate) fn kv(&self) -> Option<&KvStore> {
    self.kv.as_ref()
  }
}
