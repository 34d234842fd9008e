//! The cache envelope: a versioned, timestamped snapshot of the collection
//! with its own expiry policy, independent of the working copy's record.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};

use crate::model::Collection;

/// Version tag written into every envelope.
pub const CACHE_VERSION: &str = "v1.2";

/// Envelopes older than this are evicted on load (7 days).
pub const CACHE_MAX_AGE_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// The snapshot record stored under [`crate::store::CACHE_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
  pub version: String,
  /// Epoch milliseconds at write time
  pub timestamp: i64,
  pub data: Collection,
}

impl CacheEnvelope {
  /// Wrap a collection with the current version tag and timestamp.
  pub fn now(data: Collection) -> Self {
    Self {
      version: CACHE_VERSION.to_string(),
      timestamp: Utc::now().timestamp_millis(),
      data,
    }
  }

  /// Whether the envelope has outlived the expiry policy at `now_ms`.
  pub fn is_expired(&self, now_ms: i64) -> bool {
    now_ms - self.timestamp > CACHE_MAX_AGE_MS
  }

  /// Age in whole days at `now_ms`.
  pub fn age_days(&self, now_ms: i64) -> i64 {
    (now_ms - self.timestamp) / (24 * 60 * 60 * 1000)
  }

  pub fn to_json(&self) -> Result<String> {
    serde_json::to_string(self).map_err(|e| eyre!("Failed to serialize cache envelope: {}", e))
  }

  pub fn from_json(json: &str) -> Result<Self> {
    serde_json::from_str(json).map_err(|e| eyre!("Invalid cache envelope: {}", e))
  }
}

/// Summary of the current snapshot, for the cache status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
  pub version: String,
  pub age_days: i64,
  pub groups: usize,
  pub keywords: usize,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::default_collection;

  #[test]
  fn test_envelope_round_trip() {
    let envelope = CacheEnvelope::now(default_collection());
    let parsed = CacheEnvelope::from_json(&envelope.to_json().unwrap()).unwrap();
    assert_eq!(parsed.version, CACHE_VERSION);
    assert_eq!(parsed.timestamp, envelope.timestamp);
    assert_eq!(parsed.data, envelope.data);
  }

  #[test]
  fn test_expiry_boundary() {
    let envelope = CacheEnvelope {
      version: CACHE_VERSION.to_string(),
      timestamp: 0,
      data: Vec::new(),
    };
    assert!(!envelope.is_expired(CACHE_MAX_AGE_MS));
    assert!(envelope.is_expired(CACHE_MAX_AGE_MS + 1));
  }

  #[test]
  fn test_age_days() {
    let three_days = 3 * 24 * 60 * 60 * 1000;
    let envelope = CacheEnvelope {
      version: CACHE_VERSION.to_string(),
      timestamp: 1_000_000,
      data: Vec::new(),
    };
    assert_eq!(envelope.age_days(1_000_000 + three_days), 3);
  }
}
