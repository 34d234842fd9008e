//! The collection model: named groups of keywords.
//!
//! A `Collection` (an ordered `Vec<Group>`) is the single unit of
//! persistence and sync. Group order and keyword order are user-significant
//! and must survive every storage tier unchanged.

pub mod keyword;
pub mod palette;

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};

/// A named, ordered bag of keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub name: String,
  pub keywords: Vec<String>,
}

/// The full ordered set of groups.
pub type Collection = Vec<Group>;

/// Built-in groups seeded on first run (no stored data anywhere).
pub fn default_collection() -> Collection {
  vec![
    Group {
      name: "Popular Sites".to_string(),
      keywords: vec![
        "Google.com".to_string(),
        "www.youtube.com".to_string(),
        "fb".to_string(),
        "https://x.com/".to_string(),
        "https://www.reddit.com/".to_string(),
        "https://www.linkedin.com/".to_string(),
      ],
    },
    Group {
      name: "Dev Tools".to_string(),
      keywords: vec![
        "github.com".to_string(),
        "docs.rs".to_string(),
        "rust async runtime".to_string(),
      ],
    },
  ]
}

/// Parse a collection from JSON at a load boundary (local store, remote
/// document, import file).
///
/// The typed deserialization is the invariant check: anything that is not an
/// array of `{name: string, keywords: [string]}` is rejected wholesale.
pub fn parse_collection(json: &str) -> Result<Collection> {
  serde_json::from_str(json).map_err(|e| eyre!("Invalid collection data: {}", e))
}

/// Serialize for persistence (compact).
pub fn to_json(groups: &Collection) -> Result<String> {
  serde_json::to_string(groups).map_err(|e| eyre!("Failed to serialize collection: {}", e))
}

/// Serialize for export (pretty-printed, matches the export file format).
pub fn to_json_pretty(groups: &Collection) -> Result<String> {
  serde_json::to_string_pretty(groups).map_err(|e| eyre!("Failed to serialize collection: {}", e))
}

/// Outcome of an import merge, for user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
  /// Keywords appended into existing groups
  pub keywords_merged: usize,
  /// Groups appended wholesale
  pub groups_added: usize,
}

/// Merge imported groups into an existing collection.
///
/// For each imported group, an existing group with the exact same name
/// receives every imported keyword not already present verbatim (set-union,
/// case-sensitive, order-preserving). Unmatched groups are appended
/// wholesale. Importing the same payload twice is a no-op the second time.
pub fn merge_import(groups: &mut Collection, imported: Vec<Group>) -> ImportStats {
  let mut stats = ImportStats {
    keywords_merged: 0,
    groups_added: 0,
  };

  for imported_group in imported {
    match groups.iter_mut().find(|g| g.name == imported_group.name) {
      Some(existing) => {
        for keyword in imported_group.keywords {
          if !existing.keywords.contains(&keyword) {
            existing.keywords.push(keyword);
            stats.keywords_merged += 1;
          }
        }
      }
      None => {
        groups.push(imported_group);
        stats.groups_added += 1;
      }
    }
  }

  stats
}

/// Move the group at `from` to position `to`, shifting the others.
///
/// Returns false (collection untouched) when either index is out of range.
pub fn reorder(groups: &mut Collection, from: usize, to: usize) -> bool {
  if from >= groups.len() || to >= groups.len() {
    return false;
  }
  let group = groups.remove(from);
  groups.insert(to, group);
  true
}

/// Case-insensitive search across a group's name and keywords.
pub fn matches_search(group: &Group, term: &str) -> bool {
  if term.is_empty() {
    return true;
  }
  let term = term.to_lowercase();
  group.name.to_lowercase().contains(&term)
    || group
      .keywords
      .iter()
      .any(|k| k.to_lowercase().contains(&term))
}
