use serde::{Deserialize, Serialize};

use crate::model::Collection;

/// The cloud-stored document for one account.
///
/// Upserts merge at the document level: fields absent from a write are
/// preserved server-side, but `groups` is always fully replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
  pub groups: Collection,
  /// ISO-8601, set by the writer
  pub last_updated: String,
  pub user_id: String,
  #[serde(default)]
  pub email: Option<String>,
}
