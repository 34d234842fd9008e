//! The authentication collaborator boundary.
//!
//! Auth itself is external: the app only sees "an account is present" or
//! not, and reacts to changes the way it would to any auth-state
//! notification.

use crate::config::SyncConfig;

/// An authenticated account, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
  pub id: String,
  pub email: Option<String>,
}

impl Account {
  pub fn from_config(sync: &SyncConfig) -> Self {
    Self {
      id: sync.account_id.clone(),
      email: sync.email.clone(),
    }
  }
}
