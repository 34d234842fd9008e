//! The sync coordinator.
//!
//! Owns the in-memory working copy and keeps the three storage tiers
//! (durable local record, cache envelope, remote document) eventually
//! consistent with it. All UI mutations come through here; all network
//! completions come back as [`SyncEvent`]s on the app's event channel.
//!
//! The working copy always wins over a slower tier: a remote save failure
//! never rolls a mutation back, and a remote load that finishes after an
//! intervening mutation is discarded via the sequence token it carried.

use color_eyre::{eyre::eyre, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::auth::Account;
use crate::event::Event;
use crate::model::{self, Collection, Group, ImportStats};
use crate::remote::{RemoteClient, RemoteDocument};
use crate::store::{CacheStatus, LocalStore};

/// Where the currently displayed collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
  Defaults,
  LocalStore,
  CacheSnapshot,
  Remote,
}

impl DataSource {
  pub fn label(&self) -> &'static str {
    match self {
      DataSource::Defaults => "defaults",
      DataSource::LocalStore => "local",
      DataSource::CacheSnapshot => "offline-ready",
      DataSource::Remote => "cloud",
    }
  }
}

/// Result of a background remote load.
#[derive(Debug)]
pub enum RemoteLoadOutcome {
  /// The account has a document
  Document(Box<RemoteDocument>),
  /// No document yet; first cloud write happens on the next mutation
  Absent,
  /// Network or auth failure; the local copy stands
  Failed(String),
}

/// Completions and notifications from fire-and-forget sync work.
#[derive(Debug)]
pub enum SyncEvent {
  /// A remote load finished. `seq` is the mutation counter captured when
  /// the load was spawned; stale loads are discarded on receipt.
  RemoteLoaded { seq: u64, outcome: RemoteLoadOutcome },
  RemoteSaved,
  RemoteSaveFailed(String),
  /// One-time warning that local persistence is failing
  StorageWarning(String),
}

pub struct SyncCoordinator {
  /// The working copy. The only collection UI mutations touch.
  groups: Collection,
  source: DataSource,
  local: LocalStore,
  remote: Option<RemoteClient>,
  account: Option<Account>,
  /// Monotonic counter bumped by every mutation; loads carry the value
  /// they started with so late results can be recognized as stale.
  mutation_seq: u64,
  storage_warned: bool,
  event_tx: Option<mpsc::UnboundedSender<Event>>,
}

impl SyncCoordinator {
  pub fn new(local: LocalStore, remote: Option<RemoteClient>) -> Self {
    Self {
      groups: model::default_collection(),
      source: DataSource::Defaults,
      local,
      remote,
      account: None,
      mutation_seq: 0,
      storage_warned: false,
      event_tx: None,
    }
  }

  /// Wire up the channel that background tasks report through.
  pub fn set_event_sender(&mut self, tx: mpsc::UnboundedSender<Event>) {
    self.event_tx = Some(tx);
  }

  pub fn groups(&self) -> &Collection {
    &self.groups
  }

  pub fn group(&self, index: usize) -> Option<&Group> {
    self.groups.get(index)
  }

  pub fn source(&self) -> DataSource {
    self.source
  }

  pub fn account(&self) -> Option<&Account> {
    self.account.as_ref()
  }

  pub fn is_authenticated(&self) -> bool {
    self.account.is_some()
  }

  pub fn store(&self) -> &LocalStore {
    &self.local
  }

  // ==========================================================================
  // Load protocol
  // ==========================================================================

  /// React to an auth-state notification.
  ///
  /// Authenticated entry: serve the cache snapshot immediately if present,
  /// then load the remote document in the background; its result arrives as
  /// [`SyncEvent::RemoteLoaded`]. Unauthenticated entry: cache, else
  /// defaults; the remote is never consulted.
  pub fn handle_auth_changed(&mut self, account: Option<Account>) {
    self.account = account;

    match self.local.load_from_cache() {
      Some(cached) if !cached.is_empty() => {
        self.groups = cached;
        self.source = DataSource::CacheSnapshot;
      }
      _ => {
        if self.account.is_some() {
          // No usable snapshot; show the durable copy while the network
          // round trip is in flight.
          self.load_local_or_default();
        } else {
          // Unauthenticated sessions never read the durable record; they
          // get the snapshot or the built-ins.
          self.groups = model::default_collection();
          self.source = DataSource::Defaults;
        }
      }
    }

    if self.account.is_some() {
      self.spawn_remote_load();
    } else {
      info!("unauthenticated, serving {} data", self.source.label());
    }
  }

  /// Re-run the remote side of the load protocol (the `:sync` command).
  pub fn sync_now(&mut self) -> bool {
    if self.account.is_none() {
      return false;
    }
    self.spawn_remote_load();
    true
  }

  fn load_local_or_default(&mut self) {
    match self.local.load() {
      Some(stored) => {
        self.groups = stored;
        self.source = DataSource::LocalStore;
      }
      None => self.seed_defaults(),
    }
  }

  fn seed_defaults(&mut self) {
    self.groups = model::default_collection();
    self.source = DataSource::Defaults;
    // First run or corrupt store: the defaults become the stored copy.
    self.persist_tiers();
  }

  fn spawn_remote_load(&mut self) {
    let (Some(remote), Some(account)) = (self.remote.clone(), self.account.clone()) else {
      return;
    };
    let Some(tx) = self.event_tx.clone() else {
      return;
    };
    let seq = self.mutation_seq;

    tokio::spawn(async move {
      let outcome = match remote.load_user_data(&account.id).await {
        Ok(Some(document)) => RemoteLoadOutcome::Document(Box::new(document)),
        Ok(None) => RemoteLoadOutcome::Absent,
        Err(e) => RemoteLoadOutcome::Failed(e.to_string()),
      };
      let _ = tx.send(Event::Sync(SyncEvent::RemoteLoaded { seq, outcome }));
    });
  }

  /// Apply a finished remote load to the working copy.
  ///
  /// Returns the user-visible notification, if any.
  pub fn handle_remote_loaded(
    &mut self,
    seq: u64,
    outcome: RemoteLoadOutcome,
  ) -> Option<String> {
    if self.account.is_none() {
      info!("discarding remote load result after logout");
      return None;
    }
    if seq != self.mutation_seq {
      // A mutation landed while the load was in flight; the working copy
      // is newer than what the comparison below would be based on.
      info!("discarding stale remote load (seq {} != {})", seq, self.mutation_seq);
      return None;
    }

    match outcome {
      RemoteLoadOutcome::Failed(message) => {
        warn!("remote load failed: {}", message);
        Some("⚠ Cloud sync failed, using local data".to_string())
      }
      RemoteLoadOutcome::Absent => {
        info!("no remote document yet; first cloud write deferred to next change");
        if self.source != DataSource::CacheSnapshot {
          self.load_local_or_default();
        }
        None
      }
      RemoteLoadOutcome::Document(document) => {
        // Whole-collection structural comparison; remote wins on any
        // difference.
        if document.groups == self.groups {
          self.source = DataSource::Remote;
          return None;
        }
        self.groups = document.groups;
        self.source = DataSource::Remote;
        self.persist_tiers();
        Some("☁ Synced with cloud".to_string())
      }
    }
  }

  // ==========================================================================
  // Mutation protocol
  // ==========================================================================

  pub fn add_group(&mut self, name: String) {
    self.groups.push(Group {
      name,
      keywords: Vec::new(),
    });
    self.after_mutation();
  }

  pub fn rename_group(&mut self, index: usize, name: String) -> bool {
    let Some(group) = self.groups.get_mut(index) else {
      return false;
    };
    group.name = name;
    self.after_mutation();
    true
  }

  /// Delete a group, returning its name for the notification.
  pub fn delete_group(&mut self, index: usize) -> Option<String> {
    if index >= self.groups.len() {
      return None;
    }
    let removed = self.groups.remove(index);
    self.after_mutation();
    Some(removed.name)
  }

  /// Move a group from one position to another as a single mutation.
  pub fn reorder_group(&mut self, from: usize, to: usize) -> bool {
    if !model::reorder(&mut self.groups, from, to) {
      return false;
    }
    self.after_mutation();
    true
  }

  pub fn add_keyword(&mut self, group_index: usize, keyword: String) -> bool {
    let Some(group) = self.groups.get_mut(group_index) else {
      return false;
    };
    group.keywords.push(keyword);
    self.after_mutation();
    true
  }

  pub fn edit_keyword(&mut self, group_index: usize, keyword_index: usize, keyword: String) -> bool {
    let Some(slot) = self
      .groups
      .get_mut(group_index)
      .and_then(|g| g.keywords.get_mut(keyword_index))
    else {
      return false;
    };
    *slot = keyword;
    self.after_mutation();
    true
  }

  pub fn delete_keyword(&mut self, group_index: usize, keyword_index: usize) -> bool {
    let Some(group) = self.groups.get_mut(group_index) else {
      return false;
    };
    if keyword_index >= group.keywords.len() {
      return false;
    }
    group.keywords.remove(keyword_index);
    self.after_mutation();
    true
  }

  /// Validate and merge an import payload, all-or-nothing.
  pub fn import_from_str(&mut self, json: &str) -> Result<ImportStats> {
    let imported = model::parse_collection(json)
      .map_err(|e| eyre!("Invalid import file: {}", e))?;
    let stats = model::merge_import(&mut self.groups, imported);
    self.after_mutation();
    Ok(stats)
  }

  /// Pretty-printed export of the working copy.
  pub fn export_pretty(&self) -> Result<String> {
    model::to_json_pretty(&self.groups)
  }

  /// Every mutation funnels through here: bump the sequence token, persist
  /// both local tiers unconditionally, then push to the cloud if signed in.
  fn after_mutation(&mut self) {
    self.mutation_seq += 1;
    self.persist_tiers();
    self.spawn_remote_save();
  }

  fn persist_tiers(&mut self) {
    let result = self
      .local
      .save(&self.groups)
      .and_then(|_| self.local.save_to_cache(&self.groups));

    if let Err(e) = result {
      warn!("local persistence failed: {}", e);
      if !self.storage_warned {
        self.storage_warned = true;
        self.notify(SyncEvent::StorageWarning(
          "⚠ Local storage is unavailable; changes are kept in memory only".to_string(),
        ));
      }
    }
  }

  fn spawn_remote_save(&self) {
    let (Some(remote), Some(account)) = (self.remote.clone(), self.account.clone()) else {
      return;
    };
    let Some(tx) = self.event_tx.clone() else {
      return;
    };
    let groups = self.groups.clone();

    tokio::spawn(async move {
      let event = match remote
        .save_user_data(&account.id, account.email.as_deref(), &groups)
        .await
      {
        Ok(()) => SyncEvent::RemoteSaved,
        Err(e) => {
          warn!("remote save failed: {}", e);
          SyncEvent::RemoteSaveFailed(e.to_string())
        }
      };
      let _ = tx.send(Event::Sync(event));
    });
  }

  fn notify(&self, event: SyncEvent) {
    if let Some(tx) = &self.event_tx {
      let _ = tx.send(Event::Sync(event));
    }
  }

  // ==========================================================================
  // Cache maintenance (the `:cache` command)
  // ==========================================================================

  pub fn cache_status(&self) -> Option<CacheStatus> {
    self.local.cache_status()
  }

  pub fn clear_cache(&self) {
    self.local.clear_cache();
  }

  /// Replace the working copy with the cache snapshot, if one is live.
  pub fn reload_from_cache(&mut self) -> bool {
    match self.local.load_from_cache() {
      Some(cached) => {
        self.groups = cached;
        self.source = DataSource::CacheSnapshot;
        true
      }
      None => false,
    }
  }
}
