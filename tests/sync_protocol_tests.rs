//! End-to-end tests of the load and mutation protocols against an
//! in-process document store server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tokio::sync::mpsc;

use worg::auth::Account;
use worg::event::Event;
use worg::model::{default_collection, Group};
use worg::remote::{RemoteClient, RemoteDocument};
use worg::store::{CacheEnvelope, KvStore, LocalStore, CACHE_KEY};
use worg::sync::{DataSource, RemoteLoadOutcome, SyncCoordinator, SyncEvent};

#[derive(Clone, Default)]
struct DocServer {
  docs: Arc<Mutex<HashMap<String, serde_json::Value>>>,
  gets: Arc<AtomicUsize>,
}

async fn get_doc(
  State(server): State<DocServer>,
  Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
  server.gets.fetch_add(1, Ordering::SeqCst);
  server
    .docs
    .lock()
    .unwrap()
    .get(&id)
    .cloned()
    .map(Json)
    .ok_or(StatusCode::NOT_FOUND)
}

async fn patch_doc(
  State(server): State<DocServer>,
  Path(id): Path<String>,
  Json(body): Json<serde_json::Value>,
) -> StatusCode {
  let mut docs = server.docs.lock().unwrap();
  let entry = docs.entry(id).or_insert_with(|| serde_json::json!({}));
  // Document-level merge: incoming fields replace, absent fields survive.
  if let (Some(existing), Some(incoming)) = (entry.as_object_mut(), body.as_object()) {
    for (key, value) in incoming {
      existing.insert(key.clone(), value.clone());
    }
  }
  StatusCode::OK
}

async fn spawn_doc_server(server: DocServer) -> String {
  let router = Router::new()
    .route("/users/{id}", get(get_doc).patch(patch_doc))
    .with_state(server);
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  format!("http://{}/", addr)
}

fn account() -> Account {
  Account {
    id: "u1".to_string(),
    email: Some("me@example.com".to_string()),
  }
}

fn groups(names: &[&str]) -> Vec<Group> {
  names
    .iter()
    .map(|name| Group {
      name: name.to_string(),
      keywords: vec![format!("{}.example.com", name.to_lowercase())],
    })
    .collect()
}

fn document_json(groups: &[Group]) -> serde_json::Value {
  serde_json::json!({
    "groups": groups,
    "lastUpdated": Utc::now().to_rfc3339(),
    "userId": "u1",
    "email": "me@example.com",
  })
}

async fn next_sync_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> SyncEvent {
  let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
    .await
    .expect("timed out waiting for sync event")
    .expect("event channel closed");
  match event {
    Event::Sync(sync_event) => sync_event,
    other => panic!("expected sync event, got {:?}", other),
  }
}

/// Wait for a load completion, skipping save completions that race it.
async fn next_remote_loaded(rx: &mut mpsc::UnboundedReceiver<Event>) -> (u64, RemoteLoadOutcome) {
  loop {
    if let SyncEvent::RemoteLoaded { seq, outcome } = next_sync_event(rx).await {
      return (seq, outcome);
    }
  }
}

#[tokio::test]
async fn authenticated_load_serves_cache_then_remote_wins() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("store.db");

  let cached = groups(&["Cached"]);
  let local = LocalStore::open_at(&db).unwrap();
  local.save(&cached).unwrap();
  local.save_to_cache(&cached).unwrap();

  let remote_groups = groups(&["From cloud", "Also cloud"]);
  let server = DocServer::default();
  server
    .docs
    .lock()
    .unwrap()
    .insert("u1".to_string(), document_json(&remote_groups));
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  let mut sync = SyncCoordinator::new(local, Some(client));
  let (tx, mut rx) = mpsc::unbounded_channel();
  sync.set_event_sender(tx);

  sync.handle_auth_changed(Some(account()));

  // Step 1: the cache snapshot is visible before any network round trip.
  assert_eq!(sync.source(), DataSource::CacheSnapshot);
  assert_eq!(sync.groups(), &cached);

  // Step 3: the remote document differs, so it wins.
  let SyncEvent::RemoteLoaded { seq, outcome } = next_sync_event(&mut rx).await else {
    panic!("expected RemoteLoaded");
  };
  let note = sync.handle_remote_loaded(seq, outcome);
  assert_eq!(note.as_deref(), Some("☁ Synced with cloud"));
  assert_eq!(sync.source(), DataSource::Remote);
  assert_eq!(sync.groups(), &remote_groups);

  // Both local tiers were re-persisted with the winning copy.
  let store = LocalStore::open_at(&db).unwrap();
  assert_eq!(store.load(), Some(remote_groups.clone()));
  assert_eq!(store.load_from_cache(), Some(remote_groups));
}

#[tokio::test]
async fn matching_remote_document_changes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let shared = groups(&["Same everywhere"]);

  let local = LocalStore::open_at(&dir.path().join("store.db")).unwrap();
  local.save(&shared).unwrap();
  local.save_to_cache(&shared).unwrap();

  let server = DocServer::default();
  server
    .docs
    .lock()
    .unwrap()
    .insert("u1".to_string(), document_json(&shared));
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  let mut sync = SyncCoordinator::new(local, Some(client));
  let (tx, mut rx) = mpsc::unbounded_channel();
  sync.set_event_sender(tx);
  sync.handle_auth_changed(Some(account()));

  let SyncEvent::RemoteLoaded { seq, outcome } = next_sync_event(&mut rx).await else {
    panic!("expected RemoteLoaded");
  };
  assert_eq!(sync.handle_remote_loaded(seq, outcome), None);
  assert_eq!(sync.groups(), &shared);
}

#[tokio::test]
async fn absent_document_defers_first_cloud_write_to_next_mutation() {
  let dir = tempfile::tempdir().unwrap();
  let stored = groups(&["Local only"]);
  let local = LocalStore::open_at(&dir.path().join("store.db")).unwrap();
  local.save(&stored).unwrap();

  let server = DocServer::default();
  let docs = server.docs.clone();
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  let mut sync = SyncCoordinator::new(local, Some(client));
  let (tx, mut rx) = mpsc::unbounded_channel();
  sync.set_event_sender(tx);
  sync.handle_auth_changed(Some(account()));

  // No cache: the durable copy stands in while the load is in flight.
  assert_eq!(sync.source(), DataSource::LocalStore);

  let SyncEvent::RemoteLoaded { seq, outcome } = next_sync_event(&mut rx).await else {
    panic!("expected RemoteLoaded");
  };
  assert!(matches!(outcome, RemoteLoadOutcome::Absent));
  assert_eq!(sync.handle_remote_loaded(seq, outcome), None);
  assert_eq!(sync.groups(), &stored);
  assert!(docs.lock().unwrap().is_empty());

  // The next mutation performs the account's first cloud write.
  sync.add_group("Brand new".to_string());
  match next_sync_event(&mut rx).await {
    SyncEvent::RemoteSaved => {}
    other => panic!("expected RemoteSaved, got {:?}", other),
  }

  let uploaded: RemoteDocument =
    serde_json::from_value(docs.lock().unwrap().get("u1").unwrap().clone()).unwrap();
  assert_eq!(uploaded.groups.len(), stored.len() + 1);
  assert_eq!(uploaded.user_id, "u1");
  assert_eq!(uploaded.email.as_deref(), Some("me@example.com"));
  assert!(!uploaded.last_updated.is_empty());
}

#[tokio::test]
async fn remote_failure_leaves_local_copy_authoritative() {
  let dir = tempfile::tempdir().unwrap();
  let local = LocalStore::open_at(&dir.path().join("store.db")).unwrap();

  // Nothing is listening here.
  let client = RemoteClient::new("http://127.0.0.1:9/", "token".to_string()).unwrap();
  let mut sync = SyncCoordinator::new(local, Some(client));
  let (tx, mut rx) = mpsc::unbounded_channel();
  sync.set_event_sender(tx);
  sync.handle_auth_changed(Some(account()));

  let SyncEvent::RemoteLoaded { seq, outcome } = next_sync_event(&mut rx).await else {
    panic!("expected RemoteLoaded");
  };
  assert!(matches!(outcome, RemoteLoadOutcome::Failed(_)));
  let note = sync.handle_remote_loaded(seq, outcome);
  assert!(note.is_some());
  assert_eq!(sync.groups(), &default_collection());

  // A mutation while offline still persists locally; the cloud push fails
  // visibly but nothing rolls back.
  sync.add_group("Offline edit".to_string());
  match next_sync_event(&mut rx).await {
    SyncEvent::RemoteSaveFailed(_) => {}
    other => panic!("expected RemoteSaveFailed, got {:?}", other),
  }
  assert!(sync.groups().iter().any(|g| g.name == "Offline edit"));
}

#[tokio::test]
async fn unauthenticated_load_never_consults_remote() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("store.db");

  // Seed a 3-day-old cache envelope directly.
  let cached = groups(&["Offline data"]);
  {
    let kv = KvStore::open_at(&db).unwrap();
    let envelope = CacheEnvelope {
      version: worg::store::CACHE_VERSION.to_string(),
      timestamp: Utc::now().timestamp_millis() - 3 * 24 * 60 * 60 * 1000,
      data: cached.clone(),
    };
    kv.set(CACHE_KEY, &envelope.to_json().unwrap()).unwrap();
  }

  let server = DocServer::default();
  let gets = server.gets.clone();
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  let local = LocalStore::open_at(&db).unwrap();
  let mut sync = SyncCoordinator::new(local, Some(client));
  let (tx, mut rx) = mpsc::unbounded_channel();
  sync.set_event_sender(tx);

  sync.handle_auth_changed(None);

  assert_eq!(sync.source(), DataSource::CacheSnapshot);
  assert_eq!(sync.groups(), &cached);

  // Give any stray background work a moment, then verify silence.
  tokio::time::sleep(Duration::from_millis(200)).await;
  assert_eq!(gets.load(Ordering::SeqCst), 0);
  assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn load_completing_after_a_mutation_is_discarded() {
  let dir = tempfile::tempdir().unwrap();
  let local = LocalStore::open_at(&dir.path().join("store.db")).unwrap();

  let remote_groups = groups(&["Older cloud state"]);
  let server = DocServer::default();
  server
    .docs
    .lock()
    .unwrap()
    .insert("u1".to_string(), document_json(&remote_groups));
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  let mut sync = SyncCoordinator::new(local, Some(client));
  let (tx, mut rx) = mpsc::unbounded_channel();
  sync.set_event_sender(tx);
  sync.handle_auth_changed(Some(account()));

  // The user edits before the load lands.
  sync.add_group("Raced the load".to_string());
  let edited = sync.groups().clone();

  let (seq, outcome) = next_remote_loaded(&mut rx).await;
  assert_eq!(sync.handle_remote_loaded(seq, outcome), None);
  assert_eq!(sync.groups(), &edited);
}

#[tokio::test]
async fn upsert_merges_at_document_level() {
  let server = DocServer::default();
  let docs = server.docs.clone();
  docs.lock().unwrap().insert(
    "u1".to_string(),
    serde_json::json!({
      "groups": groups(&["Old"]),
      "lastUpdated": "2026-01-01T00:00:00Z",
      "userId": "u1",
      "email": "me@example.com",
      "settings": {"theme": "dark"},
    }),
  );
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  let replacement = groups(&["New A", "New B"]);
  client
    .save_user_data("u1", Some("me@example.com"), &replacement)
    .await
    .unwrap();

  let stored = docs.lock().unwrap().get("u1").unwrap().clone();
  // `groups` fully replaced, untouched fields preserved.
  let stored_groups: Vec<Group> = serde_json::from_value(stored["groups"].clone()).unwrap();
  assert_eq!(stored_groups, replacement);
  assert_eq!(stored["settings"]["theme"], "dark");
  assert_ne!(stored["lastUpdated"], "2026-01-01T00:00:00Z");
}

#[tokio::test]
async fn missing_document_is_distinct_from_transport_error() {
  let server = DocServer::default();
  let base = spawn_doc_server(server).await;

  let client = RemoteClient::new(&base, "token".to_string()).unwrap();
  assert!(client.load_user_data("nobody").await.unwrap().is_none());

  let dead = RemoteClient::new("http://127.0.0.1:9/", "token".to_string()).unwrap();
  assert!(dead.load_user_data("nobody").await.is_err());
}
