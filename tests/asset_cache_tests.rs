//! Tests of the offline asset cache strategies against an in-process
//! static server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use worg::assets::{AssetCache, ASSET_CACHE_VERSION};

#[derive(Clone)]
struct AssetServer {
  shell: Arc<Mutex<String>>,
  css: Arc<Mutex<String>>,
}

impl AssetServer {
  fn new(shell: &str, css: &str) -> Self {
    Self {
      shell: Arc::new(Mutex::new(shell.to_string())),
      css: Arc::new(Mutex::new(css.to_string())),
    }
  }
}

async fn serve_shell(State(server): State<AssetServer>) -> String {
  server.shell.lock().unwrap().clone()
}

async fn serve_css(State(server): State<AssetServer>) -> String {
  server.css.lock().unwrap().clone()
}

async fn spawn_asset_server(server: AssetServer) -> String {
  let router = Router::new()
    .route("/", get(serve_shell))
    .route("/app.css", get(serve_css))
    .with_state(server);
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  format!("http://{}", addr)
}

#[tokio::test]
async fn install_prefetches_and_activate_prunes_old_generations() {
  let server = AssetServer::new("shell-v1", "body {}");
  let origin = spawn_asset_server(server).await;

  let root = tempfile::tempdir().unwrap();
  // A leftover generation from a previous release.
  let stale = root.path().join("ws-cache-v0");
  std::fs::create_dir_all(&stale).unwrap();
  std::fs::write(stale.join("junk"), b"old").unwrap();

  let cache = AssetCache::new(&origin, root.path().to_path_buf()).unwrap();
  let cached = cache
    .install(&[
      "/".to_string(),
      "/app.css".to_string(),
      "/missing.js".to_string(),
    ])
    .await
    .unwrap();
  // Missing assets are skipped, not fatal.
  assert_eq!(cached, 2);

  cache.activate().unwrap();
  assert!(!stale.exists());
  assert!(root.path().join(ASSET_CACHE_VERSION).exists());
}

#[tokio::test]
async fn same_origin_static_assets_are_cache_first() {
  let server = AssetServer::new("shell", "v1");
  let css = server.css.clone();
  let origin = spawn_asset_server(server).await;

  let root = tempfile::tempdir().unwrap();
  let cache = AssetCache::new(&origin, root.path().to_path_buf()).unwrap();
  let url = format!("{}/app.css", origin);

  // First fetch populates the cache from the network.
  assert_eq!(cache.fetch(&url).await.unwrap(), b"v1");

  // The server moves on, but the cached copy is served.
  *css.lock().unwrap() = "v2".to_string();
  assert_eq!(cache.fetch(&url).await.unwrap(), b"v1");

  // The background refresh eventually lands the new copy.
  let mut refreshed = false;
  for _ in 0..20 {
    tokio::time::sleep(Duration::from_millis(100)).await;
    if cache.fetch(&url).await.unwrap() == b"v2" {
      refreshed = true;
      break;
    }
  }
  assert!(refreshed, "background refresh never landed");
}

#[tokio::test]
async fn navigation_is_network_first_with_cached_fallback() {
  let server = AssetServer::new("shell-old", "css");
  let shell = server.shell.clone();
  let origin = spawn_asset_server(server).await;

  let root = tempfile::tempdir().unwrap();
  let cache = AssetCache::new(&origin, root.path().to_path_buf()).unwrap();
  std::fs::create_dir_all(root.path().join(ASSET_CACHE_VERSION)).unwrap();

  assert_eq!(cache.fetch_app_shell().await.unwrap(), b"shell-old");

  // Network-first: a changed shell is picked up immediately, unlike static
  // assets.
  *shell.lock().unwrap() = "shell-new".to_string();
  assert_eq!(cache.fetch_app_shell().await.unwrap(), b"shell-new");

  // Origin unreachable: the last good shell comes from the cache.
  let offline = AssetCache::new("http://127.0.0.1:9", root.path().to_path_buf()).unwrap();
  assert_eq!(offline.fetch_app_shell().await.unwrap(), b"shell-new");
}

#[tokio::test]
async fn cross_origin_requests_are_not_intercepted() {
  let server = AssetServer::new("shell", "remote-css");
  let server_origin = spawn_asset_server(server).await;

  // The cache belongs to a different origin entirely.
  let root = tempfile::tempdir().unwrap();
  let cache = AssetCache::new("https://app.example.com", root.path().to_path_buf()).unwrap();

  let body = cache
    .fetch(&format!("{}/app.css", server_origin))
    .await
    .unwrap();
  assert_eq!(body, b"remote-css");

  // Nothing was written to any cache generation.
  let entries: Vec<_> = std::fs::read_dir(root.path())
    .map(|entries| entries.flatten().collect())
    .unwrap_or_default();
  assert!(entries.is_empty());
}
