use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use worg::app::App;
use worg::config::Config;

#[derive(Parser, Debug)]
#[command(name = "worg")]
#[command(about = "A terminal UI for organizing website keywords")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/worg/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Skip cloud sync and asset prefetch for this session
  #[arg(long)]
  offline: bool,
}

/// Log to a file; the terminal belongs to the TUI.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("worg");
  std::fs::create_dir_all(&log_dir).map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let appender = tracing_appender::rolling::never(log_dir, "worg.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_env("WORG_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = init_logging()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Initialize and run the app
  let mut app = App::new(config, args.offline)?;
  app.run().await?;

  Ok(())
}
