//! URL-opening primitive: hand the target to the system browser.

use color_eyre::{eyre::eyre, Result};
use std::process::{Command, Stdio};
use tracing::info;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &str = "xdg-open";

/// Open a URL in the default browser, detached from the TUI.
pub fn open_url(url: &str) -> Result<()> {
  info!("opening {}", url);
  Command::new(OPENER)
    .arg(url)
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .map_err(|e| eyre!("Failed to open {}: {}", url, e))?;
  Ok(())
}
