use crate::assets::{AssetCache, AssetEvent};
use crate::auth::Account;
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::model::{keyword, matches_search};
use crate::opener;
use crate::remote::RemoteClient;
use crate::store::LocalStore;
use crate::sync::{SyncCoordinator, SyncEvent};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::warn;

/// Typing into the search box only re-filters after this quiet period.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(120);
const TOAST_DURATION: Duration = Duration::from_secs(3);
const DEFAULT_EXPORT_FILE: &str = "WebsiteOrganiser_groups.json";

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
  Search,
  Input(InputRequest),
  Confirm(ConfirmRequest),
}

/// A pending free-text entry (group names, keywords, file paths)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
  pub purpose: InputPurpose,
  pub buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
  AddGroup,
  RenameGroup(usize),
  AddKeyword(usize),
  EditKeyword { group: usize, keyword: usize },
  ImportPath,
}

impl InputPurpose {
  pub fn prompt(&self) -> &'static str {
    match self {
      InputPurpose::AddGroup => "New group name",
      InputPurpose::RenameGroup(_) => "Rename group",
      InputPurpose::AddKeyword(_) => "New keyword",
      InputPurpose::EditKeyword { .. } => "Edit keyword",
      InputPurpose::ImportPath => "Import file path",
    }
  }
}

/// A yes/no gate in front of a destructive action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
  pub action: ConfirmAction,
  pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
  DeleteGroup(usize),
  ClearCache,
  Logout,
}

/// Color theme, persisted across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Light,
  Dark,
}

impl Theme {
  pub fn as_str(&self) -> &'static str {
    match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
    }
  }

  fn toggled(self) -> Self {
    match self {
      Theme::Light => Theme::Dark,
      Theme::Dark => Theme::Light,
    }
  }
}

/// View state - each variant indexes into the coordinator's working copy
#[derive(Debug)]
pub enum ViewState {
  /// Root view: all groups, filtered by the applied search
  GroupList { selected: usize },
  /// Keywords of one group (pushed via Enter)
  Keywords { group_index: usize, selected: usize },
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<ViewState>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Live search buffer (after pressing /)
  search_input: String,

  /// The filter actually applied to the group list
  search_applied: String,

  /// Set on every search edit; applied once the debounce delay passes
  search_pending_at: Option<Instant>,

  theme: Theme,

  /// Transient notification and when it was set
  toast: Option<(String, Instant)>,

  /// Application configuration
  config: Config,

  /// Sync coordinator owning the working copy
  sync: SyncCoordinator,

  /// Offline cache for the app's own static assets
  assets: Option<AssetCache>,

  /// Whether a remote client was configured (drives login/logout)
  has_remote: bool,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, offline: bool) -> Result<Self> {
    let local = LocalStore::open();
    let theme = match local.load_theme().as_deref() {
      Some("dark") => Theme::Dark,
      _ => Theme::Light,
    };

    let remote = if offline {
      None
    } else if let Some(sync_config) = &config.sync {
      match Config::get_sync_token() {
        Ok(token) => Some(RemoteClient::new(&sync_config.url, token)?),
        Err(e) => {
          warn!("cloud sync disabled: {}", e);
          None
        }
      }
    } else {
      None
    };
    let has_remote = remote.is_some();

    let assets = if offline {
      None
    } else {
      config.assets.as_ref().and_then(|assets_config| {
        AssetCache::default_root()
          .and_then(|root| AssetCache::new(&assets_config.origin, root))
          .map_err(|e| warn!("asset cache disabled: {}", e))
          .ok()
      })
    };

    Ok(Self {
      view_stack: vec![ViewState::GroupList { selected: 0 }],
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      search_input: String::new(),
      search_applied: String::new(),
      search_pending_at: None,
      theme,
      toast: None,
      config,
      sync: SyncCoordinator::new(local, remote),
      assets,
      has_remote,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.sync.set_event_sender(events.sender());

    if !self.sync.store().is_available() {
      self.set_toast("⚠ Local storage is unavailable. Changes are kept in memory only.");
    }

    // Auth entry: drives the load protocol for whichever state we start in
    self.sync.handle_auth_changed(self.configured_account());
    self.toast_load_source();
    self.install_assets(events.sender());

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn configured_account(&self) -> Option<Account> {
    if !self.has_remote {
      return None;
    }
    self.config.sync.as_ref().map(Account::from_config)
  }

  fn toast_load_source(&mut self) {
    use crate::sync::DataSource;
    match self.sync.source() {
      DataSource::CacheSnapshot => self.set_toast("📱 Offline-ready (loaded from cache)"),
      DataSource::Defaults => self.set_toast("👋 Showing default groups"),
      _ => {}
    }
  }

  /// Prefetch the configured asset list and prune stale cache generations.
  fn install_assets(&self, tx: tokio::sync::mpsc::UnboundedSender<Event>) {
    let Some(cache) = self.assets.clone() else {
      return;
    };
    let Some(assets_config) = self.config.assets.clone() else {
      return;
    };

    tokio::spawn(async move {
      let event = match cache.install(&assets_config.prefetch).await {
        Ok(cached) => {
          if let Err(e) = cache.activate() {
            warn!("asset cache activation failed: {}", e);
          }
          AssetEvent::Ready { cached }
        }
        Err(e) => AssetEvent::Failed(e.to_string()),
      };
      let _ = tx.send(Event::Assets(event));
    });
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Sync(sync_event) => self.handle_sync_event(sync_event),
      Event::Assets(asset_event) => match asset_event {
        AssetEvent::Ready { cached } => {
          self.set_toast(format!("📦 {} assets cached for offline use", cached));
        }
        AssetEvent::Failed(e) => {
          warn!("asset install failed: {}", e);
        }
      },
    }
    Ok(())
  }

  fn tick(&mut self) {
    if let Some((_, at)) = &self.toast {
      if at.elapsed() >= TOAST_DURATION {
        self.toast = None;
      }
    }

    if let Some(at) = self.search_pending_at {
      if at.elapsed() >= SEARCH_DEBOUNCE {
        self.search_pending_at = None;
        self.search_applied = self.search_input.clone();
        self.clamp_selection();
      }
    }
  }

  fn handle_sync_event(&mut self, event: SyncEvent) {
    match event {
      SyncEvent::RemoteLoaded { seq, outcome } => {
        if let Some(message) = self.sync.handle_remote_loaded(seq, outcome) {
          self.set_toast(message);
        }
        self.clamp_selection();
      }
      SyncEvent::RemoteSaved => self.set_toast("💾 Data saved to cloud!"),
      SyncEvent::RemoteSaveFailed(_) => self.set_toast("⚠ Failed to save to cloud"),
      SyncEvent::StorageWarning(message) => self.set_toast(message),
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
      Mode::Search => self.handle_search_mode_key(key),
      Mode::Input(_) => self.handle_input_mode_key(key),
      Mode::Confirm(_) => self.handle_confirm_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      // Quit
      KeyCode::Char('q') => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Enter => self.enter_selected(),
      KeyCode::Esc => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        }
      }

      // Reorder (group list only)
      KeyCode::Char('K') => self.reorder_selected(-1),
      KeyCode::Char('J') => self.reorder_selected(1),

      // CRUD
      KeyCode::Char('a') => self.start_add(),
      KeyCode::Char('r') | KeyCode::Char('e') => self.start_edit(),
      KeyCode::Char('d') => self.delete_selected(),

      // Mode switches
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
      }
      KeyCode::Char('/') => {
        self.mode = Mode::Search;
        self.search_input.clear();
      }

      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn handle_search_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.search_input.clear();
        self.search_applied.clear();
        self.search_pending_at = None;
        self.clamp_selection();
      }
      KeyCode::Enter => {
        // Apply immediately and return to normal mode
        self.search_applied = self.search_input.clone();
        self.search_pending_at = None;
        self.mode = Mode::Normal;
        self.clamp_selection();
      }
      KeyCode::Backspace => {
        self.search_input.pop();
        self.search_pending_at = Some(Instant::now());
      }
      KeyCode::Char(c) => {
        self.search_input.push(c);
        self.search_pending_at = Some(Instant::now());
      }
      _ => {}
    }
  }

  fn handle_input_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    let Mode::Input(request) = &mut self.mode else {
      return;
    };
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
      }
      KeyCode::Enter => {
        let request = request.clone();
        self.mode = Mode::Normal;
        self.commit_input(request);
      }
      KeyCode::Backspace => {
        request.buffer.pop();
      }
      KeyCode::Char(c) => {
        request.buffer.push(c);
      }
      _ => {}
    }
  }

  fn handle_confirm_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    let Mode::Confirm(request) = &self.mode else {
      return;
    };
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
        let action = request.action;
        self.mode = Mode::Normal;
        self.perform_confirmed(action);
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.mode = Mode::Normal;
      }
      _ => {}
    }
  }

  fn commit_input(&mut self, request: InputRequest) {
    let text = request.buffer.trim().to_string();
    match request.purpose {
      InputPurpose::AddGroup => {
        if text.is_empty() {
          self.set_toast("Group name cannot be empty.");
          return;
        }
        self.sync.add_group(text);
        self.set_toast("Group created!");
      }
      InputPurpose::RenameGroup(index) => {
        if text.is_empty() {
          self.set_toast("Group name cannot be empty.");
          return;
        }
        if self.sync.rename_group(index, text) {
          self.set_toast("Group renamed!");
        }
      }
      InputPurpose::AddKeyword(group_index) => {
        if text.is_empty() {
          return;
        }
        if self.sync.add_keyword(group_index, text) {
          self.set_toast("Keyword added!");
        }
      }
      InputPurpose::EditKeyword { group, keyword } => {
        if text.is_empty() {
          return;
        }
        if self.sync.edit_keyword(group, keyword, text) {
          self.set_toast("Keyword updated!");
        }
      }
      InputPurpose::ImportPath => {
        if text.is_empty() {
          self.set_toast("No file selected.");
          return;
        }
        self.do_import(&text);
      }
    }
  }

  fn perform_confirmed(&mut self, action: ConfirmAction) {
    match action {
      ConfirmAction::DeleteGroup(index) => {
        if self.sync.delete_group(index).is_some() {
          self.set_toast("Group deleted!");
        }
        self.clamp_selection();
      }
      ConfirmAction::ClearCache => {
        self.sync.clear_cache();
        self.set_toast("🗑 Cache cleared!");
      }
      ConfirmAction::Logout => {
        self.sync.handle_auth_changed(None);
        self.set_toast("Signed out; using local data");
        self.clamp_selection();
      }
    }
  }

  fn execute_command(&mut self) {
    // The selected suggestion wins over raw input for the command word;
    // arguments always come from what was typed.
    let raw = self.command_input.trim().to_string();
    let mut words = raw.split_whitespace();
    let typed_cmd = words.next().unwrap_or("").to_lowercase();
    let args: Vec<&str> = words.collect();

    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      typed_cmd
    };

    self.mode = Mode::Normal;
    self.command_input.clear();

    match cmd.as_str() {
      "groups" => {
        self.view_stack.truncate(1);
        self.view_stack[0] = ViewState::GroupList { selected: 0 };
        self.search_input.clear();
        self.search_applied.clear();
      }
      "sync" => {
        if self.sync.sync_now() {
          self.set_toast("🔄 Syncing with cloud...");
        } else {
          self.set_toast("⚠ Please login first");
        }
      }
      "cache" => self.run_cache_command(args.first().copied().unwrap_or("")),
      "export" => {
        let path = args.first().copied().unwrap_or(DEFAULT_EXPORT_FILE).to_string();
        self.do_export(&path);
      }
      "import" => match args.first() {
        Some(path) => {
          let path = path.to_string();
          self.do_import(&path);
        }
        None => {
          self.mode = Mode::Input(InputRequest {
            purpose: InputPurpose::ImportPath,
            buffer: String::new(),
          });
        }
      },
      "theme" => {
        self.theme = self.theme.toggled();
        self.sync.store().save_theme(self.theme.as_str());
      }
      "login" => self.login(),
      "logout" => {
        if self.sync.is_authenticated() {
          self.mode = Mode::Confirm(ConfirmRequest {
            action: ConfirmAction::Logout,
            message: "Sign out of cloud sync?".to_string(),
          });
        } else {
          self.set_toast("Not signed in");
        }
      }
      "quit" => {
        self.should_quit = true;
      }
      _ => {
        // Unknown command
      }
    }
  }

  fn run_cache_command(&mut self, arg: &str) {
    match arg {
      "" | "status" => match self.sync.cache_status() {
        Some(status) => self.set_toast(format!(
          "📊 Cache {} · {} days old · {} groups · {} keywords",
          status.version, status.age_days, status.groups, status.keywords
        )),
        None => self.set_toast("❌ No cache found"),
      },
      "clear" => {
        self.mode = Mode::Confirm(ConfirmRequest {
          action: ConfirmAction::ClearCache,
          message: "Clear the offline cache?".to_string(),
        });
      }
      "load" => {
        if self.sync.reload_from_cache() {
          self.set_toast("📱 Loaded from cache!");
          self.clamp_selection();
        } else {
          self.set_toast("❌ No cache found");
        }
      }
      other => {
        self.set_toast(format!("Unknown cache action '{}'", other));
      }
    }
  }

  fn login(&mut self) {
    match self.configured_account() {
      Some(account) => {
        self.sync.handle_auth_changed(Some(account));
        self.toast_load_source();
        self.clamp_selection();
      }
      None => {
        self.set_toast("⚠ Add a sync section to worg.yaml and set WORG_SYNC_TOKEN");
      }
    }
  }

  fn do_export(&mut self, path: &str) {
    let result = self
      .sync
      .export_pretty()
      .and_then(|json| std::fs::write(path, json).map_err(|e| color_eyre::eyre::eyre!("{}", e)));
    match result {
      Ok(()) => self.set_toast(format!("Groups exported to {}!", path)),
      Err(e) => {
        warn!("export failed: {}", e);
        self.set_toast("Export failed.");
      }
    }
  }

  fn do_import(&mut self, path: &str) {
    let contents = match std::fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(e) => {
        warn!("import read failed: {}", e);
        self.set_toast("Import failed: File error.");
        return;
      }
    };
    match self.sync.import_from_str(&contents) {
      Ok(stats) => {
        self.set_toast(format!(
          "Groups imported! {} keywords merged, {} groups added",
          stats.keywords_merged, stats.groups_added
        ));
      }
      Err(e) => {
        warn!("import rejected: {}", e);
        self.set_toast("Import failed: Invalid format.");
      }
    }
  }

  fn start_add(&mut self) {
    match self.view_stack.last() {
      Some(ViewState::GroupList { .. }) => {
        self.mode = Mode::Input(InputRequest {
          purpose: InputPurpose::AddGroup,
          buffer: String::new(),
        });
      }
      Some(ViewState::Keywords { group_index, .. }) => {
        self.mode = Mode::Input(InputRequest {
          purpose: InputPurpose::AddKeyword(*group_index),
          buffer: String::new(),
        });
      }
      None => {}
    }
  }

  fn start_edit(&mut self) {
    match self.view_stack.last() {
      Some(ViewState::GroupList { selected }) => {
        let Some(&group_index) = self.filtered_groups().get(*selected) else {
          return;
        };
        let current = self
          .sync
          .group(group_index)
          .map(|g| g.name.clone())
          .unwrap_or_default();
        self.mode = Mode::Input(InputRequest {
          purpose: InputPurpose::RenameGroup(group_index),
          buffer: current,
        });
      }
      Some(ViewState::Keywords {
        group_index,
        selected,
      }) => {
        let Some(current) = self
          .sync
          .group(*group_index)
          .and_then(|g| g.keywords.get(*selected).cloned())
        else {
          return;
        };
        self.mode = Mode::Input(InputRequest {
          purpose: InputPurpose::EditKeyword {
            group: *group_index,
            keyword: *selected,
          },
          buffer: current,
        });
      }
      None => {}
    }
  }

  fn delete_selected(&mut self) {
    match self.view_stack.last() {
      Some(ViewState::GroupList { selected }) => {
        let Some(&group_index) = self.filtered_groups().get(*selected) else {
          return;
        };
        let Some(group) = self.sync.group(group_index) else {
          return;
        };
        self.mode = Mode::Confirm(ConfirmRequest {
          action: ConfirmAction::DeleteGroup(group_index),
          message: format!("Delete the group \"{}\"?", group.name),
        });
      }
      Some(ViewState::Keywords {
        group_index,
        selected,
      }) => {
        if self.sync.delete_keyword(*group_index, *selected) {
          self.set_toast("Keyword deleted!");
          self.clamp_selection();
        }
      }
      None => {}
    }
  }

  /// Move the selected group up or down; one keypress, one atomic mutation.
  fn reorder_selected(&mut self, delta: i32) {
    let Some(ViewState::GroupList { selected }) = self.view_stack.last() else {
      return;
    };
    if !self.search_applied.is_empty() {
      self.set_toast("Clear the search to reorder groups");
      return;
    }

    let from = *selected;
    let len = self.sync.groups().len();
    let to = from as i32 + delta;
    if to < 0 || to >= len as i32 {
      return;
    }
    let to = to as usize;

    if self.sync.reorder_group(from, to) {
      if let Some(ViewState::GroupList { selected }) = self.view_stack.last_mut() {
        *selected = to;
      }
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let filtered_len = self.filtered_groups().len();
    if let Some(view) = self.view_stack.last_mut() {
      match view {
        ViewState::GroupList { selected } => {
          if filtered_len > 0 {
            *selected = (*selected as i32 + delta).rem_euclid(filtered_len as i32) as usize;
          }
        }
        ViewState::Keywords {
          group_index,
          selected,
        } => {
          let len = self
            .sync
            .group(*group_index)
            .map(|g| g.keywords.len())
            .unwrap_or(0);
          if len > 0 {
            *selected = (*selected as i32 + delta).rem_euclid(len as i32) as usize;
          }
        }
      }
    }
  }

  fn enter_selected(&mut self) {
    match self.view_stack.last() {
      Some(ViewState::GroupList { selected }) => {
        if let Some(&group_index) = self.filtered_groups().get(*selected) {
          self.view_stack.push(ViewState::Keywords {
            group_index,
            selected: 0,
          });
        }
      }
      Some(ViewState::Keywords {
        group_index,
        selected,
      }) => {
        let Some(target) = self
          .sync
          .group(*group_index)
          .and_then(|g| g.keywords.get(*selected))
          .map(|k| keyword::open_target(k))
        else {
          return;
        };
        if let Err(e) = opener::open_url(&target) {
          warn!("{}", e);
          self.set_toast("⚠ Could not open browser");
        }
      }
      None => {}
    }
  }

  /// Keep selections and pushed views valid after the collection changed
  /// underneath them (remote sync, deletion, re-filter).
  fn clamp_selection(&mut self) {
    let group_count = self.sync.groups().len();
    let filtered_len = self.filtered_groups().len();

    // Drop keyword views whose group vanished
    self.view_stack.retain(|view| match view {
      ViewState::GroupList { .. } => true,
      ViewState::Keywords { group_index, .. } => *group_index < group_count,
    });
    if self.view_stack.is_empty() {
      self.view_stack.push(ViewState::GroupList { selected: 0 });
    }

    for view in &mut self.view_stack {
      match view {
        ViewState::GroupList { selected } => {
          *selected = (*selected).min(filtered_len.saturating_sub(1));
        }
        ViewState::Keywords {
          group_index,
          selected,
        } => {
          let len = self
            .sync
            .group(*group_index)
            .map(|g| g.keywords.len())
            .unwrap_or(0);
          *selected = (*selected).min(len.saturating_sub(1));
        }
      }
    }
  }

  fn set_toast(&mut self, message: impl Into<String>) {
    self.toast = Some((message.into(), Instant::now()));
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&ViewState> {
    self.view_stack.last()
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn search_input(&self) -> &str {
    &self.search_input
  }

  pub fn search_applied(&self) -> &str {
    &self.search_applied
  }

  pub fn theme(&self) -> Theme {
    self.theme
  }

  pub fn toast_text(&self) -> Option<&str> {
    self.toast.as_ref().map(|(text, _)| text.as_str())
  }

  pub fn title(&self) -> &str {
    self.config.title.as_deref().unwrap_or("worg")
  }

  pub fn sync(&self) -> &SyncCoordinator {
    &self.sync
  }

  /// Indices of groups matching the applied search, in collection order.
  pub fn filtered_groups(&self) -> Vec<usize> {
    self
      .sync
      .groups()
      .iter()
      .enumerate()
      .filter(|(_, group)| matches_search(group, &self.search_applied))
      .map(|(index, _)| index)
      .collect()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
