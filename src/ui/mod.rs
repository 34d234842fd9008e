mod views;

use crate::app::{App, Mode, Theme, ViewState};
use crate::model::palette;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  // Colors are assigned over the full collection in order, so a group keeps
  // its color no matter which view shows it.
  let colors = palette::assign_group_colors(app.sync().groups().iter().map(|g| g.name.as_str()));

  // Draw current view
  if let Some(view) = app.current_view() {
    match view {
      ViewState::GroupList { selected } => {
        views::groups::draw_group_list(frame, chunks[0], app, &colors, *selected);
      }
      ViewState::Keywords {
        group_index,
        selected,
      } => {
        if let Some(group) = app.sync().group(*group_index) {
          let color = colors.get(*group_index).copied().unwrap_or(0);
          views::keywords::draw_keyword_list(frame, chunks[0], group, color, *selected, app.theme());
        }
      }
    }
  }

  // Draw status bar
  draw_status_bar(frame, chunks[1], app);
}

/// The color a group renders with under the active theme.
pub fn group_color(palette_index: usize, theme: Theme) -> Color {
  let rgb = palette::GROUP_COLORS[palette_index % palette::GROUP_COLORS.len()];
  let (r, g, b) = match theme {
    Theme::Light => rgb,
    Theme::Dark => palette::darken(rgb, 0.4),
  };
  Color::Rgb(r, g, b)
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  // A live toast takes the whole line
  if let Some(toast) = app.toast_text() {
    let paragraph = Paragraph::new(toast.to_string()).style(Style::default().fg(Color::Yellow));
    frame.render_widget(paragraph, area);
    return;
  }

  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint =
        " :command  /search  j/k:nav  Enter:open  a:add  r:rename  d:delete  J/K:move  q:back";
      (hint.to_string(), Style::default().fg(Color::DarkGray))
    }
    Mode::Command => {
      let suggestion = app
        .autocomplete_suggestions()
        .get(app.selected_suggestion())
        .map(|c| format!("  ▸ {} ({})", c.name, c.description))
        .unwrap_or_default();
      (
        format!(":{}{}", app.command_input(), suggestion),
        Style::default().fg(Color::Yellow),
      )
    }
    Mode::Search => (
      format!("/{}", app.search_input()),
      Style::default().fg(Color::Cyan),
    ),
    Mode::Input(request) => (
      format!("{}: {}", request.purpose.prompt(), request.buffer),
      Style::default().fg(Color::Green),
    ),
    Mode::Confirm(request) => (
      format!("{} (y/n)", request.message),
      Style::default().fg(Color::Red),
    ),
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}
