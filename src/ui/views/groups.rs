use crate::app::App;
use crate::model::{keyword, palette};
use crate::ui::group_color;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// How many keywords a group card previews inline
const PREVIEW_KEYWORDS: usize = 6;

pub fn draw_group_list(frame: &mut Frame, area: Rect, app: &App, colors: &[usize], selected: usize) {
  let filtered = app.filtered_groups();
  let sync = app.sync();

  let auth = if sync.is_authenticated() { "☁" } else { "local" };
  let title = format!(
    " {} · Groups ({}) · {} · {} ",
    app.title(),
    filtered.len(),
    sync.source().label(),
    auth
  );

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if filtered.is_empty() {
    let content = if app.search_applied().is_empty() {
      "No groups yet. Press a to create one."
    } else {
      "No groups found matching your search."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|&group_index| {
      let group = &sync.groups()[group_index];
      let color = group_color(colors.get(group_index).copied().unwrap_or(0), app.theme());

      let preview: Vec<String> = group
        .keywords
        .iter()
        .take(PREVIEW_KEYWORDS)
        .map(|k| format!("{} {}", palette::keyword_emoji(k), keyword::display_label(k)))
        .collect();
      let more = group.keywords.len().saturating_sub(PREVIEW_KEYWORDS);
      let suffix = if more > 0 {
        format!("  ...and {} more", more)
      } else {
        String::new()
      };

      let line = Line::from(vec![
        Span::styled(
          format!("{:<20}", truncate(&group.name, 20)),
          Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
          format!(" {:>3} ", group.keywords.len()),
          Style::default().fg(Color::DarkGray),
        ),
        Span::raw(truncate(&preview.join(", "), 70)),
        Span::styled(suffix, Style::default().fg(Color::DarkGray)),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));

  frame.render_stateful_widget(list, area, &mut state);
}

fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}
