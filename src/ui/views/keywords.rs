use crate::app::Theme;
use crate::model::keyword::{self, KeywordTarget};
use crate::model::{palette, Group};
use crate::ui::group_color;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_keyword_list(
  frame: &mut Frame,
  area: Rect,
  group: &Group,
  palette_index: usize,
  selected: usize,
  theme: Theme,
) {
  let color = group_color(palette_index, theme);
  let title = format!(" {} ({} keywords) ", group.name, group.keywords.len());

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(color));

  if group.keywords.is_empty() {
    let paragraph = Paragraph::new("No keywords yet. Press a to add one.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = group
    .keywords
    .iter()
    .enumerate()
    .map(|(index, kw)| {
      // URLs open directly; anything else goes through a web search
      let (label, detail) = match keyword::classify(kw) {
        KeywordTarget::Url(_) => (
          keyword::display_label(kw),
          keyword::hostname(kw).unwrap_or_default(),
        ),
        KeywordTarget::Search(_) => (kw.clone(), "search".to_string()),
      };

      let line = Line::from(vec![
        Span::styled(
          format!("{:>3}. ", index + 1),
          Style::default().fg(Color::DarkGray),
        ),
        Span::raw(format!("{} ", palette::keyword_emoji(kw))),
        Span::styled(format!("{:<30}", label), Style::default().fg(color)),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
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
