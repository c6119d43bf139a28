use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::App;

/// The favorites view reads the store directly, so it always shows the
/// live set with any local edits applied.
pub fn draw_favorites(frame: &mut Frame, area: Rect, app: &App, selected: usize) {
  let favorites = app.favorites().all();

  let block = Block::default()
    .title(format!(" Favorites ({}) ", favorites.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  if favorites.is_empty() {
    let paragraph = Paragraph::new("No favorites yet — press 'f' on a character to add one")
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, inner);
    return;
  }

  let rows: Vec<Row> = favorites
    .iter()
    .map(|character| {
      Row::new(vec![
        Cell::from("★").style(Style::default().fg(Color::Magenta)),
        Cell::from(character.name.clone()),
        Cell::from(character.gender.as_str()),
        Cell::from(character.height.clone()),
        Cell::from(character.birth_year.clone()),
      ])
    })
    .collect();

  let table = Table::new(
    rows,
    [
      Constraint::Length(1),
      Constraint::Min(20),
      Constraint::Length(8),
      Constraint::Length(8),
      Constraint::Length(10),
    ],
  )
  .header(
    Row::new(vec!["", "Name", "Gender", "Height", "Born"])
      .style(Style::default().fg(Color::DarkGray)),
  )
  .row_highlight_style(Style::default().bg(Color::Magenta).fg(Color::White));

  let mut state = TableState::default();
  state.select(Some(selected));
  frame.render_stateful_widget(table, inner, &mut state);
}
