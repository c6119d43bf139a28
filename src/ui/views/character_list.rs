use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::App;
use crate::swapi::types::CharacterPage;

pub struct ListProps<'a> {
  pub page: u32,
  pub search: &'a str,
  pub data: Option<&'a CharacterPage>,
  pub selected: usize,
  pub loading: bool,
  pub error: Option<&'a str>,
}

pub fn draw_character_list(frame: &mut Frame, area: Rect, app: &App, props: ListProps<'_>) {
  let block = Block::default()
    .title(" Characters ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(1), Constraint::Length(1)])
    .split(inner);

  if props.loading {
    let paragraph =
      Paragraph::new("Loading characters...").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, chunks[0]);
  } else if let Some(error) = props.error {
    let lines = vec![
      Line::styled("Error loading characters", Style::default().fg(Color::Red)),
      Line::styled(error.to_string(), Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines), chunks[0]);
  } else if let Some(data) = props.data {
    if data.results.is_empty() {
      // Distinct empty state: an empty search result is neither an error
      // nor still loading
      let paragraph =
        Paragraph::new("No characters found").style(Style::default().fg(Color::DarkGray).italic());
      frame.render_widget(paragraph, chunks[0]);
    } else {
      draw_table(frame, chunks[0], app, data, props.selected);
    }
  }

  draw_page_footer(frame, chunks[1], app, &props);
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App, data: &CharacterPage, selected: usize) {
  let rows: Vec<Row> = data
    .results
    .iter()
    .map(|character| {
      let star = if app.favorites().is_favorite(&character.url) {
        Cell::from("★").style(Style::default().fg(Color::Magenta))
      } else {
        Cell::from(" ")
      };
      Row::new(vec![
        star,
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
  .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

  let mut state = TableState::default();
  state.select(Some(selected));
  frame.render_stateful_widget(table, area, &mut state);
}

fn draw_page_footer(frame: &mut Frame, area: Rect, app: &App, props: &ListProps<'_>) {
  let footer = match props.data {
    Some(data) => {
      let total = data.total_pages(app.page_size()).max(1);
      format!(" Page {}/{} — {} characters", props.page, total, data.count)
    }
    None => format!(" Page {}", props.page),
  };
  frame.render_widget(
    Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
    area,
  );
}
