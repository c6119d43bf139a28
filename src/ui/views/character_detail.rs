use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::query::QueryState;
use crate::swapi::types::{Character, Film, Planet, Starship};

/// Draw the detail view. The three related sections resolve completely
/// independently of one another: each renders its own loading, error or
/// value state regardless of what its siblings are doing.
pub fn draw_character_detail(
  frame: &mut Frame,
  area: Rect,
  character: &QueryState<Character>,
  homeworld: &QueryState<Planet>,
  films: &QueryState<Vec<Film>>,
  starships: &QueryState<Vec<Starship>>,
) {
  let title = match character.data() {
    Some(c) => format!(" {} ", c.name),
    None => " Character ".to_string(),
  };
  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let c = match character {
    QueryState::Idle | QueryState::Loading => {
      let paragraph =
        Paragraph::new("Loading character details...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    }
    QueryState::Error(_) => {
      let paragraph = Paragraph::new("Error loading character details\n\nPress 'r' to retry.")
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, inner);
      return;
    }
    QueryState::Success(c) => c,
  };

  let lines = vec![
    field_line("Gender", c.gender.as_str().to_string()),
    field_line("Height", or_unknown(&c.height)),
    field_line("Mass", or_unknown(&c.mass)),
    field_line("Hair Color", or_unknown(&c.hair_color)),
    field_line("Skin Color", or_unknown(&c.skin_color)),
    field_line("Eye Color", or_unknown(&c.eye_color)),
    field_line("Birth Year", or_unknown(&c.birth_year)),
    Line::default(),
    related_line("Home Planet", homeworld, "planet", |p| or_unknown(&p.name)),
    related_line("Films", films, "films", |films| {
      join_or_unknown(films.iter().map(|f| f.title.as_str()))
    }),
    related_line("Starships", starships, "starships", |ships| {
      join_or_unknown(ships.iter().map(|s| s.name.as_str()))
    }),
  ];

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn field_line(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
    Span::raw(value),
  ])
}

/// One related section's line, rendered purely from its own tri-state.
fn related_line<'a, T>(
  label: &str,
  state: &'a QueryState<T>,
  what: &str,
  render: impl Fn(&'a T) -> String,
) -> Line<'static> {
  let value = match state {
    QueryState::Idle | QueryState::Loading => {
      Span::styled("Loading...", Style::default().fg(Color::DarkGray))
    }
    QueryState::Error(_) => Span::styled(
      format!("Error loading {}", what),
      Style::default().fg(Color::Red),
    ),
    QueryState::Success(data) => Span::raw(render(data)),
  };

  Line::from(vec![
    Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
    value,
  ])
}

fn or_unknown(value: &str) -> String {
  if value.is_empty() {
    "Unknown".to_string()
  } else {
    value.to_string()
  }
}

fn join_or_unknown<'a>(items: impl Iterator<Item = &'a str>) -> String {
  let joined = items.collect::<Vec<_>>().join(", ");
  if joined.is_empty() {
    "Unknown".to_string()
  } else {
    joined
  }
}
