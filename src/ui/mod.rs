mod components;
mod views;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{App, Mode, ViewState};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);

  if let Some(view) = app.current_view() {
    match view {
      ViewState::CharacterList {
        page,
        search,
        data,
        selected,
        loading,
        error,
      } => views::character_list::draw_character_list(
        frame,
        chunks[1],
        app,
        views::character_list::ListProps {
          page: *page,
          search,
          data: data.as_ref(),
          selected: *selected,
          loading: *loading,
          error: error.as_deref(),
        },
      ),
      ViewState::CharacterDetail {
        character,
        homeworld,
        films,
        starships,
        ..
      } => views::character_detail::draw_character_detail(
        frame, chunks[1], character, homeworld, films, starships,
      ),
      ViewState::Favorites { selected } => {
        views::favorites::draw_favorites(frame, chunks[1], app, *selected)
      }
    }
  }

  if let Some(edit) = app.edit() {
    components::edit_dialog::draw_edit_dialog(frame, chunks[1], edit);
  }

  draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let view_label = match app.current_view() {
    Some(ViewState::CharacterList { search, .. }) if !search.is_empty() => {
      format!("characters · '{}'", search)
    }
    Some(ViewState::CharacterList { .. }) => "characters".to_string(),
    Some(ViewState::CharacterDetail { .. }) => "characters › detail".to_string(),
    Some(ViewState::Favorites { .. }) => "favorites".to_string(),
    None => String::new(),
  };

  let header = Line::from(vec![
    Span::styled(" galdex ", Style::default().fg(Color::Yellow).bold()),
    Span::styled(view_label, Style::default().fg(Color::Gray)),
    Span::raw("  "),
    Span::styled(
      format!("★ {}", app.favorites().len()),
      Style::default().fg(Color::Magenta),
    ),
  ]);
  frame.render_widget(Paragraph::new(header), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint = " :command  /search  j/k:nav  n/p:page  Enter:open  f:favorite  e:edit  q:back";
      (hint.to_string(), Style::default().fg(Color::DarkGray))
    }
    Mode::Command => {
      let suggestions = app.suggestions();
      let rendered = suggestions
        .iter()
        .enumerate()
        .map(|(i, cmd)| {
          if i == app.selected_suggestion() {
            format!("[{}]", cmd.name)
          } else {
            cmd.name.to_string()
          }
        })
        .collect::<Vec<_>>()
        .join(" ");
      let description = suggestions
        .get(app.selected_suggestion())
        .map(|cmd| format!("  — {}", cmd.description))
        .unwrap_or_default();
      (
        format!(":{}  {}{}", app.command_input(), rendered, description),
        Style::default().fg(Color::Yellow),
      )
    }
    Mode::Search => (
      format!("/{}", app.search_input()),
      Style::default().fg(Color::Cyan),
    ),
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}
