use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{EditField, EditState};

/// Modal dialog for editing a favorite's height and gender.
pub fn draw_edit_dialog(frame: &mut Frame, area: Rect, edit: &EditState) {
  let dialog = centered_rect(area, 44, 8);
  frame.render_widget(Clear, dialog);

  let block = Block::default()
    .title(format!(" Edit {} ", edit.name))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta));
  let inner = block.inner(dialog);
  frame.render_widget(block, dialog);

  let height_focused = edit.field == EditField::Height;
  let lines = vec![
    Line::default(),
    input_line("Height", &edit.height, height_focused, true),
    input_line("Gender", edit.gender.as_str(), !height_focused, false),
    Line::default(),
    Line::styled(
      " Tab:switch  Space:cycle  Enter:save  Esc:cancel",
      Style::default().fg(Color::DarkGray),
    ),
  ];

  frame.render_widget(Paragraph::new(lines), inner);
}

fn input_line(label: &str, value: &str, focused: bool, cursor: bool) -> Line<'static> {
  let style = if focused {
    Style::default().fg(Color::Yellow)
  } else {
    Style::default()
  };
  let marker = if focused { "› " } else { "  " };
  let caret = if focused && cursor { "█" } else { "" };

  Line::from(vec![
    Span::styled(format!("{}{}: ", marker, label), style.fg(Color::Gray)),
    Span::styled(format!("{}{}", value, caret), style),
  ])
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}
