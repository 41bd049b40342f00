use crate::ui::renderfns::centered_rect;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Label/value row for detail modals
pub fn field_line<'a>(label: &'a str, value: impl Into<String>) -> Line<'a> {
  Line::from(vec![
    Span::styled(format!("{:<14}", label), Style::default().fg(Color::DarkGray)),
    Span::raw(value.into()),
  ])
}

/// Draw a centered read-only modal
pub fn draw_modal(frame: &mut Frame, area: Rect, title: &str, body: Vec<Line>) {
  let height = (body.len() as u16 + 4).min(area.height);
  let overlay_area = centered_rect(area, 70, height);
  frame.render_widget(Clear, overlay_area);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(format!(" {} ", title))
    .title_bottom(Line::from(" Esc close ").right_aligned());

  let paragraph = Paragraph::new(body)
    .block(block)
    .wrap(Wrap { trim: false });
  frame.render_widget(paragraph, overlay_area);
}
