use crate::ui::view::{Notice, NoticeLevel};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: breadcrumb on the left, the current toast on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], toast: Option<&Notice>) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let background = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(background), area);

  if let Some(notice) = toast {
    let style = match notice.level {
      NoticeLevel::Info => Style::default().fg(Color::Black).bg(Color::Green),
      NoticeLevel::Error => Style::default().fg(Color::White).bg(Color::Red),
    };
    let line = Line::from(Span::styled(format!(" {} ", notice.message), style)).right_aligned();
    frame.render_widget(Paragraph::new(line), area);
  }
}
