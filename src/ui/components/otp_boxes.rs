use crate::form::{OtpInput, OTP_LEN};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

const BOX_WIDTH: u16 = 5;
const GAP: u16 = 1;

/// Six digit boxes, the focused one highlighted
pub fn draw_otp_boxes(frame: &mut Frame, area: Rect, otp: &OtpInput, active: bool) {
  let total = OTP_LEN as u16 * BOX_WIDTH + (OTP_LEN as u16 - 1) * GAP;
  let x0 = area.x + area.width.saturating_sub(total) / 2;

  for (i, digit) in otp.digits().iter().enumerate() {
    let rect = Rect::new(x0 + i as u16 * (BOX_WIDTH + GAP), area.y, BOX_WIDTH, 3).intersection(area);
    let focused = active && i == otp.focus();

    let border = if focused {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(if focused {
        BorderType::Thick
      } else {
        BorderType::Rounded
      })
      .border_style(border);

    let text = digit.map(|d| d.to_string()).unwrap_or_default();
    let paragraph = Paragraph::new(text)
      .block(block)
      .alignment(Alignment::Center)
      .style(Style::default().fg(Color::White).bold());
    frame.render_widget(paragraph, rect);
  }
}
