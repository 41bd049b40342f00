use crate::form::screens::VerifyOtpForm;
use crate::form::{FormController, Route, SubmitError};
use crate::ui::components::{draw_otp_boxes, InputResult};
use crate::ui::view::{Notice, Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Six-box code entry after a reset email
pub struct VerifyOtpView {
  ctx: Context,
  controller: FormController<VerifyOtpForm>,
}

impl VerifyOtpView {
  pub fn new(ctx: Context, email: impl Into<String>) -> Self {
    Self {
      ctx,
      controller: FormController::new(VerifyOtpForm::new(email)),
    }
  }

  fn email(&self) -> &str {
    &self.controller.form().email
  }

  fn submit(&mut self) -> ViewAction {
    match self.controller.start(&self.ctx.api) {
      Err(SubmitError::Http(e)) => ViewAction::Notify(Notice::error(e.to_string())),
      _ => ViewAction::None,
    }
  }
}

impl View for VerifyOtpView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.controller.is_submitting() {
      return ViewAction::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      return ViewAction::None;
    }

    match self.controller.form_mut().otp.handle_key(key) {
      InputResult::Submitted(_) => self.submit(),
      InputResult::Cancelled => ViewAction::Navigate(Route::ForgotPassword),
      InputResult::Consumed => {
        self.controller.touch("otp");
        ViewAction::None
      }
      InputResult::NotHandled => ViewAction::None,
    }
  }

  fn handle_paste(&mut self, text: &str) -> ViewAction {
    if self.controller.form_mut().otp.paste(text) {
      self.controller.touch("otp");
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = area.width.min(60);
    let area = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height.min(14));

    let title = if self.controller.is_submitting() {
      " Verify code (checking...) "
    } else {
      " Verify code "
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(inner);

    let intro = Paragraph::new(format!(
      "Enter the 6-digit code sent to {}. Pasting the whole code fills every box.",
      self.email()
    ))
    .style(Style::default().fg(Color::DarkGray))
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, chunks[0]);

    draw_otp_boxes(
      frame,
      chunks[1],
      &self.controller.form().otp,
      !self.controller.is_submitting(),
    );

    if let Some(error) = self.controller.error("otp") {
      let paragraph = Paragraph::new(error)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, chunks[2]);
    }

    let help = Line::from(vec![
      Span::styled("<Enter>", Style::default().fg(Color::Cyan)),
      Span::styled(" verify  ", Style::default().fg(Color::DarkGray)),
      Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
      Span::styled(" back", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(help), chunks[4]);
  }

  fn breadcrumb_label(&self) -> String {
    "Verify code".to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(Route::VerifyOtp {
      email: self.email().to_string(),
    })
  }

  fn tick(&mut self) -> ViewAction {
    match self.controller.poll() {
      Some(Ok(ack)) => ViewAction::Submitted(ack),
      Some(Err(SubmitError::Http(e))) => ViewAction::Notify(Notice::error(e.to_string())),
      _ => ViewAction::None,
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("0-9", "digit").with_priority(10),
      Shortcut::new("Enter", "verify").with_priority(20),
      Shortcut::new("Esc", "back").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use crate::config::Config;
  use crossterm::event::KeyCode;
  use reqwest::Method;
  use serde_json::json;
  use std::time::Duration;

  fn view(transport: std::sync::Arc<MockTransport>) -> VerifyOtpView {
    VerifyOtpView::new(Context::new(api_with(transport), Config::default()), "a@ms.org")
  }

  #[tokio::test]
  async fn test_incomplete_code_is_not_sent() {
    let transport = MockTransport::new();
    let mut view = view(transport.clone());
    for c in "123".chars() {
      view.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    assert_eq!(
      view.controller.error("otp"),
      Some("Please enter the complete 6-digit code")
    );
    assert!(transport.requests().is_empty());
  }

  #[tokio::test]
  async fn test_pasted_code_verifies_and_moves_to_reset() {
    let transport = MockTransport::new();
    transport.on(Method::POST, "/auth/verify-email/", 200, json!({}));
    let mut view = view(transport.clone());

    view.handle_paste(" 482913 ");
    assert_eq!(view.controller.form().otp.value(), "482913");
    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    tokio::time::sleep(Duration::from_millis(50)).await;
    match view.tick() {
      ViewAction::Submitted(ack) => {
        assert_eq!(ack.message, "Email verified successfully!");
        assert_eq!(
          ack.next,
          Route::ResetPassword {
            email: "a@ms.org".to_string()
          }
        );
      }
      other => panic!("expected submit, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_bad_paste_is_ignored() {
    let mut view = view(MockTransport::new());
    view.handle_paste("12ab56");
    assert_eq!(view.controller.form().otp.value(), "");
  }
}
