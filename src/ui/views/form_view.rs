use crate::form::{Field, FieldKind, Form, FormController, Route, SubmitError};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{Notice, Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const FORM_WIDTH: u16 = 80;
const MULTILINE_HEIGHT: u16 = 8;

/// What Esc does on a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escape {
  Pop,
  Navigate(Route),
  /// Root screens have nowhere to go back to
  Ignore,
}

/// Ctrl+<key> shortcut to another screen
#[derive(Debug, Clone)]
struct Link {
  key: char,
  label: &'static str,
  route: Route,
}

/// Generic editor for any [`Form`]: one input per field, inline errors,
/// background submit polled on tick.
pub struct FormView<F: Form> {
  ctx: Context,
  title: String,
  hint: Option<String>,
  controller: FormController<F>,
  inputs: Vec<TextInput>,
  focus: usize,
  escape: Escape,
  links: Vec<Link>,
  route: Option<Route>,
}

impl<F: Form> FormView<F> {
  pub fn new(ctx: Context, title: impl Into<String>, form: F) -> Self {
    let inputs = form
      .fields()
      .iter()
      .map(|f| TextInput::with_value(&form.value(f.name)))
      .collect();
    Self {
      ctx,
      title: title.into(),
      hint: None,
      controller: FormController::new(form),
      inputs,
      focus: 0,
      escape: Escape::Pop,
      links: Vec::new(),
      route: None,
    }
  }

  pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
    self.hint = Some(hint.into());
    self
  }

  pub fn with_escape(mut self, escape: Escape) -> Self {
    self.escape = escape;
    self
  }

  pub fn with_link(mut self, key: char, label: &'static str, route: Route) -> Self {
    self.links.push(Link { key, label, route });
    self
  }

  /// Register this form as the screen for `route`
  pub fn with_route(mut self, route: Route) -> Self {
    self.route = Some(route);
    self
  }

  fn fields(&self) -> &'static [Field] {
    self.controller.form().fields()
  }

  /// Copy form values back into the inputs (after a reset)
  fn sync_inputs(&mut self) {
    let fields = self.fields();
    for (input, field) in self.inputs.iter_mut().zip(fields) {
      input.set_value(&self.controller.form().value(field.name));
    }
  }

  /// Push the focused input into the form. Image paths load here, not on
  /// every keystroke.
  fn commit(&mut self, idx: usize) {
    if let (Some(field), Some(input)) = (self.fields().get(idx), self.inputs.get(idx)) {
      let value = input.value().to_string();
      self.controller.set(field.name, &value);
    }
  }

  fn on_edit(&mut self, idx: usize) {
    let Some(field) = self.fields().get(idx) else {
      return;
    };
    if field.kind == FieldKind::Image {
      self.controller.touch(field.name);
    } else {
      self.commit(idx);
    }
  }

  fn move_focus(&mut self, forward: bool) {
    let count = self.inputs.len();
    if count == 0 {
      return;
    }
    self.commit(self.focus);
    self.focus = if forward {
      (self.focus + 1) % count
    } else {
      (self.focus + count - 1) % count
    };
  }

  fn submit(&mut self) -> ViewAction {
    for idx in 0..self.inputs.len() {
      self.commit(idx);
    }
    match self.controller.start(&self.ctx.api) {
      Ok(()) => ViewAction::None,
      Err(SubmitError::Invalid(errors)) => {
        // Jump to the first field with an error
        if let Some(idx) = self
          .fields()
          .iter()
          .position(|f| errors.contains_key(f.name))
        {
          self.focus = idx;
        }
        ViewAction::None
      }
      Err(SubmitError::Busy) => ViewAction::None,
      Err(SubmitError::Http(e)) => ViewAction::Notify(Notice::error(e.to_string())),
    }
  }

  fn focused_kind(&self) -> Option<FieldKind> {
    self.fields().get(self.focus).map(|f| f.kind)
  }

  fn render_field(&self, frame: &mut Frame, area: Rect, idx: usize, field: &Field) {
    let focused = idx == self.focus;
    let error = self.controller.error(field.name);
    let input = &self.inputs[idx];

    let border = if error.is_some() {
      Color::Red
    } else if focused {
      Color::Yellow
    } else {
      Color::DarkGray
    };

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border))
      .title(format!(" {} ", field.label));

    let inner = block.inner(area);
    let value = input.value();
    let (text, style) = match field.kind {
      FieldKind::Secret => ("•".repeat(value.chars().count()), Style::default()),
      FieldKind::Image if value.is_empty() => (
        "path to a png/jpg/webp file, 5MB max".to_string(),
        Style::default().fg(Color::DarkGray),
      ),
      _ => (value.to_string(), Style::default()),
    };

    let mut paragraph = Paragraph::new(text).block(block).style(style);
    if field.kind == FieldKind::Multiline {
      paragraph = paragraph.wrap(Wrap { trim: false });
    }
    frame.render_widget(paragraph, area);

    if focused && !self.controller.is_submitting() {
      // Cursor on the current line; wrapped lines are not accounted for
      let before: String = value.chars().take(input.cursor_position()).collect();
      let row = before.matches('\n').count() as u16;
      let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) as u16;
      let col = if field.kind == FieldKind::Image && value.is_empty() {
        0
      } else {
        col
      };
      if row < inner.height && col < inner.width {
        frame.set_cursor_position((inner.x + col, inner.y + row));
      }
    }
  }

  fn help_line(&self) -> Line<'static> {
    let key = Style::default().fg(Color::Cyan);
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
      Span::styled("<Tab>", key),
      Span::styled(" next  ", dim),
      Span::styled("<Ctrl-S>", key),
      Span::styled(" submit  ", dim),
    ];
    if self.escape != Escape::Ignore {
      spans.push(Span::styled("<Esc>", key));
      spans.push(Span::styled(" cancel  ", dim));
    }
    for link in &self.links {
      spans.push(Span::styled(format!("<Ctrl-{}>", link.key.to_ascii_uppercase()), key));
      spans.push(Span::styled(format!(" {}  ", link.label), dim));
    }
    Line::from(spans)
  }
}

impl<F: Form> View for FormView<F> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.controller.is_submitting() {
      return ViewAction::None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Char('s') if ctrl => return self.submit(),
      KeyCode::Char(c) if ctrl => {
        if let Some(link) = self.links.iter().find(|l| l.key == c) {
          return ViewAction::Navigate(link.route.clone());
        }
      }
      KeyCode::Esc => {
        return match &self.escape {
          Escape::Pop => ViewAction::Pop,
          Escape::Navigate(route) => ViewAction::Navigate(route.clone()),
          Escape::Ignore => ViewAction::None,
        };
      }
      KeyCode::Tab => {
        self.move_focus(true);
        return ViewAction::None;
      }
      KeyCode::BackTab => {
        self.move_focus(false);
        return ViewAction::None;
      }
      KeyCode::Down | KeyCode::Up if self.focused_kind() != Some(FieldKind::Multiline) => {
        self.move_focus(key.code == KeyCode::Down);
        return ViewAction::None;
      }
      KeyCode::Enter => {
        if self.focused_kind() == Some(FieldKind::Multiline) {
          if let Some(input) = self.inputs.get_mut(self.focus) {
            input.insert_newline();
          }
          self.on_edit(self.focus);
          return ViewAction::None;
        }
        if self.focus + 1 >= self.inputs.len() {
          return self.submit();
        }
        self.move_focus(true);
        return ViewAction::None;
      }
      _ => {}
    }

    let idx = self.focus;
    if let Some(input) = self.inputs.get_mut(idx) {
      if input.handle_key(key) == InputResult::Consumed {
        self.on_edit(idx);
      }
    }
    ViewAction::None
  }

  fn handle_paste(&mut self, text: &str) -> ViewAction {
    let idx = self.focus;
    let multiline = self.focused_kind() == Some(FieldKind::Multiline);
    if let Some(input) = self.inputs.get_mut(idx) {
      if multiline {
        input.insert_str(text);
      } else {
        input.insert_str(text.lines().next().unwrap_or("").trim_end());
      }
      self.on_edit(idx);
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = area.width.min(FORM_WIDTH);
    let area = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);

    let title = if self.controller.is_submitting() {
      format!(" {} (submitting...) ", self.title)
    } else {
      format!(" {} ", self.title)
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = self.fields();
    let mut constraints = Vec::with_capacity(fields.len() * 2 + 3);
    if self.hint.is_some() {
      constraints.push(Constraint::Length(2));
    }
    for field in fields {
      constraints.push(Constraint::Length(if field.kind == FieldKind::Multiline {
        MULTILINE_HEIGHT
      } else {
        3
      }));
      constraints.push(Constraint::Length(1)); // Error line
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1)); // Help line

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints(constraints)
      .split(inner);

    let mut row = 0;
    if let Some(hint) = &self.hint {
      let paragraph = Paragraph::new(hint.as_str())
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
      frame.render_widget(paragraph, chunks[row]);
      row += 1;
    }

    for (idx, field) in fields.iter().enumerate() {
      self.render_field(frame, chunks[row], idx, field);
      if let Some(error) = self.controller.error(field.name) {
        let paragraph =
          Paragraph::new(format!(" {}", error)).style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, chunks[row + 1]);
      }
      row += 2;
    }

    frame.render_widget(Paragraph::new(self.help_line()), chunks[row + 1]);
  }

  fn breadcrumb_label(&self) -> String {
    self.title.clone()
  }

  fn route(&self) -> Option<Route> {
    self.route.clone()
  }

  fn captures_text(&self) -> bool {
    true
  }

  fn tick(&mut self) -> ViewAction {
    match self.controller.poll() {
      Some(Ok(ack)) => {
        self.sync_inputs();
        self.focus = 0;
        ViewAction::Submitted(ack)
      }
      Some(Err(SubmitError::Http(e))) => ViewAction::Notify(Notice::error(e.to_string())),
      Some(Err(_)) | None => ViewAction::None,
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    let mut shortcuts = vec![
      Shortcut::new("Tab", "next field").with_priority(10),
      Shortcut::new("Ctrl-S", "submit").with_priority(20),
    ];
    if self.escape != Escape::Ignore {
      shortcuts.push(Shortcut::new("Esc", "cancel").with_priority(30));
    }
    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use crate::config::Config;
  use crate::form::screens::{ForgotPasswordForm, ProfileForm};
  use reqwest::Method;
  use serde_json::json;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctx(transport: std::sync::Arc<MockTransport>) -> Context {
    Context::new(api_with(transport), Config::default())
  }

  fn type_str<F: Form>(view: &mut FormView<F>, text: &str) {
    for c in text.chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[tokio::test]
  async fn test_typing_updates_form_and_enter_submits() {
    let transport = MockTransport::new();
    transport.on(Method::POST, "/auth/forgot-password/", 200, json!({}));
    let mut view = FormView::new(ctx(transport.clone()), "Forgot password", ForgotPasswordForm::default());

    type_str(&mut view, "admin@ms.org");
    assert_eq!(view.controller.form().email, "admin@ms.org");

    assert!(matches!(view.handle_key(key(KeyCode::Enter)), ViewAction::None));
    assert!(view.controller.is_submitting());

    tokio::time::sleep(Duration::from_millis(50)).await;
    match view.tick() {
      ViewAction::Submitted(ack) => assert_eq!(
        ack.next,
        Route::VerifyOtp {
          email: "admin@ms.org".to_string()
        }
      ),
      other => panic!("expected submit, got {:?}", other),
    }
    // Reset form is reflected in the input
    assert_eq!(view.inputs[0].value(), "");
  }

  #[tokio::test]
  async fn test_invalid_submit_shows_inline_error() {
    let transport = MockTransport::new();
    let mut view = FormView::new(ctx(transport.clone()), "Forgot password", ForgotPasswordForm::default());

    view.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
    assert_eq!(view.controller.error("email"), Some("Email is required"));
    assert!(!view.controller.is_submitting());
    assert!(transport.requests().is_empty());

    type_str(&mut view, "a");
    assert_eq!(view.controller.error("email"), None);
  }

  #[tokio::test]
  async fn test_server_error_becomes_toast() {
    let transport = MockTransport::new();
    transport.on(
      Method::POST,
      "/auth/forgot-password/",
      404,
      json!({"message": "No account with that email"}),
    );
    let mut view = FormView::new(ctx(transport), "Forgot password", ForgotPasswordForm::default());
    type_str(&mut view, "who@ms.org");
    view.handle_key(key(KeyCode::Enter));

    tokio::time::sleep(Duration::from_millis(50)).await;
    match view.tick() {
      ViewAction::Notify(notice) => assert!(notice.message.contains("No account")),
      other => panic!("expected notice, got {:?}", other),
    }
    assert_eq!(view.inputs[0].value(), "who@ms.org");
  }

  #[tokio::test]
  async fn test_tab_moves_focus_and_escape_pops() {
    let transport = MockTransport::new();
    let mut view = FormView::new(ctx(transport), "Edit profile", ProfileForm::new("Asha", ""));
    assert_eq!(view.inputs[0].value(), "Asha");

    view.handle_key(key(KeyCode::Tab));
    type_str(&mut view, "555");
    assert_eq!(view.controller.form().value("phone"), "555");

    view.handle_key(key(KeyCode::BackTab));
    assert_eq!(view.focus, 0);
    assert!(matches!(view.handle_key(key(KeyCode::Esc)), ViewAction::Pop));
  }

  #[tokio::test]
  async fn test_links_navigate() {
    let transport = MockTransport::new();
    let mut view = FormView::new(ctx(transport), "Sign in", ForgotPasswordForm::default())
      .with_escape(Escape::Ignore)
      .with_link('f', "forgot password", Route::ForgotPassword);

    assert!(matches!(view.handle_key(key(KeyCode::Esc)), ViewAction::None));
    assert!(matches!(
      view.handle_key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL)),
      ViewAction::Navigate(Route::ForgotPassword)
    ));
  }
}
