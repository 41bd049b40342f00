use super::{render_placeholder, titled_block, FormView};
use crate::api::settings::{self, LegalDoc};
use crate::api::types::{DataEnvelope, LegalDocument};
use crate::form::screens::LegalForm;
use crate::form::Route;
use crate::query::{QueryHandle, QueryState};
use crate::ui::renderfns::strip_html;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

/// Read-only rendering of a legal document, with an editor one key away
pub struct LegalView {
  ctx: Context,
  doc: LegalDoc,
  document: QueryHandle<DataEnvelope<LegalDocument>>,
  scroll: u16,
}

impl LegalView {
  pub fn new(ctx: Context, doc: LegalDoc) -> Self {
    let document = ctx.api.query(&settings::GET_DOCUMENT, &doc);
    Self {
      ctx,
      doc,
      document,
      scroll: 0,
    }
  }
}

impl View for LegalView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::PageDown | KeyCode::Char(' ') => self.scroll = self.scroll.saturating_add(10),
      KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
      KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
      KeyCode::Char('e') => {
        // An empty document can still be written from scratch
        let current = self
          .document
          .data()
          .map(|d| d.0.description.clone())
          .unwrap_or_default();
        if self.document.is_loading() {
          return ViewAction::None;
        }
        return ViewAction::Push(Box::new(FormView::new(
          self.ctx.clone(),
          format!("Edit {}", self.doc.title()),
          LegalForm::new(self.doc, &current),
        )));
      }
      KeyCode::Char('r') => self.document.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.document.state();
    let block = titled_block(self.doc.title(), &state, None);

    let text = match &state {
      QueryState::Success(doc) => strip_html(&doc.0.description),
      _ => String::new(),
    };
    if text.trim().is_empty() {
      render_placeholder(
        frame,
        area,
        block,
        &state,
        "This document is empty. Press 'e' to write it.",
      );
      return;
    }

    let paragraph = Paragraph::new(text)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.doc.title().to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(Route::Legal(self.doc))
  }

  fn tick(&mut self) -> ViewAction {
    if self.document.poll() {
      self.scroll = 0;
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("j/k", "scroll").with_priority(20),
      Shortcut::new("e", "edit").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use crate::config::Config;
  use crate::form::{Form, FormController};
  use crossterm::event::KeyModifiers;
  use reqwest::Method;
  use serde_json::json;

  #[tokio::test]
  async fn test_saving_a_document_refreshes_the_viewer() {
    let transport = MockTransport::new();
    let path = "/dicipline/privacy-policy/";
    transport.on(Method::GET, path, 200, json!({"data": {"description": "<p>v1</p>"}}));
    transport.on(Method::GET, path, 200, json!({"data": {"description": "<p>v2</p>"}}));
    transport.on(Method::PUT, path, 200, json!({"message": "Saved"}));
    let api = api_with(transport.clone());
    let mut view = LegalView::new(Context::new(api.clone(), Config::default()), LegalDoc::Privacy);
    view.document.settled().await;

    assert!(matches!(
      view.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)),
      ViewAction::Push(_)
    ));

    let mut form = LegalForm::new(LegalDoc::Privacy, "<p>v1</p>");
    form.set("description", "<p>v2</p>");
    let ack = FormController::new(form).submit(&api).await.unwrap();
    assert_eq!(ack.next, Route::Legal(LegalDoc::Privacy));

    let state = view.document.settled().await;
    assert_eq!(state.data().map(|d| d.0.description.clone()), Some("<p>v2</p>".to_string()));
  }
}
