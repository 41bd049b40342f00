pub mod components;
pub mod renderfns;
pub mod task;
pub mod view;
pub mod views;

use crate::api::Api;
use crate::app::App;
use crate::config::Config;
use ratatui::prelude::*;
use ratatui::widgets::TableState;
use std::sync::Arc;

/// What every view needs to reach the backend and settings
#[derive(Clone)]
pub struct Context {
  pub api: Api,
  pub config: Arc<Config>,
}

impl Context {
  pub fn new(api: Api, config: Config) -> Self {
    Self {
      api,
      config: Arc::new(config),
    }
  }

  pub fn page_size(&self) -> usize {
    self.config.ui.page_size
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let user = app.user_name();
  renderfns::draw_header(
    frame,
    chunks[0],
    app.title(),
    app.api_url(),
    user.as_deref(),
    &app.shortcuts(),
  );

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  renderfns::draw_footer(frame, chunks[2], &app.view_breadcrumb(), app.toast());

  app.command().render_overlay(frame, chunks[1]);
}

/// Keep a table selection inside `len` rows
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
  } else {
    match state.selected() {
      Some(i) if i >= len => state.select(Some(len - 1)),
      None => state.select(Some(0)),
      _ => {}
    }
  }
}
