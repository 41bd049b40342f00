use super::{detail_body, header_style, highlight, render_placeholder, titled_block};
use crate::api::types::{format_amount, DashboardSummary, DataEnvelope, UserSummary};
use crate::api::users;
use crate::form::Route;
use crate::query::{QueryHandle, QueryState};
use crate::ui::components::{draw_modal, field_line, PagedTable};
use crate::ui::renderfns::{format_date, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

/// Totals, the user table and a per-user detail modal
pub struct DashboardView {
  ctx: Context,
  summary: QueryHandle<DashboardSummary>,
  table: PagedTable,
  detail: Option<QueryHandle<DataEnvelope<UserSummary>>>,
}

impl DashboardView {
  pub fn new(ctx: Context) -> Self {
    let summary = ctx.api.query(&users::DASHBOARD, &());
    let table = PagedTable::new(ctx.page_size());
    Self {
      ctx,
      summary,
      table,
      detail: None,
    }
  }

  fn user_count(&self) -> usize {
    self.summary.data().map(|s| s.user_list.len()).unwrap_or(0)
  }

  fn open_detail(&mut self) {
    let Some(summary) = self.summary.data() else {
      return;
    };
    if let Some(user) = self
      .table
      .selected(summary.user_list.len())
      .and_then(|idx| summary.user_list.get(idx))
    {
      self.detail = Some(self.ctx.api.query(&users::GET, &user.id));
    }
  }

  fn render_cards(&self, frame: &mut Frame, area: Rect) {
    let cards = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Ratio(1, 3); 3])
      .split(area);

    let summary = self.summary.data();
    let values = [
      (
        "Total donations",
        summary.as_ref().map(|s| format_amount(s.total_donations)),
        Color::Green,
      ),
      (
        "Users",
        summary.as_ref().map(|s| format!("{}", s.all_user_list)),
        Color::Cyan,
      ),
      (
        "Stories",
        summary.as_ref().map(|s| format!("{}", s.total_stories)),
        Color::Magenta,
      ),
    ];

    for ((label, value, color), rect) in values.into_iter().zip(cards.iter()) {
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", label));
      let text = value.unwrap_or_else(|| "...".to_string());
      let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
      frame.render_widget(paragraph, *rect);
    }
  }

  fn render_users(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.summary.state();
    let users: &[UserSummary] = match &state {
      QueryState::Success(summary) => &summary.user_list,
      _ => &[],
    };
    let block = titled_block("Users", &state, Some(users.len()));

    if users.is_empty() {
      render_placeholder(frame, area, block, &state, "No users yet.");
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(area);

    self.table.sync(users.len());
    let rows: Vec<Row> = self
      .table
      .pager()
      .window(users)
      .iter()
      .map(|user| {
        Row::new(vec![
          Span::styled(truncate(&user.full_name, 24), Style::default().fg(Color::Cyan)),
          Span::raw(truncate(&user.email, 32)),
          Span::raw(user.phone.clone().unwrap_or_default()),
          Span::styled(
            user.created_at.as_deref().map(format_date).unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
          ),
        ])
      })
      .collect();

    let table = Table::new(
      rows,
      [
        Constraint::Length(26),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(14),
      ],
    )
    .header(Row::new(vec!["Name", "Email", "Phone", "Joined"]).style(header_style()))
    .block(block)
    .row_highlight_style(highlight())
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, chunks[0], self.table.state_mut());
    self.table.render_pager(frame, chunks[1], users.len());
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let Some(detail) = &self.detail else {
      return;
    };
    let body = detail_body(&detail.state(), |user| {
      let user = &user.0;
      vec![
        field_line("Name", user.full_name.clone()),
        field_line("Email", user.email.clone()),
        field_line("Phone", user.phone.clone().unwrap_or_else(|| "-".to_string())),
        field_line(
          "Joined",
          user.created_at.as_deref().map(format_date).unwrap_or_else(|| "-".to_string()),
        ),
        field_line(
          "Picture",
          user
            .profile_pic
            .as_deref()
            .map(|p| self.ctx.config.image_url(p))
            .unwrap_or_else(|| "-".to_string()),
        ),
      ]
    });
    draw_modal(frame, area, "User", body);
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.detail.is_some() {
      if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
        self.detail = None;
      }
      return ViewAction::None;
    }

    let len = self.user_count();
    if self.table.handle_key(key, len) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter => self.open_detail(),
      KeyCode::Char('r') => self.summary.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(3), Constraint::Min(5)])
      .split(area);

    self.render_cards(frame, chunks[0]);
    self.render_users(frame, chunks[1]);
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Dashboard".to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(Route::Dashboard)
  }

  fn tick(&mut self) -> ViewAction {
    self.summary.poll();
    if let Some(detail) = self.detail.as_mut() {
      detail.poll();
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("Enter", "user").with_priority(20),
      Shortcut::new("n/p", "page").with_priority(30),
      Shortcut::new("r", "refresh").with_priority(40),
    ]
  }
}
