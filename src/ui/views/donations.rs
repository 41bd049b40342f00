use super::{header_style, highlight, render_placeholder, titled_block};
use crate::api::donations;
use crate::api::types::{format_amount, Donation};
use crate::form::Route;
use crate::query::{QueryHandle, QueryState};
use crate::ui::components::{draw_modal, field_line, PagedTable};
use crate::ui::renderfns::{format_date, payment_status_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Row, Table};
use std::sync::Arc;

/// Donation shown in the modal: fetched by id, or the list row itself when
/// the backend sent no id
enum Detail {
  Remote(QueryHandle<Donation>),
  Local(Donation),
}

/// Donation ledger
pub struct DonationsView {
  ctx: Context,
  list: QueryHandle<Vec<Donation>>,
  table: PagedTable,
  detail: Option<Detail>,
}

impl DonationsView {
  pub fn new(ctx: Context) -> Self {
    let list = ctx.api.query(&donations::LIST, &());
    let table = PagedTable::new(ctx.page_size());
    Self {
      ctx,
      list,
      table,
      detail: None,
    }
  }

  fn donations(&self) -> Arc<Vec<Donation>> {
    self.list.data().unwrap_or_default()
  }

  fn open_detail(&mut self) {
    let all = self.donations();
    let Some(donation) = self.table.selected(all.len()).and_then(|i| all.get(i)) else {
      return;
    };
    self.detail = Some(match donation.id {
      Some(id) => Detail::Remote(self.ctx.api.query(&donations::DONATOR, &id)),
      None => Detail::Local(donation.clone()),
    });
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let body = match &self.detail {
      None => return,
      Some(Detail::Local(donation)) => donation_lines(donation),
      Some(Detail::Remote(handle)) => match handle.state() {
        QueryState::Success(donation) => donation_lines(&donation),
        QueryState::Error(e) => vec![Line::styled(e.to_string(), Style::default().fg(Color::Red))],
        _ => vec![Line::styled("Loading...", Style::default().fg(Color::DarkGray))],
      },
    };
    draw_modal(frame, area, "Donation", body);
  }
}

fn donation_lines(donation: &Donation) -> Vec<Line<'static>> {
  vec![
    field_line("Donor", donation.full_name.clone()),
    field_line("Email", donation.email.clone()),
    field_line("Amount", format_amount(donation.amount)),
    field_line("Location", donation.location.clone().unwrap_or_else(|| "-".to_string())),
    Line::from(vec![
      Span::styled(format!("{:<14}", "Status"), Style::default().fg(Color::DarkGray)),
      Span::styled(
        donation.payment_status.clone(),
        Style::default().fg(payment_status_color(&donation.payment_status)),
      ),
    ]),
    field_line("Date", format_date(&donation.created_at)),
  ]
}

impl View for DonationsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.detail.is_some() {
      if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
        self.detail = None;
      }
      return ViewAction::None;
    }

    if self.table.handle_key(key, self.donations().len()) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter => self.open_detail(),
      KeyCode::Char('r') => self.list.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.list.state();
    let all = self.donations();
    let block = titled_block("Donations", &state, Some(all.len()));

    if all.is_empty() {
      render_placeholder(frame, area, block, &state, "No donations yet.");
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(area);

    self.table.sync(all.len());
    let rows: Vec<Row> = self
      .table
      .pager()
      .window(all.as_slice())
      .iter()
      .map(|d| {
        Row::new(vec![
          Span::styled(truncate(&d.full_name, 24), Style::default().fg(Color::Cyan)),
          Span::raw(truncate(&d.email, 30)),
          Span::styled(format_amount(d.amount), Style::default().fg(Color::Green)),
          Span::raw(truncate(d.location.as_deref().unwrap_or("-"), 18)),
          Span::styled(
            d.payment_status.clone(),
            Style::default().fg(payment_status_color(&d.payment_status)),
          ),
          Span::styled(format_date(&d.created_at), Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect();

    let table = Table::new(
      rows,
      [
        Constraint::Length(26),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(14),
      ],
    )
    .header(
      Row::new(vec!["Donor", "Email", "Amount", "Location", "Status", "Date"]).style(header_style()),
    )
    .block(block)
    .row_highlight_style(highlight())
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, chunks[0], self.table.state_mut());
    self.table.render_pager(frame, chunks[1], all.len());
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Donations".to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(Route::Donations)
  }

  fn tick(&mut self) -> ViewAction {
    self.list.poll();
    if let Some(Detail::Remote(handle)) = self.detail.as_mut() {
      handle.poll();
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("Enter", "details").with_priority(20),
      Shortcut::new("n/p", "page").with_priority(30),
      Shortcut::new("r", "refresh").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use crate::config::Config;
  use crossterm::event::KeyModifiers;
  use reqwest::Method;
  use serde_json::json;
  use std::time::Duration;

  fn donation(id: Option<u64>, name: &str) -> serde_json::Value {
    json!({"id": id, "full_name": name, "email": "d@ms.org", "amount": "25",
      "payment_status": "paid", "created_at": "2024-03-12T10:00:00Z"})
  }

  #[tokio::test]
  async fn test_detail_fetches_by_id_or_falls_back_to_row() {
    let transport = MockTransport::new();
    transport.on(
      Method::GET,
      "/donation/all-donations/",
      200,
      json!([donation(Some(4), "Ravi"), donation(None, "Anonymous")]),
    );
    transport.on(Method::GET, "/donation/donator/4/", 200, donation(Some(4), "Ravi"));
    let ctx = Context::new(api_with(transport.clone()), Config::default());
    let mut view = DonationsView::new(ctx);
    tokio::time::sleep(Duration::from_millis(20)).await;
    view.tick();
    view.table.sync(2);

    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    let Some(Detail::Remote(handle)) = view.detail.as_mut() else {
      panic!("expected fetched detail");
    };
    assert_eq!(handle.settled().await.data().map(|d| d.amount), Some(25.0));

    view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    view.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
    view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert!(matches!(
      &view.detail,
      Some(Detail::Local(d)) if d.full_name == "Anonymous"
    ));
    assert_eq!(transport.count(Method::GET, "/donation/donator/4/"), 1);
  }
}
