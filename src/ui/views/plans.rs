use super::{header_style, highlight, render_placeholder, titled_block, FormView, DELETE_BUSY};
use crate::api::types::{format_amount, DataEnvelope, MessageResponse, SubscriptionPlan};
use crate::api::subscriptions;
use crate::form::screens::PlanForm;
use crate::form::Route;
use crate::query::{QueryHandle, QueryState};
use crate::ui::components::{ConfirmDialog, ConfirmEvent, KeyResult, PagedTable};
use crate::ui::renderfns::truncate;
use crate::ui::task::Task;
use crate::ui::view::{Notice, Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};
use std::sync::Arc;

/// Subscription plans with add, edit and delete
pub struct PlansView {
  ctx: Context,
  list: QueryHandle<DataEnvelope<Vec<SubscriptionPlan>>>,
  table: PagedTable,
  confirm: ConfirmDialog<SubscriptionPlan>,
  deleting: Task<MessageResponse>,
}

impl PlansView {
  pub fn new(ctx: Context) -> Self {
    let list = ctx.api.query(&subscriptions::LIST, &());
    let table = PagedTable::new(ctx.page_size());
    Self {
      ctx,
      list,
      table,
      confirm: ConfirmDialog::new(),
      deleting: Task::new(),
    }
  }

  fn plans(&self) -> Vec<SubscriptionPlan> {
    self.list.data().map(|d| d.0.clone()).unwrap_or_default()
  }

  fn selected(&self) -> Option<SubscriptionPlan> {
    let plans = self.plans();
    let idx = self.table.selected(plans.len())?;
    plans.into_iter().nth(idx)
  }

  fn plan_form(&self, plan: Option<&SubscriptionPlan>) -> Box<dyn View> {
    let (title, form) = match plan {
      Some(p) => (
        "Edit plan",
        PlanForm::edit(p.id, &p.name, p.amount, &p.expiration, &p.features),
      ),
      None => ("New plan", PlanForm::new()),
    };
    Box::new(
      FormView::new(self.ctx.clone(), title, form)
        .with_hint("Amount in dollars. Expiration as the backend expects it, e.g. \"30 days\"."),
    )
  }

  fn render_features(&self, frame: &mut Frame, area: Rect, plan: Option<&SubscriptionPlan>) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray))
      .title(" Features ");
    let lines: Vec<Line> = plan
      .map(|p| {
        p.features
          .iter()
          .map(|f| {
            Line::from(vec![
              Span::styled("• ", Style::default().fg(Color::Green)),
              Span::raw(f.clone()),
            ])
          })
          .collect()
      })
      .unwrap_or_default();
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
  }
}

impl View for PlansView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(plan)) => {
        let api = self.ctx.api.clone();
        let started = self
          .deleting
          .spawn(async move { api.mutate(&subscriptions::DELETE, &plan.id).await });
        return if started {
          ViewAction::None
        } else {
          ViewAction::Notify(Notice::error(DELETE_BUSY))
        };
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    if self.table.handle_key(key, self.plans().len()) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('a') => return ViewAction::Push(self.plan_form(None)),
      KeyCode::Char('e') | KeyCode::Enter => {
        if let Some(plan) = self.selected() {
          return ViewAction::Push(self.plan_form(Some(&plan)));
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if self.deleting.is_running() {
          return ViewAction::Notify(Notice::error(DELETE_BUSY));
        }
        if let Some(plan) = self.selected() {
          let message = format!("Delete the \"{}\" plan?", truncate(&plan.name, 40));
          self.confirm.show("Delete plan", message, plan);
        }
      }
      KeyCode::Char('r') => self.list.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.list.state();
    let plans: Arc<DataEnvelope<Vec<SubscriptionPlan>>> = match &state {
      QueryState::Success(data) => data.clone(),
      _ => Arc::new(DataEnvelope(Vec::new())),
    };
    let plans = &plans.0;
    let block = titled_block("Subscription Plans", &state, Some(plans.len()));

    if plans.is_empty() {
      render_placeholder(frame, area, block, &state, "No plans yet. Press 'a' to add one.");
      self.confirm.render_overlay(frame, area);
      return;
    }

    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
      .split(area);
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(columns[0]);

    self.table.sync(plans.len());
    let rows: Vec<Row> = self
      .table
      .pager()
      .window(plans.as_slice())
      .iter()
      .map(|p| {
        Row::new(vec![
          Span::styled(truncate(&p.name, 28), Style::default().fg(Color::Cyan)),
          Span::styled(format_amount(p.amount), Style::default().fg(Color::Green)),
          Span::raw(p.expiration.clone()),
          Span::styled(format!("{}", p.features.len()), Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect();

    let table = Table::new(
      rows,
      [
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(9),
      ],
    )
    .header(Row::new(vec!["Plan", "Amount", "Expiration", "Features"]).style(header_style()))
    .block(block)
    .row_highlight_style(highlight())
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, chunks[0], self.table.state_mut());
    self.table.render_pager(frame, chunks[1], plans.len());

    let selected = self.table.selected(plans.len()).and_then(|i| plans.get(i));
    self.render_features(frame, columns[1], selected);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Plans".to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(Route::Plans)
  }

  fn tick(&mut self) -> ViewAction {
    self.list.poll();
    match self.deleting.poll() {
      Some(Ok(response)) => {
        ViewAction::Notify(Notice::info(response.message_or("Plan deleted successfully!")))
      }
      Some(Err(e)) => ViewAction::Notify(Notice::error(e.to_string())),
      None => ViewAction::None,
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("a", "add").with_priority(20),
      Shortcut::new("e", "edit").with_priority(30),
      Shortcut::new("d", "delete").with_priority(40),
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

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_delete_plan_after_confirmation() {
    let transport = MockTransport::new();
    transport.on(
      Method::GET,
      "/subscription/plans/",
      200,
      json!({"data": [{"id": 9, "name": "Monthly", "amount": 10, "expiration": "30 days",
        "features": ["Ad-free"]}]}),
    );
    transport.on(Method::GET, "/subscription/plans/", 200, json!({"data": []}));
    transport.on(Method::DELETE, "/subscription/plans/9/", 200, json!({}));
    let ctx = Context::new(api_with(transport.clone()), Config::default());
    let mut view = PlansView::new(ctx);
    view.list.settled().await;
    view.table.sync(1);

    match view.handle_key(key(KeyCode::Char('e'))) {
      ViewAction::Push(form) => assert_eq!(form.breadcrumb_label(), "Edit plan"),
      other => panic!("expected edit form, got {:?}", other),
    }

    view.handle_key(key(KeyCode::Char('d')));
    view.handle_key(key(KeyCode::Enter));
    tokio::time::sleep(Duration::from_millis(50)).await;

    match view.tick() {
      ViewAction::Notify(notice) => assert_eq!(notice.message, "Plan deleted successfully!"),
      other => panic!("expected notice, got {:?}", other),
    }
    assert!(view.plans().is_empty());
  }
}
