mod content_list;
mod dashboard;
mod donations;
mod form_view;
mod legal;
mod otp;
mod plans;
mod profile;
mod screens;

pub use content_list::{ContentListView, ContentSection};
pub use dashboard::DashboardView;
pub use donations::DonationsView;
pub use form_view::{Escape, FormView};
pub use legal::LegalView;
pub use otp::VerifyOtpView;
pub use plans::PlansView;
pub use profile::ProfileView;
pub use screens::{is_public, view_for};

use crate::query::QueryState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Bordered block titled with the load state of its query
fn titled_block<T>(name: &str, state: &QueryState<T>, count: Option<usize>) -> Block<'static> {
  let title = match state {
    QueryState::Idle | QueryState::Loading => format!(" {} (loading...) ", name),
    QueryState::Error(_) => format!(" {} (error) ", name),
    QueryState::Success(_) => match count {
      Some(n) => format!(" {} ({}) ", name, n),
      None => format!(" {} ", name),
    },
  };
  Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue))
}

/// Placeholder body for a query that has nothing to show yet
fn render_placeholder<T>(
  frame: &mut Frame,
  area: Rect,
  block: Block,
  state: &QueryState<T>,
  empty: &str,
) {
  let (text, color) = match state {
    QueryState::Error(e) => (format!("{}\n\nPress 'r' to retry.", e), Color::Red),
    QueryState::Success(_) => (empty.to_string(), Color::DarkGray),
    _ => ("Loading...".to_string(), Color::DarkGray),
  };
  let paragraph = Paragraph::new(text)
    .block(block)
    .style(Style::default().fg(color))
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

/// Modal body for a detail query
fn detail_body<T>(
  state: &QueryState<std::sync::Arc<T>>,
  lines: impl FnOnce(&T) -> Vec<Line<'static>>,
) -> Vec<Line<'static>> {
  match state {
    QueryState::Success(data) => lines(data),
    QueryState::Error(e) => vec![Line::styled(e.to_string(), Style::default().fg(Color::Red))],
    _ => vec![Line::styled("Loading...", Style::default().fg(Color::DarkGray))],
  }
}

/// Shown when a second delete is confirmed while one is still running
const DELETE_BUSY: &str = "Another delete is still running, try again when it finishes";

fn highlight() -> Style {
  Style::default()
    .bg(Color::DarkGray)
    .add_modifier(Modifier::BOLD)
}

fn header_style() -> Style {
  Style::default()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD)
}
