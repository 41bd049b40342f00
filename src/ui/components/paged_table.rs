use crate::pagination::Paginator;
use crate::ui::ensure_valid_selection;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, TableState};

/// Selection plus page window over an in-memory list.
///
/// The table shows one page at a time; the selection is relative to the
/// page, [`PagedTable::selected`] maps it back to the full list.
#[derive(Debug, Clone)]
pub struct PagedTable {
  pager: Paginator,
  state: TableState,
}

impl PagedTable {
  pub fn new(page_size: usize) -> Self {
    Self {
      pager: Paginator::new(page_size),
      state: TableState::default(),
    }
  }

  pub fn pager(&self) -> &Paginator {
    &self.pager
  }

  pub fn state_mut(&mut self) -> &mut TableState {
    &mut self.state
  }

  /// Index into the full list of the selected row
  pub fn selected(&self, len: usize) -> Option<usize> {
    let range = self.pager.range(len);
    let idx = range.start + self.state.selected()?;
    (idx < range.end).then_some(idx)
  }

  /// Bring page and selection back in range after the list changed
  pub fn sync(&mut self, len: usize) {
    self.pager.clamp(len);
    let rows = self.pager.range(len).len();
    ensure_valid_selection(&mut self.state, rows);
  }

  /// Row and page movement. Returns false for keys it does not use.
  pub fn handle_key(&mut self, key: KeyEvent, len: usize) -> bool {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.state.select_previous(),
      KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
        if self.pager.next(len) {
          self.state.select(Some(0));
        }
      }
      KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
        if self.pager.prev(len) {
          self.state.select(Some(0));
        }
      }
      KeyCode::Home => {
        self.pager.go_to(1, len);
        self.state.select(Some(0));
      }
      KeyCode::End => {
        self.pager.go_to(self.pager.page_count(len), len);
        self.state.select(Some(0));
      }
      _ => return false,
    }
    self.sync(len);
    true
  }

  /// "Page x of y" line under a table
  pub fn render_pager(&self, frame: &mut Frame, area: Rect, len: usize) {
    let page_count = self.pager.page_count(len);
    let range = self.pager.range(len);
    let shown = if len == 0 {
      "0".to_string()
    } else {
      format!("{}-{}", range.start + 1, range.end)
    };

    let line = Line::from(vec![
      Span::styled(
        format!(" Page {} of {} ", self.pager.page(), page_count),
        Style::default().fg(Color::Cyan),
      ),
      Span::styled(
        format!(" showing {} of {} ", shown, len),
        Style::default().fg(Color::DarkGray),
      ),
      Span::styled("  <n/p> page", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn press(table: &mut PagedTable, code: KeyCode, len: usize) -> bool {
    table.handle_key(KeyEvent::new(code, KeyModifiers::NONE), len)
  }

  #[test]
  fn test_selection_maps_to_full_list() {
    let mut table = PagedTable::new(10);
    table.sync(25);
    assert_eq!(table.selected(25), Some(0));

    press(&mut table, KeyCode::Char('n'), 25);
    press(&mut table, KeyCode::Down, 25);
    assert_eq!(table.pager().page(), 2);
    assert_eq!(table.selected(25), Some(11));

    press(&mut table, KeyCode::End, 25);
    assert_eq!(table.pager().page(), 3);
    assert_eq!(table.selected(25), Some(20));
  }

  #[test]
  fn test_next_on_last_page_is_ignored() {
    let mut table = PagedTable::new(10);
    table.sync(5);
    press(&mut table, KeyCode::Char('n'), 5);
    assert_eq!(table.pager().page(), 1);
    assert!(!press(&mut table, KeyCode::Char('x'), 5));
  }

  #[test]
  fn test_shrinking_list_clamps_page() {
    let mut table = PagedTable::new(10);
    table.sync(30);
    press(&mut table, KeyCode::End, 30);
    assert_eq!(table.pager().page(), 3);

    table.sync(12);
    assert_eq!(table.pager().page(), 2);
    assert_eq!(table.selected(12), Some(10));

    table.sync(0);
    assert_eq!(table.selected(0), None);
  }
}
