//! One list screen for every content resource: MS posts, user stories and
//! the upload series. The section decides which endpoints back it and which
//! actions it offers; browsing, detail and delete work the same for all.

use super::{
  detail_body, header_style, highlight, render_placeholder, titled_block, FormView, DELETE_BUSY,
};
use crate::api::types::{DataEnvelope, Id, MessageResponse, MsPost, SeriesVideo, Story};
use crate::api::{posts, series, stories};
use crate::form::screens::{ContentForm, ContentKind, SeriesForm};
use crate::form::Route;
use crate::query::{QueryHandle, QueryState};
use crate::ui::components::{
  draw_modal, field_line, ConfirmDialog, ConfirmEvent, KeyResult, PagedTable,
};
use crate::ui::renderfns::{format_date, strip_html, truncate};
use crate::ui::task::Task;
use crate::ui::view::{Notice, Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Row, Table};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSection {
  Posts,
  Stories,
  Series,
}

impl ContentSection {
  pub fn title(self) -> &'static str {
    match self {
      ContentSection::Posts => "MS Posts",
      ContentSection::Stories => "User Stories",
      ContentSection::Series => "Upload Series",
    }
  }

  fn noun(self) -> &'static str {
    match self {
      ContentSection::Posts => "Post",
      ContentSection::Stories => "Story",
      ContentSection::Series => "Video",
    }
  }

  pub fn route(self) -> Route {
    match self {
      ContentSection::Posts => Route::Posts,
      ContentSection::Stories => Route::Stories,
      ContentSection::Series => Route::Series,
    }
  }

  /// Stories are written by app users; admins only moderate them
  fn can_create(self) -> bool {
    self != ContentSection::Stories
  }
}

/// A content item flattened for display
#[derive(Debug, Clone, PartialEq)]
struct Item {
  id: Id,
  title: String,
  description: String,
  author: Option<String>,
  image: Option<String>,
  video_url: Option<String>,
  created_at: Option<String>,
}

impl From<&MsPost> for Item {
  fn from(post: &MsPost) -> Self {
    Self {
      id: post.id,
      title: post.title.clone(),
      description: post.description.clone(),
      author: None,
      image: post.image.clone(),
      video_url: None,
      created_at: post.created_at.clone(),
    }
  }
}

impl From<&Story> for Item {
  fn from(story: &Story) -> Self {
    Self {
      id: story.id,
      title: story.title.clone(),
      description: story.description.clone(),
      author: None,
      image: story.image.clone(),
      video_url: None,
      created_at: story.created_at.clone(),
    }
  }
}

impl From<&SeriesVideo> for Item {
  fn from(video: &SeriesVideo) -> Self {
    Self {
      id: video.id,
      title: video.title.clone(),
      description: video.description.clone(),
      author: video.author_name.clone(),
      image: None,
      video_url: video.video_url.clone(),
      created_at: None,
    }
  }
}

fn convert<T, U>(state: QueryState<Arc<T>>, f: impl FnOnce(&T) -> U) -> QueryState<U> {
  match state {
    QueryState::Idle => QueryState::Idle,
    QueryState::Loading => QueryState::Loading,
    QueryState::Success(data) => QueryState::Success(f(&data)),
    QueryState::Error(e) => QueryState::Error(e),
  }
}

enum Listing {
  Posts(QueryHandle<Vec<MsPost>>),
  Stories(QueryHandle<Vec<Story>>),
  Series(QueryHandle<DataEnvelope<Vec<SeriesVideo>>>),
}

impl Listing {
  fn new(ctx: &Context, section: ContentSection) -> Self {
    match section {
      ContentSection::Posts => Listing::Posts(ctx.api.query(&posts::LIST, &())),
      ContentSection::Stories => Listing::Stories(ctx.api.query(&stories::LIST, &())),
      ContentSection::Series => Listing::Series(ctx.api.query(&series::LIST, &())),
    }
  }

  fn items(&self) -> QueryState<Vec<Item>> {
    match self {
      Listing::Posts(h) => convert(h.state(), |v| v.iter().map(Item::from).collect()),
      Listing::Stories(h) => convert(h.state(), |v| v.iter().map(Item::from).collect()),
      Listing::Series(h) => convert(h.state(), |v| v.0.iter().map(Item::from).collect()),
    }
  }

  fn poll(&mut self) {
    match self {
      Listing::Posts(h) => h.poll(),
      Listing::Stories(h) => h.poll(),
      Listing::Series(h) => h.poll(),
    };
  }

  fn refetch(&self) {
    match self {
      Listing::Posts(h) => h.refetch(),
      Listing::Stories(h) => h.refetch(),
      Listing::Series(h) => h.refetch(),
    }
  }
}

enum Detail {
  Post(QueryHandle<MsPost>),
  Story(QueryHandle<DataEnvelope<Story>>),
  Series(QueryHandle<DataEnvelope<SeriesVideo>>),
}

impl Detail {
  fn new(ctx: &Context, section: ContentSection, id: Id) -> Self {
    match section {
      ContentSection::Posts => Detail::Post(ctx.api.query(&posts::GET, &id)),
      ContentSection::Stories => Detail::Story(ctx.api.query(&stories::GET, &id)),
      ContentSection::Series => Detail::Series(ctx.api.query(&series::GET, &id)),
    }
  }

  fn item(&self) -> QueryState<Arc<Item>> {
    match self {
      Detail::Post(h) => convert(h.state(), |p| Arc::new(Item::from(p))),
      Detail::Story(h) => convert(h.state(), |s| Arc::new(Item::from(&s.0))),
      Detail::Series(h) => convert(h.state(), |v| Arc::new(Item::from(&v.0))),
    }
  }

  fn poll(&mut self) {
    match self {
      Detail::Post(h) => h.poll(),
      Detail::Story(h) => h.poll(),
      Detail::Series(h) => h.poll(),
    };
  }
}

/// Paginated content table with detail, edit and delete
pub struct ContentListView {
  ctx: Context,
  section: ContentSection,
  listing: Listing,
  table: PagedTable,
  detail: Option<Detail>,
  confirm: ConfirmDialog<Item>,
  deleting: Task<MessageResponse>,
}

impl ContentListView {
  pub fn new(ctx: Context, section: ContentSection) -> Self {
    let listing = Listing::new(&ctx, section);
    let table = PagedTable::new(ctx.page_size());
    Self {
      ctx,
      section,
      listing,
      table,
      detail: None,
      confirm: ConfirmDialog::new(),
      deleting: Task::new(),
    }
  }

  fn selected_item(&self) -> Option<Item> {
    match self.listing.items() {
      QueryState::Success(items) => {
        let idx = self.table.selected(items.len())?;
        items.into_iter().nth(idx)
      }
      _ => None,
    }
  }

  fn len(&self) -> usize {
    match self.listing.items() {
      QueryState::Success(items) => items.len(),
      _ => 0,
    }
  }

  fn create_form(&self) -> Option<Box<dyn View>> {
    let ctx = self.ctx.clone();
    match self.section {
      ContentSection::Posts => Some(Box::new(FormView::new(
        ctx,
        "New post",
        ContentForm::new_post(),
      ))),
      ContentSection::Series => Some(Box::new(FormView::new(ctx, "New video", SeriesForm::new()))),
      ContentSection::Stories => None,
    }
  }

  fn edit_form(&self, item: &Item) -> Box<dyn View> {
    let ctx = self.ctx.clone();
    match self.section {
      ContentSection::Posts => Box::new(FormView::new(
        ctx,
        "Edit post",
        ContentForm::edit(ContentKind::MsPost, item.id, &item.title, &item.description),
      )),
      ContentSection::Stories => Box::new(FormView::new(
        ctx,
        "Edit story",
        ContentForm::edit(ContentKind::Story, item.id, &item.title, &item.description),
      )),
      ContentSection::Series => Box::new(FormView::new(
        ctx,
        "Edit video",
        SeriesForm::edit(
          item.id,
          &item.title,
          item.author.as_deref().unwrap_or(""),
          &item.description,
          item.video_url.as_deref().unwrap_or(""),
        ),
      )),
    }
  }

  fn delete(&mut self, item: Item) -> ViewAction {
    let api = self.ctx.api.clone();
    let section = self.section;
    let id = item.id;
    let started = self.deleting.spawn(async move {
      match section {
        ContentSection::Posts => api.mutate(&posts::DELETE, &id).await,
        ContentSection::Stories => api.mutate(&stories::DELETE, &id).await,
        ContentSection::Series => api.mutate(&series::DELETE, &id).await,
      }
    });
    if !started {
      return ViewAction::Notify(Notice::error(DELETE_BUSY));
    }
    info!(section = ?section, id, "deleting content");
    ViewAction::None
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.listing.items();
    let items: &[Item] = match &state {
      QueryState::Success(items) => items,
      _ => &[],
    };
    let name = if self.deleting.is_running() {
      format!("{} (deleting...)", self.section.title())
    } else {
      self.section.title().to_string()
    };
    let block = titled_block(&name, &state, Some(items.len()));

    if items.is_empty() {
      let empty = format!("No {} yet.", self.section.title().to_lowercase());
      render_placeholder(frame, area, block, &state, &empty);
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(area);

    self.table.sync(items.len());
    let series = self.section == ContentSection::Series;
    let rows: Vec<Row> = self
      .table
      .pager()
      .window(items)
      .iter()
      .map(|item| {
        let extra = if series {
          item.author.clone().unwrap_or_default()
        } else {
          item.created_at.as_deref().map(format_date).unwrap_or_default()
        };
        Row::new(vec![
          Span::styled(format!("{}", item.id), Style::default().fg(Color::DarkGray)),
          Span::styled(truncate(&item.title, 40), Style::default().fg(Color::Cyan)),
          Span::raw(truncate(&strip_html(&item.description).replace('\n', " "), 60)),
          Span::styled(extra, Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect();

    let last = if series { "Author" } else { "Created" };
    let table = Table::new(
      rows,
      [
        Constraint::Length(6),
        Constraint::Length(42),
        Constraint::Min(20),
        Constraint::Length(18),
      ],
    )
    .header(Row::new(vec!["ID", "Title", "Description", last]).style(header_style()))
    .block(block)
    .row_highlight_style(highlight())
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, chunks[0], self.table.state_mut());
    self.table.render_pager(frame, chunks[1], items.len());
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let Some(detail) = &self.detail else {
      return;
    };
    let config = self.ctx.config.clone();
    let body = detail_body(&detail.item(), |item| {
      let mut lines = vec![field_line("Title", item.title.clone())];
      if let Some(author) = &item.author {
        lines.push(field_line("Author", author.clone()));
      }
      if let Some(created) = &item.created_at {
        lines.push(field_line("Created", format_date(created)));
      }
      if let Some(image) = &item.image {
        lines.push(field_line("Image", config.image_url(image)));
      }
      if let Some(url) = &item.video_url {
        lines.push(field_line("Video", url.clone()));
      }
      lines.push(Line::raw(""));
      lines.extend(strip_html(&item.description).lines().map(|l| Line::raw(l.to_string())));
      lines
    });
    draw_modal(frame, area, self.section.noun(), body);
  }
}

impl View for ContentListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(item)) => return self.delete(item),
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    if self.detail.is_some() {
      if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
        self.detail = None;
      }
      return ViewAction::None;
    }

    if self.table.handle_key(key, self.len()) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter => {
        if let Some(item) = self.selected_item() {
          self.detail = Some(Detail::new(&self.ctx, self.section, item.id));
        }
      }
      KeyCode::Char('a') => {
        if let Some(view) = self.create_form() {
          return ViewAction::Push(view);
        }
      }
      KeyCode::Char('e') => {
        if let Some(item) = self.selected_item() {
          return ViewAction::Push(self.edit_form(&item));
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if self.deleting.is_running() {
          return ViewAction::Notify(Notice::error(DELETE_BUSY));
        }
        if let Some(item) = self.selected_item() {
          let message = format!(
            "Delete {} \"{}\"? This cannot be undone.",
            self.section.noun().to_lowercase(),
            truncate(&item.title, 40)
          );
          self.confirm.show(format!("Delete {}", self.section.noun()), message, item);
        }
      }
      KeyCode::Char('r') => self.listing.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_table(frame, area);
    self.render_detail(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.section.title().to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(self.section.route())
  }

  fn tick(&mut self) -> ViewAction {
    self.listing.poll();
    if let Some(detail) = self.detail.as_mut() {
      detail.poll();
    }
    match self.deleting.poll() {
      Some(Ok(response)) => ViewAction::Notify(Notice::info(
        response.message_or(&format!("{} deleted successfully!", self.section.noun())),
      )),
      Some(Err(e)) => ViewAction::Notify(Notice::error(e.to_string())),
      None => ViewAction::None,
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    let mut shortcuts = vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("Enter", "view").with_priority(20),
      Shortcut::new("e", "edit").with_priority(30),
      Shortcut::new("d", "delete").with_priority(40),
      Shortcut::new("n/p", "page").with_priority(60),
    ];
    if self.section.can_create() {
      shortcuts.push(Shortcut::new("a", "add").with_priority(25));
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
  use crossterm::event::KeyModifiers;
  use reqwest::Method;
  use serde_json::json;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn post(id: u64, title: &str) -> serde_json::Value {
    json!({"id": id, "title": title, "description": "<p>A description long enough</p>"})
  }

  async fn loaded(transport: Arc<MockTransport>, section: ContentSection) -> ContentListView {
    let ctx = Context::new(api_with(transport), Config::default());
    let mut view = ContentListView::new(ctx, section);
    tokio::time::sleep(Duration::from_millis(20)).await;
    view.tick();
    view.table.sync(view.len());
    view
  }

  #[tokio::test]
  async fn test_confirmed_delete_refetches_list() {
    let transport = MockTransport::new();
    transport.on(
      Method::GET,
      "/blogs/v1/ms-posts/",
      200,
      json!([post(1, "First"), post(2, "Second")]),
    );
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([post(2, "Second")]));
    transport.on_raw(Method::DELETE, "/blogs/v1/ms-posts/1/", 204, "");
    let mut view = loaded(transport.clone(), ContentSection::Posts).await;
    assert_eq!(view.len(), 2);

    view.handle_key(key(KeyCode::Char('d')));
    assert!(view.confirm.is_active());
    // Other keys are swallowed while the dialog is up
    view.handle_key(key(KeyCode::Down));
    assert_eq!(view.selected_item().map(|i| i.id), Some(1));

    view.handle_key(key(KeyCode::Char('y')));
    tokio::time::sleep(Duration::from_millis(50)).await;
    match view.tick() {
      ViewAction::Notify(notice) => assert_eq!(notice.message, "Post deleted successfully!"),
      other => panic!("expected notice, got {:?}", other),
    }
    assert_eq!(transport.count(Method::DELETE, "/blogs/v1/ms-posts/1/"), 1);
    assert_eq!(view.len(), 1);
  }

  #[tokio::test]
  async fn test_second_delete_while_running_is_reported() {
    let transport = MockTransport::new().with_delay(Duration::from_millis(40));
    transport.on(
      Method::GET,
      "/blogs/v1/ms-posts/",
      200,
      json!([post(1, "First"), post(2, "Second")]),
    );
    transport.on_raw(Method::DELETE, "/blogs/v1/ms-posts/1/", 204, "");
    let ctx = Context::new(api_with(transport.clone()), Config::default());
    let mut view = ContentListView::new(ctx, ContentSection::Posts);
    tokio::time::sleep(Duration::from_millis(80)).await;
    view.tick();
    view.table.sync(view.len());

    view.handle_key(key(KeyCode::Char('d')));
    view.handle_key(key(KeyCode::Char('y')));
    assert!(view.deleting.is_running());

    match view.handle_key(key(KeyCode::Char('d'))) {
      ViewAction::Notify(notice) => assert_eq!(notice.message, DELETE_BUSY),
      other => panic!("expected busy notice, got {:?}", other),
    }
    let second = view.selected_item().unwrap();
    assert!(matches!(view.delete(second), ViewAction::Notify(_)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(view.tick(), ViewAction::Notify(_)));
    assert_eq!(transport.count(Method::DELETE, "/blogs/v1/ms-posts/1/"), 1);
  }

  #[tokio::test]
  async fn test_cancelled_delete_sends_nothing() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([post(1, "First")]));
    let mut view = loaded(transport.clone(), ContentSection::Posts).await;

    view.handle_key(key(KeyCode::Char('d')));
    view.handle_key(key(KeyCode::Char('n')));
    assert!(!view.confirm.is_active());
    assert_eq!(transport.count(Method::DELETE, "/blogs/v1/ms-posts/1/"), 0);
  }

  #[tokio::test]
  async fn test_stories_cannot_be_created_but_can_be_edited() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/blogs/", 200, json!([post(7, "My journey")]));
    let mut view = loaded(transport, ContentSection::Stories).await;

    assert!(matches!(view.handle_key(key(KeyCode::Char('a'))), ViewAction::None));
    match view.handle_key(key(KeyCode::Char('e'))) {
      ViewAction::Push(form) => assert_eq!(form.breadcrumb_label(), "Edit story"),
      other => panic!("expected edit form, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_series_detail_accepts_wrapped_payload() {
    let transport = MockTransport::new();
    let video = json!({"id": 3, "title": "Episode 1", "author_name": "Dr. K",
      "description": "Living with MS, part one", "video_url": "https://youtu.be/x"});
    transport.on(Method::GET, "/blogs/v1/ms-videos/", 200, json!({"data": [video.clone()]}));
    transport.on(Method::GET, "/blogs/v1/ms-videos/3/", 200, json!({"data": video}));
    let mut view = loaded(transport, ContentSection::Series).await;

    view.handle_key(key(KeyCode::Enter));
    let Some(Detail::Series(handle)) = view.detail.as_mut() else {
      panic!("expected series detail");
    };
    let state = handle.settled().await;
    assert_eq!(
      state.data().and_then(|v| v.0.author_name.clone()),
      Some("Dr. K".to_string())
    );
  }
}
