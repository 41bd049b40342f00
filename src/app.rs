use crate::api::{profile, HttpError};
use crate::api::types::{DataEnvelope, Profile};
use crate::commands::{self, Action};
use crate::event::{Event, EventHandler};
use crate::form::Route;
use crate::query::QueryHandle;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, Toast};
use crate::ui::view::{Notice, ShortcutInfo, View, ViewAction};
use crate::ui::views::{is_public, view_for};
use crate::ui::{self, Context};
use color_eyre::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  ctx: Context,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command palette
  command: CommandInput,

  /// Transient message in the footer
  toast: Option<Toast>,

  /// Signed-in admin, for the header
  user: Option<QueryHandle<DataEnvelope<Profile>>>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(ctx: Context) -> Self {
    let mut app = Self {
      ctx,
      view_stack: Vec::new(),
      command: CommandInput::new(),
      toast: None,
      user: None,
      should_quit: false,
    };
    let root = if app.ctx.api.is_signed_in() {
      Route::Dashboard
    } else {
      Route::SignIn
    };
    app.navigate(root);
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(DisableBracketedPaste)?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Paste(text) => {
        if self.command.is_active() {
          return;
        }
        let action = match self.view_stack.last_mut() {
          Some(view) => view.handle_paste(&text),
          None => ViewAction::None,
        };
        self.apply(action);
      }
      Event::Tick => self.tick(Instant::now()),
      Event::Resize => {}
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // Text-entry views get ':' as a character
    let captures = self
      .view_stack
      .last()
      .is_some_and(|view| view.captures_text());
    if self.command.is_active() || !captures {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(name)) => {
          self.run_command(&name);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn run_command(&mut self, name: &str) {
    match commands::action(name) {
      Some(Action::Open(route)) => self.navigate(route),
      Some(Action::Logout) => self.logout(),
      Some(Action::Quit) => self.should_quit = true,
      None if name.is_empty() => {}
      None => self.notify(Notice::error(format!("Unknown command: {}", name))),
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        info!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Navigate(route) => self.navigate(route),
      ViewAction::Notify(notice) => self.notify(notice),
      ViewAction::Submitted(ack) => {
        self.notify(Notice::info(ack.message));
        self.navigate(ack.next);
      }
    }
  }

  /// Go to a screen.
  ///
  /// A screen already on the stack is revealed by popping what is above it;
  /// public screens stack on top of each other, every other screen becomes
  /// the new root. Signed-out users are sent to sign-in.
  fn navigate(&mut self, route: Route) {
    if route == Route::Back {
      if self.view_stack.len() > 1 {
        self.view_stack.pop();
      }
      return;
    }

    if route == Route::SignIn {
      self.user = None;
      self.replace_stack(&route);
      return;
    }

    let public = is_public(&route);
    if !public && !self.ctx.api.is_signed_in() {
      warn!(?route, "navigation requires a session");
      self.notify(Notice::error("Please sign in first"));
      self.navigate(Route::SignIn);
      return;
    }

    if let Some(idx) = self
      .view_stack
      .iter()
      .rposition(|view| view.route().as_ref() == Some(&route))
    {
      info!(?route, "reveal view");
      self.view_stack.truncate(idx + 1);
    } else if public {
      if let Some(view) = view_for(&self.ctx, &route) {
        info!(?route, "push view");
        self.view_stack.push(view);
      }
    } else {
      self.replace_stack(&route);
    }

    if !public && self.user.is_none() {
      self.user = Some(self.ctx.api.query(&profile::GET, &()));
    }
  }

  fn replace_stack(&mut self, route: &Route) {
    if let Some(view) = view_for(&self.ctx, route) {
      info!(?route, "open view");
      self.view_stack.clear();
      self.view_stack.push(view);
    }
  }

  fn logout(&mut self) {
    match self.ctx.api.sign_out() {
      Ok(()) => {
        info!("signed out");
        self.navigate(Route::SignIn);
        self.notify(Notice::info("Logged out"));
      }
      Err(e) => {
        warn!(error = %e, "sign out failed");
        self.notify(Notice::error(format!("Could not sign out: {}", e)));
      }
    }
  }

  fn notify(&mut self, notice: Notice) {
    self.toast = Some(Toast::new(notice, Instant::now()));
  }

  fn tick(&mut self, now: Instant) {
    if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
      self.toast = None;
    }

    if let Some(user) = self.user.as_mut() {
      user.poll();
      // Stored token rejected: no refresh, start over at sign-in
      if user.state().error().is_some_and(HttpError::is_unauthorized) {
        warn!("session rejected by the server");
        if let Err(e) = self.ctx.api.sign_out() {
          warn!(error = %e, "failed to clear the stored token");
        }
        self.navigate(Route::SignIn);
        self.notify(Notice::error("Session expired, please sign in again"));
        return;
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.tick(),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> &str {
    self.ctx.config.title()
  }

  pub fn api_url(&self) -> &str {
    &self.ctx.config.api.base_url
  }

  pub fn user_name(&self) -> Option<String> {
    self
      .user
      .as_ref()
      .and_then(|u| u.data())
      .map(|p| p.0.full_name.clone())
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.command.is_active() {
      return vec![
        ShortcutInfo::new("Enter", "run").with_priority(10),
        ShortcutInfo::new("Tab", "next").with_priority(20),
        ShortcutInfo::new("Esc", "close").with_priority(30),
      ];
    }
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn toast(&self) -> Option<&Notice> {
    self.toast.as_ref().map(Toast::notice)
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }
}
