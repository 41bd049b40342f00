use super::{render_placeholder, titled_block, FormView};
use crate::api::profile;
use crate::api::types::{DataEnvelope, Profile};
use crate::form::screens::{ChangePasswordForm, ProfileForm};
use crate::form::Route;
use crate::query::{QueryHandle, QueryState};
use crate::ui::components::field_line;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Signed-in admin's profile
pub struct ProfileView {
  ctx: Context,
  profile: QueryHandle<DataEnvelope<Profile>>,
}

impl ProfileView {
  pub fn new(ctx: Context) -> Self {
    let profile = ctx.api.query(&profile::GET, &());
    Self { ctx, profile }
  }
}

impl View for ProfileView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('e') => {
        if let Some(data) = self.profile.data() {
          let current = &data.0;
          let form = ProfileForm::new(&current.full_name, current.phone.as_deref().unwrap_or(""));
          return ViewAction::Push(Box::new(FormView::new(
            self.ctx.clone(),
            "Edit profile",
            form,
          )));
        }
      }
      KeyCode::Char('p') => {
        return ViewAction::Push(Box::new(
          FormView::new(self.ctx.clone(), "Change password", ChangePasswordForm::default())
            .with_hint("Passwords must be 8 to 10 characters long."),
        ));
      }
      KeyCode::Char('r') => self.profile.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.profile.state();
    let block = titled_block("Profile", &state, None);

    let QueryState::Success(data) = &state else {
      render_placeholder(frame, area, block, &state, "");
      return;
    };
    let profile = &data.0;
    let picture = profile
      .profile_pic
      .as_deref()
      .map(|p| self.ctx.config.image_url(p))
      .unwrap_or_else(|| "-".to_string());

    let lines = vec![
      Line::raw(""),
      field_line("Name", profile.full_name.clone()),
      field_line("Email", profile.email.clone()),
      field_line("Phone", profile.phone.clone().unwrap_or_else(|| "-".to_string())),
      field_line("Picture", picture),
      Line::raw(""),
      Line::styled(
        "e edit profile   p change password",
        Style::default().fg(Color::DarkGray),
      ),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Profile".to_string()
  }

  fn route(&self) -> Option<Route> {
    Some(Route::Profile)
  }

  fn tick(&mut self) -> ViewAction {
    self.profile.poll();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("e", "edit").with_priority(20),
      Shortcut::new("p", "password").with_priority(30),
    ]
  }
}
