//! Form state, validation and submission.
//!
//! Every screen that writes to the backend is a [`Form`]: plain field values
//! plus a pure `validate` and an async `send`. [`FormController`] owns one
//! form together with its error map and runs the validate → send → reset
//! cycle, either awaited directly or spawned and polled from a view tick.

mod image;
mod otp;
pub mod rules;
pub mod screens;

pub use image::ImageField;
pub use otp::{OtpInput, OTP_LEN};

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::settings::LegalDoc;
use crate::api::{Api, HttpError};

/// Field name → message. Empty means valid.
pub type ErrorMap = BTreeMap<&'static str, String>;

/// Where the UI should go after a successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  SignIn,
  ForgotPassword,
  VerifyOtp { email: String },
  ResetPassword { email: String },
  Dashboard,
  Posts,
  Stories,
  Series,
  Donations,
  Profile,
  Plans,
  Legal(LegalDoc),
  /// Leave the form, back to whatever opened it
  Back,
}

/// Successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
  pub message: String,
  pub next: Route,
}

impl Ack {
  pub fn new(message: impl Into<String>, next: Route) -> Self {
    Self {
      message: message.into(),
      next,
    }
  }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
  #[error("please fix the highlighted fields")]
  Invalid(ErrorMap),

  #[error(transparent)]
  Http(#[from] HttpError),

  #[error("a submission is already in progress")]
  Busy,
}

/// How a field is edited in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  /// Masked input
  Secret,
  /// Long text; Enter inserts a line break
  Multiline,
  /// Path to a local image file
  Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
  pub name: &'static str,
  pub label: &'static str,
  pub kind: FieldKind,
}

impl Field {
  pub const fn text(name: &'static str, label: &'static str) -> Self {
    Self {
      name,
      label,
      kind: FieldKind::Text,
    }
  }

  pub const fn secret(name: &'static str, label: &'static str) -> Self {
    Self {
      name,
      label,
      kind: FieldKind::Secret,
    }
  }

  pub const fn multiline(name: &'static str, label: &'static str) -> Self {
    Self {
      name,
      label,
      kind: FieldKind::Multiline,
    }
  }

  pub const fn image(name: &'static str, label: &'static str) -> Self {
    Self {
      name,
      label,
      kind: FieldKind::Image,
    }
  }
}

/// One screen's editable state
#[async_trait]
pub trait Form: Clone + Send + Sync + 'static {
  /// Editable fields, in display order
  fn fields(&self) -> &'static [Field];

  /// Current value of a field as text
  fn value(&self, field: &str) -> String;

  /// Replace a field's value
  fn set(&mut self, field: &str, value: &str);

  /// Check every rule; pure
  fn validate(&self) -> ErrorMap;

  /// Build the payload and call the endpoint. Only called on valid state.
  async fn send(&self, api: &Api) -> Result<Ack, HttpError>;

  /// Back to initial values
  fn reset(&mut self);
}

/// A form plus its errors and in-flight submission
pub struct FormController<F: Form> {
  form: F,
  errors: ErrorMap,
  pending: Option<oneshot::Receiver<Result<Ack, HttpError>>>,
}

impl<F: Form> FormController<F> {
  pub fn new(form: F) -> Self {
    Self {
      form,
      errors: ErrorMap::new(),
      pending: None,
    }
  }

  pub fn form(&self) -> &F {
    &self.form
  }

  /// Mutable access for editors that own richer state (OTP boxes)
  pub fn form_mut(&mut self) -> &mut F {
    &mut self.form
  }

  pub fn error(&self, field: &str) -> Option<&str> {
    self.errors.get(field).map(String::as_str)
  }

  pub fn is_submitting(&self) -> bool {
    self.pending.is_some()
  }

  /// Set a field and clear its error
  pub fn set(&mut self, field: &str, value: &str) {
    self.form.set(field, value);
    self.touch(field);
  }

  /// Clear a field's error after the user edits it
  pub fn touch(&mut self, field: &str) {
    self.errors.remove(field);
  }

  fn check(&mut self) -> Result<(), SubmitError> {
    if self.pending.is_some() {
      return Err(SubmitError::Busy);
    }
    let errors = self.form.validate();
    if !errors.is_empty() {
      debug!(fields = ?errors.keys().collect::<Vec<_>>(), "validation failed");
      self.errors = errors.clone();
      return Err(SubmitError::Invalid(errors));
    }
    self.errors.clear();
    Ok(())
  }

  fn finish(&mut self, result: Result<Ack, HttpError>) -> Result<Ack, SubmitError> {
    match result {
      Ok(ack) => {
        info!(next = ?ack.next, "form submitted");
        self.form.reset();
        self.errors.clear();
        Ok(ack)
      }
      Err(e) => {
        warn!(error = %e, "form submit failed");
        Err(SubmitError::Http(e))
      }
    }
  }

  /// Validate and send, waiting for the response. Views use
  /// [`FormController::start`] so the UI keeps drawing.
  #[cfg(test)]
  pub async fn submit(&mut self, api: &Api) -> Result<Ack, SubmitError> {
    self.check()?;
    let result = self.form.send(api).await;
    self.finish(result)
  }

  /// Validate and send in the background; collect the result with
  /// [`FormController::poll`].
  pub fn start(&mut self, api: &Api) -> Result<(), SubmitError> {
    self.check()?;

    let (tx, rx) = oneshot::channel();
    let form = self.form.clone();
    let api = api.clone();
    tokio::spawn(async move {
      let result = form.send(&api).await;
      let _ = tx.send(result);
    });
    self.pending = Some(rx);
    Ok(())
  }

  /// Result of a background submit, once it has landed
  pub fn poll(&mut self) -> Option<Result<Ack, SubmitError>> {
    let rx = self.pending.as_mut()?;
    let result = match rx.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return None,
      Err(oneshot::error::TryRecvError::Closed) => Err(HttpError::Network(
        "submission task ended without a result".to_string(),
      )),
    };
    self.pending = None;
    Some(self.finish(result))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use reqwest::Method;
  use serde_json::json;
  use std::time::Duration;

  #[derive(Clone, Default)]
  struct NoteForm {
    text: String,
  }

  #[async_trait]
  impl Form for NoteForm {
    fn fields(&self) -> &'static [Field] {
      const FIELDS: &[Field] = &[Field::text("text", "Text")];
      FIELDS
    }

    fn value(&self, _field: &str) -> String {
      self.text.clone()
    }

    fn set(&mut self, _field: &str, value: &str) {
      self.text = value.to_string();
    }

    fn validate(&self) -> ErrorMap {
      let mut errors = ErrorMap::new();
      if let Some(e) = rules::required(&self.text, "Text") {
        errors.insert("text", e);
      }
      errors
    }

    async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
      let response = api
        .mutate(&crate::api::auth::FORGOT_PASSWORD, self.text.as_str())
        .await?;
      Ok(Ack::new(response.message_or("Sent"), Route::Back))
    }

    fn reset(&mut self) {
      self.text.clear();
    }
  }

  #[tokio::test]
  async fn test_invalid_form_is_not_sent() {
    let transport = MockTransport::new();
    let api = api_with(transport.clone());
    let mut controller = FormController::new(NoteForm::default());

    let err = controller.submit(&api).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(ref map) if map.contains_key("text")));
    assert_eq!(controller.error("text"), Some("Text is required"));
    assert!(transport.requests().is_empty());
  }

  #[tokio::test]
  async fn test_editing_clears_field_error() {
    let api = api_with(MockTransport::new());
    let mut controller = FormController::new(NoteForm::default());
    let _ = controller.submit(&api).await;

    controller.set("text", "hello");
    assert_eq!(controller.error("text"), None);
  }

  #[tokio::test]
  async fn test_success_resets_and_failure_keeps_state() {
    let transport = MockTransport::new();
    transport.on(
      Method::POST,
      "/auth/forgot-password/",
      500,
      json!({"message": "mail server down"}),
    );
    transport.on(Method::POST, "/auth/forgot-password/", 200, json!({}));
    let api = api_with(transport);
    let mut controller = FormController::new(NoteForm::default());
    controller.set("text", "a@b.co");

    let err = controller.submit(&api).await.unwrap_err();
    assert!(matches!(err, SubmitError::Http(HttpError::Status { status: 500, .. })));
    assert_eq!(controller.form().text, "a@b.co");

    let ack = controller.submit(&api).await.unwrap();
    assert_eq!(ack, Ack::new("Sent", Route::Back));
    assert_eq!(controller.form().text, "");
  }

  #[tokio::test]
  async fn test_background_submit_is_polled() {
    let transport = MockTransport::new().with_delay(Duration::from_millis(10));
    transport.on(Method::POST, "/auth/forgot-password/", 200, json!({"message": "ok"}));
    let api = api_with(transport);
    let mut controller = FormController::new(NoteForm::default());
    controller.set("text", "a@b.co");

    controller.start(&api).unwrap();
    assert!(controller.is_submitting());
    assert_eq!(controller.start(&api), Err(SubmitError::Busy));
    assert!(controller.poll().is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let ack = controller.poll().unwrap().unwrap();
    assert_eq!(ack.message, "ok");
    assert!(!controller.is_submitting());
  }
}
