//! Forms behind each editing screen.

use async_trait::async_trait;

use super::{rules, Ack, ErrorMap, Field, Form, ImageField, OtpInput, Route};
use crate::api::auth::{self, Credentials, OtpCheck, PasswordReset};
use crate::api::profile::{self, PasswordChange};
use crate::api::series::{self, SeriesPayload};
use crate::api::settings::{self, DocumentUpdate, LegalDoc};
use crate::api::subscriptions::{self, PlanPayload};
use crate::api::types::{Id, MessageResponse};
use crate::api::{posts, stories, Api, HttpError, MultipartForm};

fn put(errors: &mut ErrorMap, field: &'static str, error: Option<String>) {
  if let Some(e) = error {
    errors.insert(field, e);
  }
}

fn ack(response: &MessageResponse, fallback: &str, next: Route) -> Ack {
  Ack::new(response.message_or(fallback), next)
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignInForm {
  pub email: String,
  pub password: String,
}

#[async_trait]
impl Form for SignInForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::text("email", "Email"),
      Field::secret("password", "Password"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "email" => self.email.clone(),
      "password" => self.password.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    match field {
      "email" => self.email = value.to_string(),
      "password" => self.password = value.to_string(),
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(&mut errors, "email", rules::email(&self.email));
    put(&mut errors, "password", rules::required(&self.password, "Password"));
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let credentials = Credentials {
      email: self.email.trim().to_string(),
      password: self.password.clone(),
    };
    let tokens = api.client().tokens().clone();

    let response = api
      .mutate_then(&auth::LOGIN, &credentials, |response| {
        tokens
          .set_token(&response.access)
          .map_err(|e| HttpError::Storage(e.to_string()))
      })
      .await?;

    let message = response
      .message
      .filter(|m| !m.trim().is_empty())
      .unwrap_or_else(|| "Login successful!".to_string());
    Ok(Ack::new(message, Route::Dashboard))
  }

  fn reset(&mut self) {
    *self = Self::default();
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForgotPasswordForm {
  pub email: String,
}

#[async_trait]
impl Form for ForgotPasswordForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[Field::text("email", "Email")];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "email" => self.email.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    if field == "email" {
      self.email = value.to_string();
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(&mut errors, "email", rules::email(&self.email));
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let email = self.email.trim().to_string();
    let response = api.mutate(&auth::FORGOT_PASSWORD, email.as_str()).await?;
    Ok(ack(
      &response,
      "Email sent successfully!",
      Route::VerifyOtp { email },
    ))
  }

  fn reset(&mut self) {
    *self = Self::default();
  }
}

/// Code check for the address a reset email went to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyOtpForm {
  pub email: String,
  pub otp: OtpInput,
}

impl VerifyOtpForm {
  pub fn new(email: impl Into<String>) -> Self {
    Self {
      email: email.into(),
      otp: OtpInput::new(),
    }
  }
}

#[async_trait]
impl Form for VerifyOtpForm {
  /// Edited through the OTP boxes, not text fields
  fn fields(&self) -> &'static [Field] {
    &[]
  }

  fn value(&self, field: &str) -> String {
    match field {
      "otp" => self.otp.value(),
      "email" => self.email.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    match field {
      "otp" => {
        self.otp.paste(value);
      }
      "email" => self.email = value.to_string(),
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if !self.otp.is_complete() {
      errors.insert("otp", "Please enter the complete 6-digit code".to_string());
    }
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let check = OtpCheck {
      email: self.email.clone(),
      otp: self.otp.value(),
    };
    let response = api.mutate(&auth::VERIFY_EMAIL, &check).await?;
    Ok(ack(
      &response,
      "Email verified successfully!",
      Route::ResetPassword {
        email: self.email.clone(),
      },
    ))
  }

  fn reset(&mut self) {
    self.otp.clear();
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetPasswordForm {
  pub email: String,
  pub password: String,
  pub confirm_password: String,
}

impl ResetPasswordForm {
  pub fn new(email: impl Into<String>) -> Self {
    Self {
      email: email.into(),
      ..Self::default()
    }
  }
}

#[async_trait]
impl Form for ResetPasswordForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::secret("password", "New password"),
      Field::secret("confirm_password", "Confirm password"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "password" => self.password.clone(),
      "confirm_password" => self.confirm_password.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    match field {
      "password" => self.password = value.to_string(),
      "confirm_password" => self.confirm_password = value.to_string(),
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(&mut errors, "password", rules::password(&self.password));
    if !errors.contains_key("password") {
      put(
        &mut errors,
        "confirm_password",
        rules::confirmation(&self.password, &self.confirm_password),
      );
    }
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let reset = PasswordReset {
      email: self.email.clone(),
      new_password: self.password.clone(),
    };
    let response = api.mutate(&auth::RESET_PASSWORD, &reset).await?;
    Ok(ack(&response, "Password updated successfully!", Route::SignIn))
  }

  fn reset(&mut self) {
    self.password.clear();
    self.confirm_password.clear();
  }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
  MsPost,
  Story,
}

impl ContentKind {
  pub fn noun(self) -> &'static str {
    match self {
      ContentKind::MsPost => "Post",
      ContentKind::Story => "Story",
    }
  }

  fn route(self) -> Route {
    match self {
      ContentKind::MsPost => Route::Posts,
      ContentKind::Story => Route::Stories,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ContentValues {
  title: String,
  description: String,
}

/// Title, description and cover image of a post or story.
///
/// The image is required when creating and optional when editing: an edit
/// without a new file keeps the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentForm {
  kind: ContentKind,
  id: Option<Id>,
  initial: ContentValues,
  values: ContentValues,
  image: ImageField,
}

impl ContentForm {
  pub fn new_post() -> Self {
    Self {
      kind: ContentKind::MsPost,
      id: None,
      initial: ContentValues::default(),
      values: ContentValues::default(),
      image: ImageField::default(),
    }
  }

  pub fn edit(kind: ContentKind, id: Id, title: &str, description: &str) -> Self {
    let initial = ContentValues {
      title: title.to_string(),
      description: description.to_string(),
    };
    Self {
      kind,
      id: Some(id),
      values: initial.clone(),
      initial,
      image: ImageField::default(),
    }
  }

  pub fn kind(&self) -> ContentKind {
    self.kind
  }

  pub fn is_edit(&self) -> bool {
    self.id.is_some()
  }

  fn multipart(&self) -> MultipartForm {
    let form = MultipartForm::new()
      .text("title", self.values.title.trim())
      .text("description", self.values.description.trim());
    self.image.attach(form, "image")
  }
}

#[async_trait]
impl Form for ContentForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::text("title", "Title"),
      Field::multiline("description", "Description"),
      Field::image("image", "Image file"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "title" => self.values.title.clone(),
      "description" => self.values.description.clone(),
      "image" => self.image.path().to_string(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    match field {
      "title" => self.values.title = value.to_string(),
      "description" => self.values.description = value.to_string(),
      "image" => self.image.set_path(value),
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(&mut errors, "title", rules::title(&self.values.title));
    put(
      &mut errors,
      "description",
      rules::description(&self.values.description),
    );
    put(&mut errors, "image", self.image.error(self.id.is_none()));
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let form = self.multipart();
    let noun = self.kind.noun();

    let (response, verb) = match (self.kind, self.id) {
      (ContentKind::MsPost, None) => (api.mutate(&posts::CREATE, &form).await?, "created"),
      (ContentKind::MsPost, Some(id)) => (api.mutate(&posts::UPDATE, &(id, form)).await?, "updated"),
      (ContentKind::Story, Some(id)) => (
        api.mutate(&stories::UPDATE, &(id, form)).await?,
        "updated",
      ),
      (ContentKind::Story, None) => {
        return Err(HttpError::InvalidRequest(
          "stories are submitted from the app and cannot be created here".to_string(),
        ))
      }
    };

    Ok(ack(
      &response,
      &format!("{} {} successfully!", noun, verb),
      self.kind.route(),
    ))
  }

  fn reset(&mut self) {
    self.values = self.initial.clone();
    self.image.clear();
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SeriesValues {
  title: String,
  author_name: String,
  description: String,
  youtube_link: String,
}

/// Upload-series episode; sent as JSON with the link as `video_url`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesForm {
  id: Option<Id>,
  initial: SeriesValues,
  values: SeriesValues,
}

impl SeriesForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn edit(
    id: Id,
    title: &str,
    author_name: &str,
    description: &str,
    video_url: &str,
  ) -> Self {
    let initial = SeriesValues {
      title: title.to_string(),
      author_name: author_name.to_string(),
      description: description.to_string(),
      youtube_link: video_url.to_string(),
    };
    Self {
      id: Some(id),
      values: initial.clone(),
      initial,
    }
  }

  pub fn is_edit(&self) -> bool {
    self.id.is_some()
  }

  fn payload(&self) -> SeriesPayload {
    SeriesPayload {
      title: self.values.title.trim().to_string(),
      author_name: self.values.author_name.trim().to_string(),
      description: self.values.description.trim().to_string(),
      video_url: self.values.youtube_link.trim().to_string(),
    }
  }
}

#[async_trait]
impl Form for SeriesForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::text("title", "Title"),
      Field::text("author_name", "Author"),
      Field::multiline("description", "Description"),
      Field::text("youtube_link", "YouTube link"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "title" => self.values.title.clone(),
      "author_name" => self.values.author_name.clone(),
      "description" => self.values.description.clone(),
      "youtube_link" => self.values.youtube_link.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    let value = value.to_string();
    match field {
      "title" => self.values.title = value,
      "author_name" => self.values.author_name = value,
      "description" => self.values.description = value,
      "youtube_link" => self.values.youtube_link = value,
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(&mut errors, "title", rules::title(&self.values.title));
    put(
      &mut errors,
      "description",
      rules::description(&self.values.description),
    );
    put(
      &mut errors,
      "youtube_link",
      rules::youtube_url(&self.values.youtube_link),
    );
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let payload = self.payload();
    let response = match self.id {
      None => api.mutate(&series::CREATE, &payload).await?,
      Some(id) => api.mutate(&series::UPDATE, &(id, payload)).await?,
    };
    let fallback = if self.id.is_some() {
      "Episode updated successfully!"
    } else {
      "Episode created successfully!"
    };
    Ok(ack(&response, fallback, Route::Series))
  }

  fn reset(&mut self) {
    self.values = self.initial.clone();
  }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
struct ProfileValues {
  full_name: String,
  phone: String,
}

/// Name, phone and optional new avatar; sent as multipart PATCH
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
  initial: ProfileValues,
  values: ProfileValues,
  image: ImageField,
}

impl ProfileForm {
  pub fn new(full_name: &str, phone: &str) -> Self {
    let initial = ProfileValues {
      full_name: full_name.to_string(),
      phone: phone.to_string(),
    };
    Self {
      values: initial.clone(),
      initial,
      image: ImageField::default(),
    }
  }

  pub fn multipart(&self) -> MultipartForm {
    let mut form = MultipartForm::new().text("full_name", self.values.full_name.trim());
    let phone = self.values.phone.trim();
    if !phone.is_empty() {
      form = form.text("phone", phone);
    }
    self.image.attach(form, "profile_pic")
  }
}

#[async_trait]
impl Form for ProfileForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::text("full_name", "Full name"),
      Field::text("phone", "Phone"),
      Field::image("profile_pic", "Profile picture"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "full_name" => self.values.full_name.clone(),
      "phone" => self.values.phone.clone(),
      "profile_pic" => self.image.path().to_string(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    match field {
      "full_name" => self.values.full_name = value.to_string(),
      "phone" => self.values.phone = value.to_string(),
      "profile_pic" => self.image.set_path(value),
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(
      &mut errors,
      "full_name",
      rules::required(&self.values.full_name, "Full name"),
    );
    put(&mut errors, "profile_pic", self.image.error(false));
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let response = api.mutate(&profile::UPDATE, &self.multipart()).await?;
    Ok(ack(&response, "Profile updated successfully!", Route::Profile))
  }

  fn reset(&mut self) {
    self.values = self.initial.clone();
    self.image.clear();
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePasswordForm {
  pub old_password: String,
  pub new_password: String,
  pub confirm_password: String,
}

#[async_trait]
impl Form for ChangePasswordForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::secret("old_password", "Current password"),
      Field::secret("new_password", "New password"),
      Field::secret("confirm_password", "Confirm password"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "old_password" => self.old_password.clone(),
      "new_password" => self.new_password.clone(),
      "confirm_password" => self.confirm_password.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    let value = value.to_string();
    match field {
      "old_password" => self.old_password = value,
      "new_password" => self.new_password = value,
      "confirm_password" => self.confirm_password = value,
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(
      &mut errors,
      "old_password",
      rules::required(&self.old_password, "Current password"),
    );
    put(&mut errors, "new_password", rules::password(&self.new_password));
    if !errors.contains_key("new_password") {
      put(
        &mut errors,
        "confirm_password",
        rules::confirmation(&self.new_password, &self.confirm_password),
      );
    }
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let change = PasswordChange {
      old_password: self.old_password.clone(),
      new_password: self.new_password.clone(),
    };
    let response = api.mutate(&profile::UPDATE_PASSWORD, &change).await?;
    Ok(ack(&response, "Password changed successfully!", Route::Profile))
  }

  fn reset(&mut self) {
    *self = Self::default();
  }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LegalForm {
  doc: LegalDoc,
  initial: String,
  description: String,
}

impl LegalForm {
  pub fn new(doc: LegalDoc, current: &str) -> Self {
    Self {
      doc,
      initial: current.to_string(),
      description: current.to_string(),
    }
  }

  pub fn doc(&self) -> LegalDoc {
    self.doc
  }
}

#[async_trait]
impl Form for LegalForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[Field::multiline("description", "Content")];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "description" => self.description.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    if field == "description" {
      self.description = value.to_string();
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(
      &mut errors,
      "description",
      rules::required(&self.description, "Content"),
    );
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let update = DocumentUpdate {
      doc: self.doc,
      description: self.description.clone(),
    };
    let response = api.mutate(&settings::SET_DOCUMENT, &update).await?;
    Ok(ack(
      &response,
      &format!("{} updated successfully!", self.doc.title()),
      Route::Legal(self.doc),
    ))
  }

  fn reset(&mut self) {
    self.description = self.initial.clone();
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct PlanValues {
  name: String,
  amount: String,
  expiration: String,
  /// One feature per line
  features: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanForm {
  id: Option<Id>,
  initial: PlanValues,
  values: PlanValues,
}

impl PlanForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn edit(id: Id, name: &str, amount: f64, expiration: &str, features: &[String]) -> Self {
    let initial = PlanValues {
      name: name.to_string(),
      amount: amount.to_string(),
      expiration: expiration.to_string(),
      features: features.join("\n"),
    };
    Self {
      id: Some(id),
      values: initial.clone(),
      initial,
    }
  }

  pub fn is_edit(&self) -> bool {
    self.id.is_some()
  }

  /// Non-blank feature lines
  pub fn features(&self) -> Vec<String> {
    self
      .values
      .features
      .lines()
      .map(str::trim)
      .filter(|f| !f.is_empty())
      .map(str::to_string)
      .collect()
  }

  fn payload(&self) -> Result<PlanPayload, HttpError> {
    let amount = self
      .values
      .amount
      .trim()
      .trim_start_matches('$')
      .parse()
      .map_err(|_| HttpError::InvalidRequest(format!("invalid amount {:?}", self.values.amount)))?;
    Ok(PlanPayload {
      name: self.values.name.trim().to_string(),
      amount,
      expiration: self.values.expiration.trim().to_string(),
      features: self.features(),
    })
  }
}

#[async_trait]
impl Form for PlanForm {
  fn fields(&self) -> &'static [Field] {
    const FIELDS: &[Field] = &[
      Field::text("name", "Plan name"),
      Field::text("amount", "Amount"),
      Field::text("expiration", "Expiration"),
      Field::multiline("features", "Features (one per line)"),
    ];
    FIELDS
  }

  fn value(&self, field: &str) -> String {
    match field {
      "name" => self.values.name.clone(),
      "amount" => self.values.amount.clone(),
      "expiration" => self.values.expiration.clone(),
      "features" => self.values.features.clone(),
      _ => String::new(),
    }
  }

  fn set(&mut self, field: &str, value: &str) {
    let value = value.to_string();
    match field {
      "name" => self.values.name = value,
      "amount" => self.values.amount = value,
      "expiration" => self.values.expiration = value,
      "features" => self.values.features = value,
      _ => {}
    }
  }

  fn validate(&self) -> ErrorMap {
    let mut errors = ErrorMap::new();
    put(&mut errors, "name", rules::required(&self.values.name, "Plan name"));
    put(&mut errors, "amount", rules::positive_amount(&self.values.amount));
    put(
      &mut errors,
      "expiration",
      rules::required(&self.values.expiration, "Expiration"),
    );
    if self.features().is_empty() {
      errors.insert("features", "Add at least one feature".to_string());
    }
    errors
  }

  async fn send(&self, api: &Api) -> Result<Ack, HttpError> {
    let payload = self.payload()?;
    let (response, fallback) = match self.id {
      None => (
        api.mutate(&subscriptions::CREATE, &payload).await?,
        "Plan created successfully!",
      ),
      Some(id) => (
        api.mutate(&subscriptions::UPDATE, &(id, payload)).await?,
        "Plan updated successfully!",
      ),
    };
    Ok(ack(&response, fallback, Route::Plans))
  }

  fn reset(&mut self) {
    self.values = self.initial.clone();
  }
}
