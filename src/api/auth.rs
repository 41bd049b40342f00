//! Sign-in and password recovery.

use serde::Serialize;
use serde_json::json;

use super::endpoint::{Domain, EndpointDef};
use super::types::{LoginResponse, MessageResponse};
use super::{ApiRequest, Endpoint};
use crate::cache::Tag;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtpCheck {
  pub email: String,
  pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordReset {
  pub email: String,
  pub new_password: String,
}

/// A new session changes who the profile and user queries describe
pub const LOGIN: Endpoint<Credentials, LoginResponse> = Endpoint::mutation(
  "auth/login",
  Domain::Auth,
  &[Tag::Session, Tag::Profile, Tag::User],
  |c: &Credentials| {
    ApiRequest::post("/auth/login/").json(json!({"email": c.email, "password": c.password}))
  },
);

pub const FORGOT_PASSWORD: Endpoint<str, MessageResponse> =
  Endpoint::mutation("auth/forgot-password", Domain::Auth, &[], |email: &str| {
    ApiRequest::post("/auth/forgot-password/").json(json!({ "email": email }))
  });

pub const VERIFY_EMAIL: Endpoint<OtpCheck, MessageResponse> =
  Endpoint::mutation("auth/verify-email", Domain::Auth, &[], |c: &OtpCheck| {
    ApiRequest::post("/auth/verify-email/").json(json!({"email": c.email, "otp": c.otp}))
  });

pub const RESET_PASSWORD: Endpoint<PasswordReset, MessageResponse> =
  Endpoint::mutation("auth/reset-password", Domain::Auth, &[], |r: &PasswordReset| {
    ApiRequest::post("/auth/reset-password/")
      .json(json!({"email": r.email, "new_password": r.new_password}))
  });

pub const ENDPOINTS: [EndpointDef; 4] = [
  LOGIN.def,
  FORGOT_PASSWORD.def,
  VERIFY_EMAIL.def,
  RESET_PASSWORD.def,
];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::Body;
  use reqwest::Method;

  #[test]
  fn test_login_request() {
    let request = LOGIN.request(&Credentials {
      email: "admin@ms.org".to_string(),
      password: "secret123".to_string(),
    });
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/auth/login/");
    assert_eq!(
      request.body,
      Some(Body::Json(
        json!({"email": "admin@ms.org", "password": "secret123"})
      ))
    );
  }

  #[test]
  fn test_verify_sends_email_and_code() {
    let request = VERIFY_EMAIL.request(&OtpCheck {
      email: "a@b.co".to_string(),
      otp: "123456".to_string(),
    });
    assert_eq!(
      request.body,
      Some(Body::Json(json!({"email": "a@b.co", "otp": "123456"})))
    );
  }
}
