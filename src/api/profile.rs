//! The signed-in admin's own account.

use serde::Serialize;
use serde_json::json;

use super::endpoint::{Domain, EndpointDef};
use super::types::{DataEnvelope, MessageResponse, Profile};
use super::{ApiRequest, Endpoint, MultipartForm};
use crate::cache::Tag;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordChange {
  pub old_password: String,
  pub new_password: String,
}

pub const GET: Endpoint<(), DataEnvelope<Profile>> =
  Endpoint::query("profile/get", Domain::Profile, &[Tag::Profile], |_| {
    ApiRequest::get("/auth/get_user_profile/")
  });

/// Multipart: `full_name`, optional `phone` and `profile_pic`
pub const UPDATE: Endpoint<MultipartForm, MessageResponse> =
  Endpoint::mutation("profile/update", Domain::Profile, &[Tag::Profile], |form: &MultipartForm| {
    ApiRequest::patch("/auth/update_user_profile/").multipart(form.clone())
  });

pub const UPDATE_PASSWORD: Endpoint<PasswordChange, MessageResponse> = Endpoint::mutation(
  "profile/update-password",
  Domain::Profile,
  &[],
  |change: &PasswordChange| {
    ApiRequest::post("/auth/update_password/").json(json!({
      "old_password": change.old_password,
      "new_password": change.new_password,
    }))
  },
);

pub const ENDPOINTS: [EndpointDef; 3] = [GET.def, UPDATE.def, UPDATE_PASSWORD.def];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use crate::api::Body;
  use reqwest::Method;

  #[test]
  fn test_update_is_patch() {
    let request = UPDATE.request(&MultipartForm::new());
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/auth/update_user_profile/");
  }

  #[tokio::test]
  async fn test_update_refreshes_held_profile() {
    let transport = MockTransport::new();
    transport.on(
      Method::GET,
      "/auth/get_user_profile/",
      200,
      json!({"full_name": "Old Name", "email": "admin@ms.org"}),
    );
    transport.on(
      Method::GET,
      "/auth/get_user_profile/",
      200,
      json!({"full_name": "Asha", "email": "admin@ms.org"}),
    );
    transport.on(
      Method::PATCH,
      "/auth/update_user_profile/",
      200,
      json!({"message": "Profile updated"}),
    );
    let api = api_with(transport.clone());

    let mut profile = api.query(&GET, &());
    let before = profile.settled().await;
    assert_eq!(before.data().map(|p| p.0.full_name.as_str()), Some("Old Name"));

    let form = MultipartForm::new().text("full_name", "Asha");
    api.mutate(&UPDATE, &form).await.unwrap();

    let patch = transport
      .requests()
      .into_iter()
      .find(|r| r.method == Method::PATCH)
      .unwrap();
    match patch.body {
      Some(Body::Multipart(sent)) => {
        assert_eq!(sent.get_text("full_name"), Some("Asha"));
        assert!(!sent.has_part("profile_pic"));
        assert!(!sent.has_part("image"));
      }
      other => panic!("expected multipart body, got {:?}", other),
    }

    let after = profile.settled().await;
    assert_eq!(after.data().map(|p| p.0.full_name.as_str()), Some("Asha"));
    assert_eq!(transport.count(Method::GET, "/auth/get_user_profile/"), 2);
  }
}
