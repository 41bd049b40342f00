//! Dashboard totals and registered users.

use super::endpoint::{Domain, EndpointDef};
use super::types::{DashboardSummary, DataEnvelope, Id, UserSummary};
use super::{ApiRequest, Endpoint};
use crate::cache::Tag;

pub const DASHBOARD: Endpoint<(), DashboardSummary> =
  Endpoint::query("users/dashboard", Domain::Users, &[Tag::User], |_| {
    ApiRequest::get("/auth/dashboardView/")
  });

pub const GET: Endpoint<Id, DataEnvelope<UserSummary>> =
  Endpoint::query("users/get", Domain::Users, &[Tag::User], |id: &Id| {
    ApiRequest::get(format!("/auth/specific-user/{}/", id))
  });

pub const ENDPOINTS: [EndpointDef; 2] = [DASHBOARD.def, GET.def];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::testing::api_with;
  use reqwest::Method;
  use serde_json::json;

  #[tokio::test]
  async fn test_dashboard_decodes_totals_and_users() {
    let transport = MockTransport::new();
    transport.on(
      Method::GET,
      "/auth/dashboardView/",
      200,
      json!({
        "total_donations": "2500.00",
        "all_user_list": 2,
        "total_stories": 7,
        "user_list": [
          {"id": 1, "full_name": "Nadia", "email": "nadia@example.com"},
          {"id": "2", "full_name": "Omar", "email": "omar@example.com", "profile_pic": "/media/omar.png"}
        ]
      }),
    );
    let api = api_with(transport);

    let mut dashboard = api.query(&DASHBOARD, &());
    let summary = dashboard.settled().await.data().cloned().unwrap();
    assert_eq!(summary.total_donations, 2500.0);
    assert_eq!(summary.user_list.len(), 2);
    assert_eq!(summary.user_list[1].id, 2);
  }
}
