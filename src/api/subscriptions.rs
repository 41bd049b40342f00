//! Subscription plans offered to app users.

use serde::Serialize;
use serde_json::json;

use super::endpoint::{Domain, EndpointDef};
use super::types::{DataEnvelope, Id, MessageResponse, SubscriptionPlan};
use super::{ApiRequest, Endpoint};
use crate::cache::Tag;

const ROOT: &str = "/subscription/plans/";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPayload {
  pub name: String,
  pub amount: f64,
  pub expiration: String,
  pub features: Vec<String>,
}

impl PlanPayload {
  fn to_json(&self) -> serde_json::Value {
    json!({
      "name": self.name,
      "amount": self.amount,
      "expiration": self.expiration,
      "features": self.features,
    })
  }
}

pub const LIST: Endpoint<(), DataEnvelope<Vec<SubscriptionPlan>>> =
  Endpoint::query("subscriptions/list", Domain::Subscriptions, &[Tag::Subscription], |_| {
    ApiRequest::get(ROOT)
  });

pub const CREATE: Endpoint<PlanPayload, MessageResponse> = Endpoint::mutation(
  "subscriptions/create",
  Domain::Subscriptions,
  &[Tag::Subscription],
  |plan: &PlanPayload| ApiRequest::post(ROOT).json(plan.to_json()),
);

pub const UPDATE: Endpoint<(Id, PlanPayload), MessageResponse> = Endpoint::mutation(
  "subscriptions/update",
  Domain::Subscriptions,
  &[Tag::Subscription],
  |(id, plan): &(Id, PlanPayload)| {
    ApiRequest::put(format!("{}{}/", ROOT, id)).json(plan.to_json())
  },
);

pub const DELETE: Endpoint<Id, MessageResponse> = Endpoint::mutation(
  "subscriptions/delete",
  Domain::Subscriptions,
  &[Tag::Subscription],
  |id: &Id| ApiRequest::delete(format!("{}{}/", ROOT, id)),
);

pub const ENDPOINTS: [EndpointDef; 4] = [LIST.def, CREATE.def, UPDATE.def, DELETE.def];
