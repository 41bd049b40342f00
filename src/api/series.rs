//! Upload series: video episodes linked from YouTube.

use serde::Serialize;
use serde_json::json;

use super::endpoint::{Domain, EndpointDef};
use super::types::{DataEnvelope, Id, MessageResponse, SeriesVideo};
use super::{ApiRequest, Endpoint};
use crate::cache::Tag;

const ROOT: &str = "/blogs/v1/ms-videos/";

/// JSON body for create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPayload {
  pub title: String,
  pub author_name: String,
  pub description: String,
  pub video_url: String,
}

impl SeriesPayload {
  fn to_json(&self) -> serde_json::Value {
    json!({
      "title": self.title,
      "author_name": self.author_name,
      "description": self.description,
      "video_url": self.video_url,
    })
  }
}

pub const LIST: Endpoint<(), DataEnvelope<Vec<SeriesVideo>>> =
  Endpoint::query("series/list", Domain::Series, &[Tag::UploadSeries], |_| {
    ApiRequest::get(ROOT)
  });

pub const GET: Endpoint<Id, DataEnvelope<SeriesVideo>> =
  Endpoint::query("series/get", Domain::Series, &[Tag::UploadSeries], |id: &Id| {
    ApiRequest::get(format!("{}{}/", ROOT, id))
  });

pub const CREATE: Endpoint<SeriesPayload, MessageResponse> = Endpoint::mutation(
  "series/create",
  Domain::Series,
  &[Tag::UploadSeries],
  |payload: &SeriesPayload| ApiRequest::post(ROOT).json(payload.to_json()),
);

pub const UPDATE: Endpoint<(Id, SeriesPayload), MessageResponse> = Endpoint::mutation(
  "series/update",
  Domain::Series,
  &[Tag::UploadSeries],
  |(id, payload): &(Id, SeriesPayload)| {
    ApiRequest::put(format!("{}{}/", ROOT, id)).json(payload.to_json())
  },
);

pub const DELETE: Endpoint<Id, MessageResponse> =
  Endpoint::mutation("series/delete", Domain::Series, &[Tag::UploadSeries], |id: &Id| {
    ApiRequest::delete(format!("{}{}/", ROOT, id))
  });

pub const ENDPOINTS: [EndpointDef; 5] = [LIST.def, GET.def, CREATE.def, UPDATE.def, DELETE.def];
