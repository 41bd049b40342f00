//! User stories submitted through the mobile app.

use super::endpoint::{Domain, EndpointDef};
use super::types::{DataEnvelope, Id, MessageResponse, Story};
use super::{ApiRequest, Endpoint, MultipartForm};
use crate::cache::Tag;

const ROOT: &str = "/blogs/v1/blogs/";

pub const LIST: Endpoint<(), Vec<Story>> =
  Endpoint::query("stories/list", Domain::Stories, &[Tag::Blog], |_| ApiRequest::get(ROOT));

/// Single stories come back wrapped in `{"data": ..}`
pub const GET: Endpoint<Id, DataEnvelope<Story>> =
  Endpoint::query("stories/get", Domain::Stories, &[Tag::Blog], |id: &Id| {
    ApiRequest::get(format!("{}{}/", ROOT, id))
  });

pub const UPDATE: Endpoint<(Id, MultipartForm), MessageResponse> = Endpoint::mutation(
  "stories/update",
  Domain::Stories,
  &[Tag::Blog],
  |(id, form): &(Id, MultipartForm)| {
    ApiRequest::put(format!("{}{}/", ROOT, id)).multipart(form.clone())
  },
);

pub const DELETE: Endpoint<Id, MessageResponse> =
  Endpoint::mutation("stories/delete", Domain::Stories, &[Tag::Blog], |id: &Id| {
    ApiRequest::delete(format!("{}{}/", ROOT, id))
  });

pub const ENDPOINTS: [EndpointDef; 4] = [LIST.def, GET.def, UPDATE.def, DELETE.def];
