//! MS posts: admin-authored articles with a cover image.

use super::endpoint::{Domain, EndpointDef};
use super::types::{Id, MessageResponse, MsPost};
use super::{ApiRequest, Endpoint, MultipartForm};
use crate::cache::Tag;

const ROOT: &str = "/blogs/v1/ms-posts/";

pub const LIST: Endpoint<(), Vec<MsPost>> =
  Endpoint::query("posts/list", Domain::Posts, &[Tag::MsPost], |_| ApiRequest::get(ROOT));

pub const GET: Endpoint<Id, MsPost> =
  Endpoint::query("posts/get", Domain::Posts, &[Tag::MsPost], |id: &Id| {
    ApiRequest::get(format!("{}{}/", ROOT, id))
  });

/// Multipart: `title`, `description`, `image`
pub const CREATE: Endpoint<MultipartForm, MessageResponse> =
  Endpoint::mutation("posts/create", Domain::Posts, &[Tag::MsPost], |form: &MultipartForm| {
    ApiRequest::post(ROOT).multipart(form.clone())
  });

/// Multipart; `image` only when replaced
pub const UPDATE: Endpoint<(Id, MultipartForm), MessageResponse> = Endpoint::mutation(
  "posts/update",
  Domain::Posts,
  &[Tag::MsPost],
  |(id, form): &(Id, MultipartForm)| {
    ApiRequest::put(format!("{}{}/", ROOT, id)).multipart(form.clone())
  },
);

pub const DELETE: Endpoint<Id, MessageResponse> =
  Endpoint::mutation("posts/delete", Domain::Posts, &[Tag::MsPost], |id: &Id| {
    ApiRequest::delete(format!("{}{}/", ROOT, id))
  });

pub const ENDPOINTS: [EndpointDef; 5] = [LIST.def, GET.def, CREATE.def, UPDATE.def, DELETE.def];
