//! Donation ledger (read-only).

use super::endpoint::{Domain, EndpointDef};
use super::types::{Donation, Id};
use super::{ApiRequest, Endpoint};
use crate::cache::Tag;

pub const LIST: Endpoint<(), Vec<Donation>> =
  Endpoint::query("donations/list", Domain::Donations, &[Tag::Donation], |_| {
    ApiRequest::get("/donation/all-donations/")
  });

pub const DONATOR: Endpoint<Id, Donation> =
  Endpoint::query("donations/donator", Domain::Donations, &[Tag::Donation], |id: &Id| {
    ApiRequest::get(format!("/donation/donator/{}/", id))
  });

pub const ENDPOINTS: [EndpointDef; 2] = [LIST.def, DONATOR.def];
