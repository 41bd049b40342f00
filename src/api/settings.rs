//! Legal documents shown in the mobile app.

use serde::Serialize;
use serde_json::json;

use super::endpoint::{Domain, EndpointDef};
use super::types::{DataEnvelope, LegalDocument, MessageResponse};
use super::{ApiRequest, Endpoint};
use crate::cache::Tag;

/// Which legal document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegalDoc {
  Terms,
  Privacy,
  Trust,
}

impl LegalDoc {
  pub fn path(self) -> &'static str {
    match self {
      LegalDoc::Terms => "/dicipline/terms-conditions/",
      LegalDoc::Privacy => "/dicipline/privacy-policy/",
      LegalDoc::Trust => "/dicipline/trust-safety/",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      LegalDoc::Terms => "Terms & Conditions",
      LegalDoc::Privacy => "Privacy Policy",
      LegalDoc::Trust => "Trust & Safety",
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpdate {
  pub doc: LegalDoc,
  pub description: String,
}

pub const GET_DOCUMENT: Endpoint<LegalDoc, DataEnvelope<LegalDocument>> =
  Endpoint::query("settings/get-document", Domain::Settings, &[Tag::Legal], |doc: &LegalDoc| {
    ApiRequest::get(doc.path())
  });

pub const SET_DOCUMENT: Endpoint<DocumentUpdate, MessageResponse> = Endpoint::mutation(
  "settings/set-document",
  Domain::Settings,
  &[Tag::Legal],
  |update: &DocumentUpdate| {
    ApiRequest::put(update.doc.path()).json(json!({ "description": update.description }))
  },
);

pub const ENDPOINTS: [EndpointDef; 2] = [GET_DOCUMENT.def, SET_DOCUMENT.def];
