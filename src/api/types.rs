//! Response schemas for the admin REST API.

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier the backend sends as a number or a numeric string
pub type Id = u64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
  pub access: String,
  #[serde(default)]
  pub message: Option<String>,
}

/// Generic acknowledgement.
///
/// Accepts any JSON: an object's string `message`, or a bare string, is the
/// message. Everything else (empty body, arrays, other objects) has none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageResponse {
  pub message: Option<String>,
}

impl<'de> Deserialize<'de> for MessageResponse {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let message = match serde_json::Value::deserialize(deserializer)? {
      serde_json::Value::String(s) => Some(s),
      serde_json::Value::Object(map) => map
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string),
      _ => None,
    };
    Ok(Self { message })
  }
}

impl MessageResponse {
  pub fn message_or(&self, fallback: &str) -> String {
    self
      .message
      .as_deref()
      .filter(|m| !m.trim().is_empty())
      .unwrap_or(fallback)
      .to_string()
  }
}

/// Payload that some endpoints wrap as `{"data": ..}` and others send bare
#[derive(Debug, Clone, PartialEq)]
pub struct DataEnvelope<T>(pub T);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DataEnvelope<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape<T> {
      Wrapped { data: T },
      Bare(T),
    }

    Ok(match Shape::deserialize(deserializer)? {
      Shape::Wrapped { data } => DataEnvelope(data),
      Shape::Bare(data) => DataEnvelope(data),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsPost {
  #[serde(deserialize_with = "lenient::id")]
  pub id: Id,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Story {
  #[serde(deserialize_with = "lenient::id")]
  pub id: Id,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesVideo {
  #[serde(deserialize_with = "lenient::id")]
  pub id: Id,
  pub title: String,
  #[serde(default)]
  pub author_name: Option<String>,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Donation {
  #[serde(default, deserialize_with = "lenient::opt_id")]
  pub id: Option<Id>,
  pub full_name: String,
  pub email: String,
  #[serde(deserialize_with = "lenient::number")]
  pub amount: f64,
  #[serde(default)]
  pub location: Option<String>,
  pub payment_status: String,
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserSummary {
  #[serde(deserialize_with = "lenient::id")]
  pub id: Id,
  pub full_name: String,
  pub email: String,
  #[serde(default)]
  pub profile_pic: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardSummary {
  #[serde(deserialize_with = "lenient::number")]
  pub total_donations: f64,
  #[serde(deserialize_with = "lenient::number")]
  pub all_user_list: f64,
  #[serde(deserialize_with = "lenient::number")]
  pub total_stories: f64,
  #[serde(default)]
  pub user_list: Vec<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
  pub full_name: String,
  pub email: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalDocument {
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionPlan {
  #[serde(deserialize_with = "lenient::id")]
  pub id: Id,
  pub name: String,
  #[serde(deserialize_with = "lenient::number")]
  pub amount: f64,
  pub expiration: String,
  #[serde(default)]
  pub features: Vec<String>,
}

/// Render an amount the way the dashboard shows money
pub fn format_amount(amount: f64) -> String {
  if amount.fract() == 0.0 {
    format!("${:.0}", amount)
  } else {
    format!("${:.2}", amount)
  }
}

/// Deserializers for fields the backend sends as numbers or strings
mod lenient {
  use serde::de::Error;
  use serde::{Deserialize, Deserializer};

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum NumberOrString {
    Int(u64),
    Float(f64),
    Text(String),
  }

  pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
      NumberOrString::Int(n) => Ok(n as f64),
      NumberOrString::Float(n) => Ok(n),
      NumberOrString::Text(s) => {
        let trimmed = s.trim().trim_start_matches('$').replace(',', "");
        trimmed
          .parse()
          .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", s)))
      }
    }
  }

  pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
      NumberOrString::Int(n) => Ok(n),
      NumberOrString::Float(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as u64),
      NumberOrString::Float(n) => Err(D::Error::custom(format!("invalid id {}", n))),
      NumberOrString::Text(s) => s
        .trim()
        .parse()
        .map_err(|_| D::Error::custom(format!("invalid id {:?}", s))),
    }
  }

  pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "id")] u64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_amounts_accept_numbers_and_strings() {
    let donation: Donation = serde_json::from_value(json!({
      "full_name": "Rahim",
      "email": "rahim@example.com",
      "amount": "45.50",
      "payment_status": "paid",
      "created_at": "2025-01-02T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(donation.amount, 45.5);
    assert_eq!(donation.id, None);

    let summary: DashboardSummary = serde_json::from_value(json!({
      "total_donations": 1200,
      "all_user_list": "31",
      "total_stories": 4,
      "user_list": []
    }))
    .unwrap();
    assert_eq!(summary.total_donations, 1200.0);
    assert_eq!(summary.all_user_list, 31.0);
  }

  #[test]
  fn test_ids_accept_numeric_strings() {
    let post: MsPost = serde_json::from_value(json!({
      "id": "17",
      "title": "Living with MS",
      "description": "Ten characters at least"
    }))
    .unwrap();
    assert_eq!(post.id, 17);
    assert!(post.image.is_none());

    let err = serde_json::from_value::<MsPost>(json!({"id": "abc", "title": "x"}));
    assert!(err.is_err());
  }

  #[test]
  fn test_envelope_accepts_wrapped_and_bare() {
    let wrapped: DataEnvelope<Vec<SeriesVideo>> = serde_json::from_value(json!({
      "data": [{"id": 1, "title": "Episode 1", "description": "First one here"}]
    }))
    .unwrap();
    assert_eq!(wrapped.0.len(), 1);

    let bare: DataEnvelope<Vec<SeriesVideo>> = serde_json::from_value(json!([])).unwrap();
    assert!(bare.0.is_empty());
  }

  #[test]
  fn test_message_fallback() {
    let empty = MessageResponse::default();
    assert_eq!(empty.message_or("Saved"), "Saved");
    let blank = MessageResponse {
      message: Some("  ".to_string()),
    };
    assert_eq!(blank.message_or("Saved"), "Saved");
  }

  #[test]
  fn test_message_response_accepts_any_json() {
    let parse = |v| serde_json::from_value::<MessageResponse>(v).unwrap().message;
    assert_eq!(parse(json!({"message": "Saved"})).as_deref(), Some("Saved"));
    assert_eq!(parse(json!("Deleted")).as_deref(), Some("Deleted"));
    assert_eq!(parse(json!({"message": 3, "ok": true})), None);
    assert_eq!(parse(json!([1, 2])), None);
    assert_eq!(parse(json!(null)), None);
  }

  #[test]
  fn test_format_amount() {
    assert_eq!(format_amount(45.0), "$45");
    assert_eq!(format_amount(45.5), "$45.50");
  }
}
