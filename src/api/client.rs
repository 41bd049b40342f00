use crate::api::error::HttpError;
use crate::session::TokenStore;
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
  Json(Value),
  /// Multipart form; the transport picks the content type and boundary
  Multipart(MultipartForm),
}

/// One part of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
  Text {
    name: String,
    value: String,
  },
  File {
    name: String,
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
  },
}

#[cfg(test)]
impl FormPart {
  pub fn name(&self) -> &str {
    match self {
      FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
    }
  }
}

/// Transport-independent multipart form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
  parts: Vec<FormPart>,
}

impl MultipartForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.parts.push(FormPart::Text {
      name: name.into(),
      value: value.into(),
    });
    self
  }

  pub fn file(
    mut self,
    name: impl Into<String>,
    file_name: impl Into<String>,
    mime: impl Into<String>,
    bytes: Vec<u8>,
  ) -> Self {
    self.parts.push(FormPart::File {
      name: name.into(),
      file_name: file_name.into(),
      mime: mime.into(),
      bytes,
    });
    self
  }

  /// Value of a text part
  #[cfg(test)]
  pub fn get_text(&self, name: &str) -> Option<&str> {
    self.parts.iter().find_map(|part| match part {
      FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
      _ => None,
    })
  }

  #[cfg(test)]
  pub fn has_part(&self, name: &str) -> bool {
    self.parts.iter().any(|p| p.name() == name)
  }

  fn into_reqwest(self) -> Result<reqwest::multipart::Form, HttpError> {
    let mut form = reqwest::multipart::Form::new();
    for part in self.parts {
      form = match part {
        FormPart::Text { name, value } => form.text(name, value),
        FormPart::File {
          name,
          file_name,
          mime,
          bytes,
        } => {
          let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime)
            .map_err(|e| HttpError::InvalidRequest(format!("bad mime type {}: {}", mime, e)))?;
          form.part(name, part)
        }
      };
    }
    Ok(form)
  }
}

/// A request relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  pub path: String,
  pub body: Option<Body>,
  pub headers: Vec<(String, String)>,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      body: None,
      headers: Vec::new(),
    }
  }

  pub fn get(path: impl Into<String>) -> Self {
    Self::new(Method::GET, path)
  }

  pub fn post(path: impl Into<String>) -> Self {
    Self::new(Method::POST, path)
  }

  pub fn put(path: impl Into<String>) -> Self {
    Self::new(Method::PUT, path)
  }

  pub fn patch(path: impl Into<String>) -> Self {
    Self::new(Method::PATCH, path)
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self::new(Method::DELETE, path)
  }

  pub fn json(mut self, value: Value) -> Self {
    self.body = Some(Body::Json(value));
    self
  }

  pub fn multipart(mut self, form: MultipartForm) -> Self {
    self.body = Some(Body::Multipart(form));
    self
  }
}

/// A fully resolved request as handed to the transport
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(String, String)>,
  pub body: Option<Body>,
}

#[cfg(test)]
impl OutgoingRequest {
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}

/// Raw response: status plus body bytes
#[derive(Debug, Clone)]
pub struct ApiResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl ApiResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Decode the body into the endpoint's response schema.
  ///
  /// An empty body decodes as `{}` so acknowledgement schemas with only
  /// optional fields accept 204 responses.
  pub fn decode<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, HttpError> {
    let value: Value = if self.body.iter().all(u8::is_ascii_whitespace) {
      Value::Object(serde_json::Map::new())
    } else {
      serde_json::from_slice(&self.body).map_err(|e| HttpError::Decode {
        status: self.status,
        message: e.to_string(),
      })?
    };

    serde_json::from_value(value).map_err(|e| HttpError::SchemaMismatch {
      endpoint,
      status: self.status,
      message: e.to_string(),
    })
  }
}

/// Sends resolved requests over the wire
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse, HttpError>;
}

/// Production transport backed by reqwest
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Result<Self, HttpError> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("ms-admin/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| HttpError::Network(format!("failed to build HTTP client: {}", e)))?;
    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse, HttpError> {
    let mut builder = self.client.request(request.method, request.url);
    for (name, value) in request.headers {
      builder = builder.header(name, value);
    }
    builder = match request.body {
      Some(Body::Json(value)) => builder.json(&value),
      Some(Body::Multipart(form)) => builder.multipart(form.into_reqwest()?),
      None => builder,
    };

    let response = builder
      .send()
      .await
      .map_err(|e| HttpError::Network(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
      .bytes()
      .await
      .map_err(|e| HttpError::Network(e.to_string()))?;

    Ok(ApiResponse {
      status,
      body: body.to_vec(),
    })
  }
}

/// HTTP executor shared by every endpoint.
///
/// Joins paths onto the base URL, attaches the bearer token read from the
/// token store at call time, enforces the request timeout and maps non-2xx
/// responses to [`HttpError::Status`].
#[derive(Clone)]
pub struct ResourceClient {
  base_url: Url,
  tokens: Arc<dyn TokenStore>,
  transport: Arc<dyn Transport>,
  timeout: Duration,
}

impl ResourceClient {
  pub fn new(
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
  ) -> Self {
    Self {
      base_url,
      tokens,
      transport,
      timeout,
    }
  }

  pub fn tokens(&self) -> &Arc<dyn TokenStore> {
    &self.tokens
  }

  /// Execute a prepared request
  pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
    self
      .execute(request.method, &request.path, request.body, request.headers)
      .await
  }

  /// Execute a request described by its parts
  pub async fn execute(
    &self,
    method: Method,
    path: &str,
    body: Option<Body>,
    extra_headers: Vec<(String, String)>,
  ) -> Result<ApiResponse, HttpError> {
    let url = self.url_for(path)?;

    let mut headers = Vec::with_capacity(extra_headers.len() + 2);
    headers.push(("Accept".to_string(), "application/json".to_string()));
    if let Some(token) = self.tokens.token() {
      headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
    }
    headers.extend(extra_headers);

    debug!(%method, %url, "sending request");

    let outgoing = OutgoingRequest {
      method: method.clone(),
      url: url.clone(),
      headers,
      body,
    };

    let response = match tokio::time::timeout(self.timeout, self.transport.send(outgoing)).await {
      Ok(result) => result.inspect_err(|e| warn!(%method, %url, error = %e, "request failed"))?,
      Err(_) => {
        warn!(%method, %url, timeout = ?self.timeout, "request timed out");
        return Err(HttpError::Timeout(self.timeout));
      }
    };

    if !response.is_success() {
      let message = error_message(&response);
      warn!(%method, %url, status = response.status, %message, "request rejected");
      return Err(HttpError::Status {
        status: response.status,
        message,
      });
    }

    Ok(response)
  }

  fn url_for(&self, path: &str) -> Result<Url, HttpError> {
    let base = self.base_url.as_str().trim_end_matches('/');
    let joined = if path.starts_with('/') {
      format!("{}{}", base, path)
    } else {
      format!("{}/{}", base, path)
    };
    Url::parse(&joined).map_err(|e| HttpError::InvalidRequest(format!("bad URL {}: {}", joined, e)))
  }
}

/// Pull a human-readable message out of an error response body.
///
/// Handles `{"message": ..}`, `{"detail": ..}`, `{"error": ..}` and
/// field-error maps like `{"email": ["already taken"]}`.
fn error_message(response: &ApiResponse) -> String {
  if let Ok(value) = serde_json::from_slice::<Value>(&response.body) {
    for key in ["message", "detail", "error"] {
      if let Some(msg) = value.get(key).and_then(Value::as_str) {
        return msg.to_string();
      }
    }

    if let Some(map) = value.as_object() {
      let fields: Vec<String> = map
        .iter()
        .filter_map(|(field, errors)| {
          let first = match errors {
            Value::Array(items) => items.first().and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
          }?;
          Some(format!("{}: {}", field, first))
        })
        .collect();
      if !fields.is_empty() {
        return fields.join("; ");
      }
    }
  }

  let text = String::from_utf8_lossy(&response.body);
  let text = text.trim();
  if text.is_empty() {
    reqwest::StatusCode::from_u16(response.status)
      .ok()
      .and_then(|s| s.canonical_reason())
      .unwrap_or("request failed")
      .to_string()
  } else {
    text.chars().take(200).collect()
  }
}
