//! Error types for the REST boundary.

use std::time::Duration;

/// Failure of a single API call.
///
/// Every variant produced after a response arrived keeps the HTTP status so
/// views can tell an expired session (401) from a validation rejection (400).
/// Cloneable because one failed fetch is broadcast to every handle on the
/// same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
  /// Connection refused, DNS failure, TLS error, reset mid-body...
  #[error("network error: {0}")]
  Network(String),

  #[error("request timed out after {}s", .0.as_secs())]
  Timeout(Duration),

  /// Non-2xx response.
  #[error("HTTP {status}: {message}")]
  Status { status: u16, message: String },

  /// 2xx response whose body is not JSON.
  #[error("invalid JSON in HTTP {status} response: {message}")]
  Decode { status: u16, message: String },

  /// Valid JSON that does not match the endpoint's response schema.
  #[error("response from {endpoint} (HTTP {status}) did not match schema: {message}")]
  SchemaMismatch {
    endpoint: &'static str,
    status: u16,
    message: String,
  },

  /// The endpoint was never registered with the process registry.
  #[error("endpoint {0} is not registered")]
  Unregistered(&'static str),

  /// Request could not be built (bad path, unreadable attachment).
  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// The call succeeded but its result could not be persisted locally.
  #[error("could not save session: {0}")]
  Storage(String),
}

impl HttpError {
  /// Status code of the response that caused this error, if one arrived.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. }
      | Self::Decode { status, .. }
      | Self::SchemaMismatch { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Whether the backend rejected the bearer token.
  pub fn is_unauthorized(&self) -> bool {
    matches!(self.status(), Some(401) | Some(403))
  }
}
