//! Query descriptors: the cache identity of one query.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Endpoint id plus its argument.
///
/// Two descriptors are the same cache entry iff both parts match. The
/// argument is kept in canonical JSON (object keys sorted) so argument
/// structs that serialize the same way share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
  endpoint: &'static str,
  arg: String,
}

impl QueryKey {
  pub fn new<A: Serialize + ?Sized>(endpoint: &'static str, arg: &A) -> Self {
    let arg = serde_json::to_value(arg)
      .map(|v| canonical(&v))
      .unwrap_or_else(|_| "null".to_string());
    Self { endpoint, arg }
  }

  pub fn endpoint(&self) -> &'static str {
    self.endpoint
  }

  /// Stable, fixed-length key for the entry map
  pub fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.endpoint.as_bytes());
    hasher.update(b":");
    hasher.update(self.arg.as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Human-readable form for logs
  pub fn description(&self) -> String {
    if self.arg == "null" {
      self.endpoint.to_string()
    } else {
      format!("{}({})", self.endpoint, self.arg)
    }
  }
}

/// Serialize with object keys sorted, independent of map insertion order.
fn canonical(value: &Value) -> String {
  match value {
    Value::Object(map) => {
      let mut keys: Vec<&String> = map.keys().collect();
      keys.sort();
      let fields: Vec<String> = keys
        .into_iter()
        .map(|k| format!("{}:{}", Value::String(k.clone()), canonical(&map[k])))
        .collect();
      format!("{{{}}}", fields.join(","))
    }
    Value::Array(items) => {
      let items: Vec<String> = items.iter().map(canonical).collect();
      format!("[{}]", items.join(","))
    }
    other => other.to_string(),
  }
}
