use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  pub url: String,
  pub status: u16,
  #[serde(default)]
  pub headers: BTreeMap<String, String>,
  /// Parsed JSON body, or the raw text as a string when it is not JSON.
  #[serde(default)]
  pub body: Value,
}

impl Response {
  /// Whether the status is 2xx.
  pub fn ok(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Parse a body into JSON, falling back to the raw text.
  pub(crate) fn parse_body(text: String) -> Value {
    if text.is_empty() {
      return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
  }
}
