use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::method::Method;

/// Description of one outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
  #[serde(default)]
  pub method: Method,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub headers: BTreeMap<String, String>,
  /// JSON body; sets `content-type: application/json`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub json: Option<Value>,
  /// Raw body, used when `json` is absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
  /// Turn non-2xx responses into [`RequestError::Http`](crate::RequestError::Http).
  #[serde(default = "default_throw")]
  pub throw_http_errors: bool,
}

fn default_throw() -> bool {
  true
}

impl Default for RequestOptions {
  fn default() -> Self {
    Self {
      method: Method::Get,
      headers: BTreeMap::new(),
      json: None,
      body: None,
      timeout_ms: None,
      throw_http_errors: true,
    }
  }
}

impl RequestOptions {
  pub fn get() -> Self {
    Self::default()
  }

  pub fn post() -> Self {
    Self::method(Method::Post)
  }

  pub fn method(method: Method) -> Self {
    Self {
      method,
      ..Self::default()
    }
  }

  pub fn json(mut self, body: Value) -> Self {
    self.json = Some(body);
    self
  }

  pub fn body(mut self, body: impl Into<String>) -> Self {
    self.body = Some(body.into());
    self
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(name.into().to_ascii_lowercase(), value.into());
    self
  }

  pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
    self.timeout_ms = Some(timeout_ms);
    self
  }

  pub fn throw_http_errors(mut self, throw: bool) -> Self {
    self.throw_http_errors = throw;
    self
  }

  /// Fill in headers and timeout from destination defaults.
  ///
  /// Values set on the request win over the defaults.
  pub fn with_defaults(mut self, defaults: &RequestDefaults) -> Self {
    for (name, value) in &defaults.headers {
      self
        .headers
        .entry(name.to_ascii_lowercase())
        .or_insert_with(|| value.clone());
    }
    if self.timeout_ms.is_none() {
      self.timeout_ms = defaults.timeout_ms;
    }
    self
  }
}

/// Options a destination applies to every request its actions make.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefaults {
  #[serde(default)]
  pub headers: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
}

impl RequestDefaults {
  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(name.into().to_ascii_lowercase(), value.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_defaults_do_not_override_request_headers() {
    let defaults = RequestDefaults::default()
      .header("Authorization", "Bearer default")
      .header("x-source", "outpost");

    let options = RequestOptions::post()
      .header("authorization", "Bearer explicit")
      .json(json!({ "a": 1 }))
      .with_defaults(&defaults);

    assert_eq!(options.headers["authorization"], "Bearer explicit");
    assert_eq!(options.headers["x-source"], "outpost");
    assert_eq!(options.method, Method::Post);
  }

  #[test]
  fn test_default_timeout_applies_when_unset() {
    let defaults = RequestDefaults {
      timeout_ms: Some(500),
      ..RequestDefaults::default()
    };
    assert_eq!(RequestOptions::get().with_defaults(&defaults).timeout_ms, Some(500));
    assert_eq!(
      RequestOptions::get()
        .timeout_ms(10)
        .with_defaults(&defaults)
        .timeout_ms,
      Some(10)
    );
  }

  #[test]
  fn test_throw_http_errors_defaults_to_true() {
    let options: RequestOptions = serde_json::from_value(json!({ "method": "POST" })).unwrap();
    assert!(options.throw_http_errors);
    assert_eq!(options.method, Method::Post);
  }
}
