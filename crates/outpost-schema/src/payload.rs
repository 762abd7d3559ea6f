use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A resolved, validated action payload.
///
/// Built fresh for each action invocation and owned by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
  pub(crate) fn new(values: Map<String, Value>) -> Self {
    Self(values)
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field)
  }

  /// The field as a string, if present and a string.
  pub fn get_str(&self, field: &str) -> Option<&str> {
    self.0.get(field).and_then(Value::as_str)
  }

  pub fn contains(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn to_value(&self) -> Value {
    Value::Object(self.0.clone())
  }

  /// Deserialize into an action-specific payload struct.
  pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
    serde_json::from_value(self.to_value())
  }
}

/// Validated destination settings.
///
/// Cheap to clone and read-only; shared by every invocation for the
/// destination's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings(Arc<Map<String, Value>>);

impl Settings {
  pub(crate) fn new(values: Map<String, Value>) -> Self {
    Self(Arc::new(values))
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.0.get(name)
  }

  pub fn get_str(&self, name: &str) -> Option<&str> {
    self.0.get(name).and_then(Value::as_str)
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  /// Deserialize into a destination-specific settings struct.
  pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(self.0.as_ref().clone()))
  }
}
