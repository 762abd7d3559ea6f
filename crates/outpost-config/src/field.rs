use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  String,
  /// Long-form string; validated like `String`.
  Text,
  /// Secret string; validated like `String`.
  Password,
  Number,
  Integer,
  Boolean,
  Object,
  /// ISO-8601 timestamp, normalised to RFC-3339 UTC.
  Datetime,
}

impl fmt::Display for FieldType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      FieldType::String => "string",
      FieldType::Text => "text",
      FieldType::Password => "password",
      FieldType::Number => "number",
      FieldType::Integer => "integer",
      FieldType::Boolean => "boolean",
      FieldType::Object => "object",
      FieldType::Datetime => "datetime",
    };
    f.write_str(name)
  }
}

/// Declaration of a single action field or destination setting.
///
/// `default` is either a literal JSON value or a mapping directive such as
/// `{"@path": "$.properties"}`. It is never evaluated at declaration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
  pub name: String,
  pub label: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
  #[serde(rename = "type")]
  pub field_type: FieldType,
  #[serde(default)]
  pub required: bool,
  #[serde(default)]
  pub allow_null: bool,
  /// The value is an array of `field_type`.
  #[serde(default)]
  pub multiple: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub choices: Option<Vec<serde_json::Value>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,
}

impl FieldDef {
  /// Create an optional field with no default. The label defaults to the name.
  pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
    let name = name.into();
    Self {
      label: name.clone(),
      name,
      description: String::new(),
      field_type,
      required: false,
      allow_null: false,
      multiple: false,
      choices: None,
      default: None,
    }
  }

  pub fn string(name: impl Into<String>) -> Self {
    Self::new(name, FieldType::String)
  }

  pub fn object(name: impl Into<String>) -> Self {
    Self::new(name, FieldType::Object)
  }

  pub fn boolean(name: impl Into<String>) -> Self {
    Self::new(name, FieldType::Boolean)
  }

  pub fn datetime(name: impl Into<String>) -> Self {
    Self::new(name, FieldType::Datetime)
  }

  pub fn label(mut self, label: impl Into<String>) -> Self {
    self.label = label.into();
    self
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn allow_null(mut self) -> Self {
    self.allow_null = true;
    self
  }

  pub fn multiple(mut self) -> Self {
    self.multiple = true;
    self
  }

  pub fn choices(mut self, choices: impl IntoIterator<Item = serde_json::Value>) -> Self {
    self.choices = Some(choices.into_iter().collect());
    self
  }

  pub fn default_value(mut self, default: serde_json::Value) -> Self {
    self.default = Some(default);
    self
  }
}
