//! Payload and settings validation.

use outpost_config::{FieldDef, FieldType};
use outpost_mapping::{Scope, map_value};
use serde_json::{Map, Value};
use tracing::debug;

use crate::coerce::{coerce_value, kind};
use crate::error::ValidationError;
use crate::payload::{Payload, Settings};

/// Build a payload for one action invocation.
///
/// For each field, in declaration order, the override from `overrides` (a
/// subscription's mapping) is used when present, otherwise the field's default.
/// Fails on the first invalid field.
pub fn validate_payload(
  fields: &[FieldDef],
  overrides: &Map<String, Value>,
  event: &Value,
) -> Result<Payload, ValidationError> {
  let scope = Scope::new(event);
  let mut values = Map::new();

  for field in fields {
    let source = overrides.get(&field.name).or(field.default.as_ref());
    let resolved = match source {
      Some(mapping) => {
        map_value(mapping, &scope).map_err(|source| ValidationError::Mapping {
          field: field.name.clone(),
          source,
        })?
      }
      None => None,
    };

    if let Some(value) = accept(field, resolved)? {
      values.insert(field.name.clone(), value);
    }
  }

  debug!(fields = values.len(), "payload resolved");
  Ok(Payload::new(values))
}

/// Validate raw destination settings against their declarations.
///
/// Settings values and defaults are literals; mapping directives are not
/// evaluated. Undeclared keys are dropped.
pub fn validate_settings(fields: &[FieldDef], raw: &Value) -> Result<Settings, ValidationError> {
  let empty = Map::new();
  let provided = match raw {
    Value::Object(map) => map,
    Value::Null => &empty,
    other => {
      return Err(ValidationError::TypeMismatch {
        field: "settings".to_string(),
        expected: FieldType::Object,
        found: kind(other).to_string(),
      });
    }
  };

  let mut values = Map::new();
  for field in fields {
    let resolved = provided
      .get(&field.name)
      .cloned()
      .or_else(|| field.default.clone());
    if let Some(value) = accept(field, resolved)? {
      values.insert(field.name.clone(), value);
    }
  }

  Ok(Settings::new(values))
}

/// Apply null handling, requiredness, coercion and choices to one field.
fn accept(field: &FieldDef, resolved: Option<Value>) -> Result<Option<Value>, ValidationError> {
  let resolved = match resolved {
    Some(Value::Null) if !field.allow_null => None,
    other => other,
  };

  match resolved {
    None if field.required => Err(ValidationError::MissingRequiredField {
      field: field.name.clone(),
    }),
    None => Ok(None),
    Some(Value::Null) => Ok(Some(Value::Null)),
    Some(value) => {
      let value = coerce_value(field, value)?;
      check_choices(field, &value)?;
      Ok(Some(value))
    }
  }
}

fn check_choices(field: &FieldDef, value: &Value) -> Result<(), ValidationError> {
  let Some(choices) = &field.choices else {
    return Ok(());
  };

  let candidates: Vec<&Value> = match value {
    Value::Array(items) if field.multiple => items.iter().collect(),
    single => vec![single],
  };

  match candidates.into_iter().find(|c| !choices.contains(c)) {
    Some(invalid) => Err(ValidationError::InvalidChoice {
      field: field.name.clone(),
      value: invalid.clone(),
    }),
    None => Ok(()),
  }
}
