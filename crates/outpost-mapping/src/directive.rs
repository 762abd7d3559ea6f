//! Mapping evaluation.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::MappingError;
use crate::path::{Path, Scope, resolve};
use crate::template::render;

const PATH: &str = "@path";
const TEMPLATE: &str = "@template";
const IF: &str = "@if";
const LITERAL: &str = "@literal";
const ARRAY_PATH: &str = "@arrayPath";

/// Evaluate a mapping against a scope.
///
/// Returns `Ok(None)` when the mapping resolves to nothing (a path that points
/// nowhere, an `@if` without a matching branch). Object members and array
/// elements that resolve to nothing are dropped. The event is never modified.
pub fn map_value(mapping: &Value, scope: &Scope<'_>) -> Result<Option<Value>, MappingError> {
  match mapping {
    Value::Object(map) => {
      if let Some((name, argument)) = as_directive(map) {
        return evaluate(name, argument, scope);
      }

      let mut resolved = Map::with_capacity(map.len());
      for (key, value) in map {
        if let Some(value) = map_value(value, scope)? {
          resolved.insert(key.clone(), value);
        }
      }
      Ok(Some(Value::Object(resolved)))
    }
    Value::Array(items) => {
      let mut resolved = Vec::with_capacity(items.len());
      for item in items {
        if let Some(value) = map_value(item, scope)? {
          resolved.push(value);
        }
      }
      Ok(Some(Value::Array(resolved)))
    }
    literal => Ok(Some(literal.clone())),
  }
}

/// `{"@path": path}`
pub fn path(path: &str) -> Value {
  directive(PATH, Value::String(path.to_string()))
}

/// `{"@template": source}`
pub fn template(source: &str) -> Value {
  directive(TEMPLATE, Value::String(source.to_string()))
}

/// `{"@literal": value}`
pub fn literal(value: Value) -> Value {
  directive(LITERAL, value)
}

/// `{"@arrayPath": [path, shape]}`
pub fn array_path(path: &str, shape: Value) -> Value {
  directive(
    ARRAY_PATH,
    Value::Array(vec![Value::String(path.to_string()), shape]),
  )
}

fn directive(name: &str, argument: Value) -> Value {
  let mut map = Map::with_capacity(1);
  map.insert(name.to_string(), argument);
  Value::Object(map)
}

fn as_directive(map: &Map<String, Value>) -> Option<(&str, &Value)> {
  if map.len() != 1 {
    return None;
  }
  map
    .iter()
    .next()
    .filter(|(key, _)| key.starts_with('@'))
    .map(|(key, value)| (key.as_str(), value))
}

fn evaluate(name: &str, argument: &Value, scope: &Scope<'_>) -> Result<Option<Value>, MappingError> {
  trace!(directive = name, "evaluating directive");
  match name {
    PATH => {
      let source = argument
        .as_str()
        .ok_or_else(|| MappingError::invalid_directive(PATH, "expected a path string"))?;
      let path = Path::parse(source)?;
      Ok(resolve(scope, &path).cloned())
    }
    TEMPLATE => {
      let source = argument
        .as_str()
        .ok_or_else(|| MappingError::invalid_directive(TEMPLATE, "expected a template string"))?;
      render(source, scope.context()).map(|s| Some(Value::String(s)))
    }
    LITERAL => Ok(Some(argument.clone())),
    IF => evaluate_if(argument, scope),
    ARRAY_PATH => evaluate_array_path(argument, scope),
    other => Err(MappingError::UnknownDirective {
      name: other.to_string(),
    }),
  }
}

fn evaluate_if(argument: &Value, scope: &Scope<'_>) -> Result<Option<Value>, MappingError> {
  let branches = argument
    .as_object()
    .ok_or_else(|| MappingError::invalid_directive(IF, "expected an object"))?;

  let condition = if let Some(subject) = branches.get("exists") {
    map_value(subject, scope)?.is_some_and(|v| !v.is_null())
  } else if let Some(subject) = branches.get("blank") {
    is_blank(map_value(subject, scope)?.as_ref())
  } else {
    return Err(MappingError::invalid_directive(
      IF,
      "expected an 'exists' or 'blank' condition",
    ));
  };

  let branch = if condition { "then" } else { "else" };
  match branches.get(branch) {
    Some(mapping) => map_value(mapping, scope),
    None => Ok(None),
  }
}

fn is_blank(value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(_) => false,
  }
}

fn evaluate_array_path(argument: &Value, scope: &Scope<'_>) -> Result<Option<Value>, MappingError> {
  let parts = argument
    .as_array()
    .filter(|parts| !parts.is_empty() && parts.len() <= 2)
    .ok_or_else(|| MappingError::invalid_directive(ARRAY_PATH, "expected [path] or [path, shape]"))?;

  let source = match &parts[0] {
    Value::String(source) => resolve(scope, &Path::parse(source)?).cloned(),
    mapping => map_value(mapping, scope)?,
  };

  let elements = match source {
    Some(Value::Array(items)) => items,
    Some(object @ Value::Object(_)) => vec![object],
    _ => return Ok(None),
  };

  let Some(shape) = parts.get(1) else {
    return Ok(Some(Value::Array(elements)));
  };

  let mut mapped = Vec::with_capacity(elements.len());
  for element in &elements {
    let item_scope = Scope::with_roots(scope.event(), element);
    if let Some(value) = map_value(shape, &item_scope)? {
      mapped.push(value);
    }
  }
  Ok(Some(Value::Array(mapped)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn event() -> Value {
    json!({
      "type": "track",
      "event": "Order Completed",
      "messageId": "msg-1",
      "userId": null,
      "properties": {
        "total": 42.5,
        "products": [
          { "id": "p1", "price": 10 },
          { "id": "p2", "price": 32.5 }
        ]
      },
      "context": { "traits": { "first": "Ada", "last": "Lovelace" } }
    })
  }

  fn eval(mapping: Value) -> Option<Value> {
    let event = event();
    map_value(&mapping, &Scope::new(&event)).unwrap()
  }

  #[test]
  fn test_literal_passthrough() {
    assert_eq!(eval(json!(true)), Some(json!(true)));
    assert_eq!(eval(json!("static")), Some(json!("static")));
    assert_eq!(eval(json!(3)), Some(json!(3)));
  }

  #[test]
  fn test_path_directive() {
    assert_eq!(eval(path("$.messageId")), Some(json!("msg-1")));
    assert_eq!(eval(path("@.properties.total")), Some(json!(42.5)));
    assert_eq!(eval(path("$.missing")), None);
  }

  #[test]
  fn test_path_to_null_is_present() {
    assert_eq!(eval(path("$.userId")), Some(Value::Null));
  }

  #[test]
  fn test_object_mapping_drops_absent_members() {
    let mapped = eval(json!({
      "id": { "@path": "$.messageId" },
      "missing": { "@path": "$.nope" },
      "constant": 1
    }));
    assert_eq!(mapped, Some(json!({ "id": "msg-1", "constant": 1 })));
  }

  #[test]
  fn test_template_directive() {
    let mapped = eval(template("{{ context.traits.first }} {{ context.traits.last }}"));
    assert_eq!(mapped, Some(json!("Ada Lovelace")));
  }

  #[test]
  fn test_template_missing_variable_renders_empty() {
    assert_eq!(eval(template("[{{ nope }}]")), Some(json!("[]")));
  }

  #[test]
  fn test_literal_directive_is_not_interpreted() {
    let mapped = eval(literal(json!({ "@path": "$.messageId" })));
    assert_eq!(mapped, Some(json!({ "@path": "$.messageId" })));
  }

  #[test]
  fn test_if_exists() {
    let mapped = eval(json!({
      "@if": { "exists": { "@path": "$.event" }, "then": { "@path": "$.event" }, "else": "unnamed" }
    }));
    assert_eq!(mapped, Some(json!("Order Completed")));

    let mapped = eval(json!({
      "@if": { "exists": { "@path": "$.userId" }, "then": "known", "else": "anonymous" }
    }));
    assert_eq!(mapped, Some(json!("anonymous")));
  }

  #[test]
  fn test_if_blank_without_else_is_absent() {
    let mapped = eval(json!({
      "@if": { "blank": { "@path": "$.event" }, "then": "blank" }
    }));
    assert_eq!(mapped, None);
  }

  #[test]
  fn test_array_path_rebinds_context() {
    let mapped = eval(array_path(
      "$.properties.products",
      json!({ "sku": { "@path": "$.id" }, "order": { "@path": "@.messageId" } }),
    ));
    assert_eq!(
      mapped,
      Some(json!([
        { "sku": "p1", "order": "msg-1" },
        { "sku": "p2", "order": "msg-1" }
      ]))
    );
  }

  #[test]
  fn test_array_path_wraps_object() {
    let mapped = eval(array_path("$.context.traits", json!({ "name": { "@path": "$.first" } })));
    assert_eq!(mapped, Some(json!([{ "name": "Ada" }])));
  }

  #[test]
  fn test_array_path_missing_source() {
    assert_eq!(eval(array_path("$.nope", json!({}))), None);
  }

  #[test]
  fn test_unknown_directive() {
    let event = event();
    let result = map_value(&json!({ "@nope": 1 }), &Scope::new(&event));
    assert!(matches!(result, Err(MappingError::UnknownDirective { .. })));
  }

  #[test]
  fn test_invalid_path_argument() {
    let event = event();
    let result = map_value(&json!({ "@path": 5 }), &Scope::new(&event));
    assert!(matches!(result, Err(MappingError::InvalidDirective { .. })));
  }
}
