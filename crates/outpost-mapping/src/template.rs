use minijinja::{Environment, Value};

use crate::error::MappingError;

/// Render a template against a context object.
///
/// Missing variables render as empty strings.
pub(crate) fn render(source: &str, context: &serde_json::Value) -> Result<String, MappingError> {
  let env = Environment::new();
  env
    .render_str(source, Value::from_serialize(context))
    .map_err(|e| MappingError::Template {
      message: e.to_string(),
    })
}
