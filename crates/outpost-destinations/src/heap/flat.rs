use serde_json::{Map, Value};

/// Flatten nested objects into dotted keys.
///
/// Arrays become their JSON text; other leaves are kept as they are.
///
/// ```text
/// { "a": { "b": 1 }, "c": [1, 2] }  =>  { "a.b": 1, "c": "[1,2]" }
/// ```
pub fn flat(data: &Map<String, Value>) -> Map<String, Value> {
  let mut out = Map::new();
  flatten_into(&mut out, data, None);
  out
}

fn flatten_into(out: &mut Map<String, Value>, data: &Map<String, Value>, prefix: Option<&str>) {
  for (key, value) in data {
    let name = match prefix {
      Some(prefix) => format!("{prefix}.{key}"),
      None => key.clone(),
    };
    match value {
      Value::Object(nested) => flatten_into(out, nested, Some(&name)),
      Value::Array(_) => {
        out.insert(name, Value::String(value.to_string()));
      }
      leaf => {
        out.insert(name, leaf.clone());
      }
    }
  }
}
