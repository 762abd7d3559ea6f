use serde_json::{Map, Value};

/// Present and not an empty string.
pub(crate) fn is_defined(value: Option<&str>) -> bool {
  value.is_some_and(|v| !v.is_empty())
}

/// Heap event name for a Segment call type.
pub(crate) fn event_name(kind: Option<&str>, event: Option<&str>, name: Option<&str>) -> String {
  let name = name.filter(|n| !n.is_empty());
  match kind {
    Some("track") => event.unwrap_or_default().to_string(),
    Some("page") => name.map_or_else(|| "Page viewed".to_string(), |n| format!("{n} page viewed")),
    Some("screen") => name.map_or_else(
      || "Screen viewed".to_string(),
      |n| format!("{n} screen viewed"),
    ),
    _ => "track".to_string(),
  }
}

/// Identity wins over the anonymous id.
pub(crate) fn user_identifier(identity: Option<&str>, anonymous_id: Option<&str>) -> Map<String, Value> {
  let mut identifier = Map::new();
  match (identity, anonymous_id) {
    (Some(identity), _) if !identity.is_empty() => {
      identifier.insert("identity".to_string(), Value::from(identity));
    }
    (_, Some(anonymous_id)) => {
      identifier.insert("anonymous_id".to_string(), Value::from(anonymous_id));
    }
    _ => {}
  }
  identifier
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_event_name() {
    assert_eq!(event_name(Some("track"), Some("Signed Up"), None), "Signed Up");
    assert_eq!(event_name(Some("page"), None, Some("Home")), "Home page viewed");
    assert_eq!(event_name(Some("page"), None, None), "Page viewed");
    assert_eq!(event_name(Some("screen"), None, Some("Cart")), "Cart screen viewed");
    assert_eq!(event_name(Some("screen"), None, Some("")), "Screen viewed");
    assert_eq!(event_name(Some("identify"), None, None), "track");
  }

  #[test]
  fn test_user_identifier_prefers_identity() {
    assert_eq!(
      Value::Object(user_identifier(Some("u1"), Some("a1"))),
      json!({ "identity": "u1" })
    );
    assert_eq!(
      Value::Object(user_identifier(None, Some("a1"))),
      json!({ "anonymous_id": "a1" })
    );
    assert_eq!(
      Value::Object(user_identifier(Some(""), Some("a1"))),
      json!({ "anonymous_id": "a1" })
    );
  }
}
