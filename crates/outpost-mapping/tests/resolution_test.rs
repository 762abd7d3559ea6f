//! Read-only and determinism checks for path resolution.

use outpost_mapping::{Scope, map_value, path, resolve_str};
use serde_json::json;

fn sample_event() -> serde_json::Value {
  json!({
    "type": "page",
    "name": "Pricing",
    "properties": { "path": "/pricing", "referrer": null },
    "context": { "page": { "url": "https://example.com/pricing" } }
  })
}

#[test]
fn test_resolution_is_idempotent() {
  let event = sample_event();
  let paths = [
    "$.name",
    "$.properties.path",
    "$.properties.referrer",
    "$.context.page.url",
    "$.context.missing.deeper",
    "@.type",
  ];

  for p in paths {
    let first = resolve_str(&event, p).unwrap().cloned();
    let second = resolve_str(&event, p).unwrap().cloned();
    assert_eq!(first, second, "path {} resolved differently", p);
  }
}

#[test]
fn test_mapping_does_not_mutate_event() {
  let event = sample_event();
  let before = event.clone();

  let mapping = json!({
    "url": { "@path": "$.context.page.url" },
    "title": { "@template": "{{ name }} page" },
    "nested": { "missing": { "@path": "$.nope" } }
  });

  let scope = Scope::new(&event);
  let first = map_value(&mapping, &scope).unwrap();
  let second = map_value(&mapping, &scope).unwrap();

  assert_eq!(event, before);
  assert_eq!(first, second);
  assert_eq!(
    first,
    Some(json!({
      "url": "https://example.com/pricing",
      "title": "Pricing page",
      "nested": {}
    }))
  );
}

#[test]
fn test_each_event_resolves_independently() {
  let mapping = path("$.name");
  let home = json!({ "name": "Home" });
  let about = json!({ "about": true });

  assert_eq!(
    map_value(&mapping, &Scope::new(&home)).unwrap(),
    Some(json!("Home"))
  );
  assert_eq!(map_value(&mapping, &Scope::new(&about)).unwrap(), None);
}
