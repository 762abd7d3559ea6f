//! Payload validation behaviour.

use outpost_config::{FieldDef, FieldType};
use outpost_mapping::path;
use outpost_schema::{ValidationError, validate_payload, validate_settings};
use serde_json::{Map, Value, json};

fn no_overrides() -> Map<String, Value> {
  Map::new()
}

fn track_event() -> Value {
  json!({
    "type": "track",
    "event": "Signed Up",
    "messageId": "msg-1",
    "anonymousId": null,
    "timestamp": "2022-01-02T03:04:05Z",
    "properties": { "plan": "pro" }
  })
}

#[test]
fn test_literal_default_used_when_path_missing() {
  let fields = vec![
    FieldDef::boolean("send_notification").default_value(json!(true)),
    FieldDef::string("label").default_value(json!("fixed")),
  ];

  let payload = validate_payload(&fields, &no_overrides(), &json!({ "type": "page" })).unwrap();

  assert_eq!(payload.get("send_notification"), Some(&json!(true)));
  assert_eq!(payload.get_str("label"), Some("fixed"));
}

#[test]
fn test_missing_required_field() {
  let fields = vec![
    FieldDef::string("view_name")
      .required()
      .default_value(path("$.name")),
  ];

  let err = validate_payload(&fields, &no_overrides(), &track_event()).unwrap_err();

  assert!(matches!(
    err,
    ValidationError::MissingRequiredField { ref field } if field == "view_name"
  ));
  assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
}

#[test]
fn test_required_without_default_is_missing() {
  let fields = vec![FieldDef::string("identity").required()];
  let err = validate_payload(&fields, &no_overrides(), &track_event()).unwrap_err();
  assert_eq!(err.field(), "identity");
}

#[test]
fn test_absent_optional_field_is_omitted() {
  let fields = vec![FieldDef::string("name").default_value(path("$.name"))];
  let payload = validate_payload(&fields, &no_overrides(), &track_event()).unwrap();
  assert!(!payload.contains("name"));
}

#[test]
fn test_null_without_allow_null_is_absent() {
  let optional = vec![FieldDef::string("anonymous_id").default_value(path("$.anonymousId"))];
  let payload = validate_payload(&optional, &no_overrides(), &track_event()).unwrap();
  assert!(!payload.contains("anonymous_id"));

  let required = vec![
    FieldDef::string("anonymous_id")
      .required()
      .default_value(path("$.anonymousId")),
  ];
  let err = validate_payload(&required, &no_overrides(), &track_event()).unwrap_err();
  assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
}

#[test]
fn test_null_with_allow_null_is_kept() {
  let fields = vec![
    FieldDef::string("anonymous_id")
      .allow_null()
      .default_value(path("$.anonymousId")),
  ];
  let payload = validate_payload(&fields, &no_overrides(), &track_event()).unwrap();
  assert_eq!(payload.get("anonymous_id"), Some(&Value::Null));
}

#[test]
fn test_datetime_field_is_normalised() {
  let fields = vec![FieldDef::datetime("timestamp").default_value(path("$.timestamp"))];
  let payload = validate_payload(&fields, &no_overrides(), &track_event()).unwrap();
  assert_eq!(payload.get_str("timestamp"), Some("2022-01-02T03:04:05.000Z"));
}

#[test]
fn test_type_mismatch_names_field() {
  let fields = vec![FieldDef::object("properties").default_value(path("$.event"))];
  let err = validate_payload(&fields, &no_overrides(), &track_event()).unwrap_err();
  match err {
    ValidationError::TypeMismatch {
      field,
      expected,
      found,
    } => {
      assert_eq!(field, "properties");
      assert_eq!(expected, FieldType::Object);
      assert_eq!(found, "string");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_override_takes_precedence_over_default() {
  let fields = vec![FieldDef::string("event").default_value(path("$.event"))];
  let mut overrides = Map::new();
  overrides.insert("event".to_string(), json!({ "@template": "{{ event }} (web)" }));

  let payload = validate_payload(&fields, &overrides, &track_event()).unwrap();
  assert_eq!(payload.get_str("event"), Some("Signed Up (web)"));
}

#[test]
fn test_fail_fast_reports_first_declared_field() {
  let fields = vec![
    FieldDef::string("first").required(),
    FieldDef::string("second").required(),
  ];
  let err = validate_payload(&fields, &no_overrides(), &json!({})).unwrap_err();
  assert_eq!(err.field(), "first");
}

#[test]
fn test_choices_are_enforced() {
  let fields = vec![
    FieldDef::string("action_source")
      .choices([json!("website"), json!("app")])
      .default_value(json!("email")),
  ];
  let err = validate_payload(&fields, &no_overrides(), &json!({})).unwrap_err();
  assert!(matches!(err, ValidationError::InvalidChoice { .. }));
}

#[test]
fn test_payload_parses_into_struct() {
  #[derive(serde::Deserialize)]
  struct Track {
    message_id: String,
    properties: Value,
  }

  let fields = vec![
    FieldDef::string("message_id")
      .required()
      .default_value(path("$.messageId")),
    FieldDef::object("properties").default_value(path("$.properties")),
  ];
  let payload = validate_payload(&fields, &no_overrides(), &track_event()).unwrap();
  let track: Track = payload.parse().unwrap();

  assert_eq!(track.message_id, "msg-1");
  assert_eq!(track.properties, json!({ "plan": "pro" }));
}

#[test]
fn test_settings_validation() {
  let fields = vec![
    FieldDef::string("client_code").required(),
    FieldDef::string("version").default_value(json!("2.8.0")),
  ];

  let settings = validate_settings(
    &fields,
    &json!({ "client_code": "segmentexchangepartn", "undeclared": 1 }),
  )
  .unwrap();

  assert_eq!(settings.get_str("client_code"), Some("segmentexchangepartn"));
  assert_eq!(settings.get_str("version"), Some("2.8.0"));
  assert!(settings.get("undeclared").is_none());

  let err = validate_settings(&fields, &json!({})).unwrap_err();
  assert_eq!(err.field(), "client_code");

  let err = validate_settings(&fields, &json!("nope")).unwrap_err();
  assert!(matches!(err, ValidationError::TypeMismatch { .. }));
}
