//! Fields shared by the Conversions API actions.

use outpost_config::FieldDef;
use outpost_mapping::path;
use serde_json::{Map, Value, json};

pub(super) const ACTION_SOURCES: [&str; 8] = [
  "email",
  "website",
  "app",
  "phone_call",
  "chat",
  "physical_store",
  "system_generated",
  "other",
];

pub(super) fn action_source() -> FieldDef {
  FieldDef::string("action_source")
    .label("Action Source")
    .description("Where the conversion occurred.")
    .required()
    .choices(ACTION_SOURCES.iter().map(|s| json!(s)))
}

pub(super) fn event_time() -> FieldDef {
  FieldDef::datetime("event_time")
    .label("Event Time")
    .description("When the event took place.")
    .required()
    .default_value(path("$.timestamp"))
}

pub(super) fn event_id() -> FieldDef {
  FieldDef::string("event_id")
    .label("Event ID")
    .description("Used to deduplicate events sent by both the pixel and the Conversions API.")
    .default_value(path("$.messageId"))
}

pub(super) fn event_source_url() -> FieldDef {
  FieldDef::string("event_source_url")
    .label("Event Source URL")
    .description("The browser URL where the event happened.")
    .default_value(path("$.context.page.url"))
}

pub(super) fn user_data() -> FieldDef {
  let mut mapping = Map::new();
  for (key, source) in [
    ("externalId", "$.userId"),
    ("email", "$.context.traits.email"),
    ("phone", "$.context.traits.phone"),
    ("firstName", "$.context.traits.first_name"),
    ("lastName", "$.context.traits.last_name"),
    ("gender", "$.context.traits.gender"),
    ("city", "$.context.traits.address.city"),
    ("state", "$.context.traits.address.state"),
    ("zip", "$.context.traits.address.postal_code"),
    ("country", "$.context.traits.address.country"),
    ("client_ip_address", "$.context.ip"),
    ("client_user_agent", "$.context.userAgent"),
  ] {
    mapping.insert(key.to_string(), path(source));
  }

  FieldDef::object("user_data")
    .label("User Data")
    .description("Customer information used to match the event to a Facebook user.")
    .required()
    .default_value(Value::Object(mapping))
}

pub(super) fn custom_data() -> FieldDef {
  FieldDef::object("custom_data")
    .label("Custom Data")
    .description("Additional business data about the event.")
    .default_value(path("$.properties"))
}
