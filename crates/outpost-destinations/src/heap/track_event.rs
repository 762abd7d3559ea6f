use async_trait::async_trait;
use futures::future::{BoxFuture, join_all};
use outpost_action::{
  ActionDefinition, ActionError, ExecuteContext, IntegrationError, Perform, PerformOutput,
};
use outpost_config::FieldDef;
use outpost_mapping::path;
use outpost_request::{RequestClient, RequestError, RequestOptions, Response, SharedClient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use super::flat::flat;
use super::utils::{event_name, is_defined, user_identifier};
use super::{ADD_USER_PROPERTIES_URL, LIBRARY_NAME, TRACK_URL};

pub(super) fn action() -> ActionDefinition<SharedClient> {
  ActionDefinition::new("trackEvent", "Track Event", TrackEvent)
    .description("Send an event to Heap.")
    .default_subscription(r#"type = "track" or type = "page" or type = "screen""#)
    .field(
      FieldDef::string("message_id")
        .label("Message ID")
        .description("Unique event ID generated by Segment.")
        .required()
        .default_value(path("$.messageId")),
    )
    .field(
      FieldDef::string("identity")
        .label("Identity")
        .description(
          "A string that uniquely identifies a user, such as an email, handle, or username.",
        )
        .allow_null(),
    )
    .field(
      FieldDef::string("anonymous_id")
        .label("Anonymous ID")
        .description("The generated anonymous ID for the user.")
        .allow_null()
        .default_value(path("$.anonymousId")),
    )
    .field(
      FieldDef::string("event")
        .label("Track Event Type")
        .description("Name of the user action. This only exists on track events.")
        .default_value(path("$.event")),
    )
    .field(
      FieldDef::object("properties")
        .label("Event Properties")
        .description("Key-value properties associated with the event.")
        .default_value(path("$.properties")),
    )
    .field(
      FieldDef::datetime("timestamp")
        .label("Timestamp")
        .description("Defaults to the current time if not provided.")
        .default_value(path("$.timestamp")),
    )
    .field(
      FieldDef::string("type")
        .label("Type")
        .description("The type of call. Can be track, page, or screen.")
        .default_value(path("$.type")),
    )
    .field(
      FieldDef::string("name")
        .label("Page or Screen Name")
        .description("The name of the page or screen being viewed.")
        .default_value(path("$.name")),
    )
    .field(
      FieldDef::object("traits")
        .label("User Properties")
        .description("Key-value properties associated with the user.")
        .default_value(path("$.context.traits")),
    )
}

#[derive(Debug, Deserialize)]
struct Payload {
  message_id: String,
  identity: Option<String>,
  anonymous_id: Option<String>,
  event: Option<String>,
  properties: Option<Map<String, Value>>,
  timestamp: Option<String>,
  #[serde(rename = "type")]
  kind: Option<String>,
  name: Option<String>,
  traits: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
  app_id: String,
}

#[derive(Debug, Serialize)]
struct HeapEvent {
  event: String,
  custom_properties: Map<String, Value>,
  idempotency_key: String,
  user_identifier: Map<String, Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  timestamp: Option<String>,
}

pub(super) struct TrackEvent;

#[async_trait]
impl Perform<SharedClient> for TrackEvent {
  async fn perform(
    &self,
    client: &SharedClient,
    ctx: ExecuteContext,
  ) -> Result<PerformOutput, ActionError> {
    let payload: Payload = ctx.payload.parse()?;
    let settings: Settings = ctx.settings.parse()?;

    let identity = payload.identity.as_deref();
    let anonymous_id = payload.anonymous_id.as_deref();
    if !is_defined(identity) && !is_defined(anonymous_id) {
      return Err(
        IntegrationError::new(
          "Either Anonymous id or Identity should be specified.",
          "MISSING_REQUIRED_FIELD",
          400,
        )
        .into(),
      );
    }

    let mut custom_properties = Map::new();
    custom_properties.insert("segment_library".to_string(), json!(LIBRARY_NAME));
    if let Some(properties) = &payload.properties {
      custom_properties.extend(flat(properties));
    }
    if let Some(name) = payload.name.as_deref().filter(|n| !n.is_empty()) {
      custom_properties.insert("name".to_string(), json!(name));
    }

    let event = HeapEvent {
      event: event_name(
        payload.kind.as_deref(),
        payload.event.as_deref(),
        payload.name.as_deref(),
      ),
      custom_properties,
      idempotency_key: payload.message_id.clone(),
      user_identifier: user_identifier(identity, anonymous_id),
      timestamp: payload.timestamp.clone(),
    };

    let track = json!({
      "app_id": settings.app_id,
      "events": [event],
      "library": "server",
    });

    let traits = payload.traits.as_ref().filter(|t| !t.is_empty());
    let mut requests: Vec<BoxFuture<'_, Result<Response, RequestError>>> = Vec::new();

    if is_defined(identity) && (is_defined(anonymous_id) || traits.is_some()) {
      let mut properties = Map::new();
      if let Some(anonymous_id) = anonymous_id.filter(|a| !a.is_empty()) {
        properties.insert("anonymous_id".to_string(), json!(anonymous_id));
      }
      if let Some(traits) = traits {
        properties.extend(flat(traits));
      }
      let user_properties = json!({
        "app_id": settings.app_id,
        "identity": identity,
        "properties": properties,
      });
      debug!(invocation_id = %ctx.invocation_id, "adding user properties");
      requests.push(client.request(
        ADD_USER_PROPERTIES_URL,
        RequestOptions::post().json(user_properties),
      ));
    }

    requests.push(client.request(TRACK_URL, RequestOptions::post().json(track)));

    // Every request is issued even when an earlier one fails.
    let responses = join_all(requests)
      .await
      .into_iter()
      .collect::<Result<Vec<_>, _>>()?;
    Ok(PerformOutput::Responses(responses))
  }
}
