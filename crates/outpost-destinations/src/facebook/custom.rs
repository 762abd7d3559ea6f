use async_trait::async_trait;
use outpost_action::{ActionDefinition, ActionError, ExecuteContext, Perform, PerformOutput};
use outpost_config::FieldDef;
use outpost_mapping::path;
use outpost_request::{RequestClient, RequestOptions, SharedClient};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::events_url;
use super::fields;
use super::user_data::normalize_user_data;

pub(super) fn action() -> ActionDefinition<SharedClient> {
  ActionDefinition::new("custom", "Custom Event", CustomEvent)
    .description("Send a custom event under any event name.")
    .field(
      FieldDef::string("event_name")
        .label("Event Name")
        .description("A Facebook pixel standard event or custom event name.")
        .required()
        .default_value(path("$.event")),
    )
    .field(fields::action_source())
    .field(fields::event_time())
    .field(fields::user_data())
    .field(fields::custom_data())
    .field(fields::event_id())
    .field(fields::event_source_url())
}

#[derive(Debug, Deserialize)]
struct Payload {
  event_name: String,
  action_source: String,
  event_time: String,
  user_data: Map<String, Value>,
  custom_data: Option<Map<String, Value>>,
  event_id: Option<String>,
  event_source_url: Option<String>,
}

struct CustomEvent;

#[async_trait]
impl Perform<SharedClient> for CustomEvent {
  async fn perform(
    &self,
    client: &SharedClient,
    ctx: ExecuteContext,
  ) -> Result<PerformOutput, ActionError> {
    let payload: Payload = ctx.payload.parse()?;
    let pixel_id = ctx.settings.get_str("pixelId").unwrap_or_default();
    let user_data = normalize_user_data(&payload.user_data)?;

    let mut event = json!({
      "event_name": payload.event_name,
      "event_time": payload.event_time,
      "action_source": payload.action_source,
      "user_data": user_data,
    });
    if let Some(custom_data) = payload.custom_data.filter(|c| !c.is_empty()) {
      event["custom_data"] = Value::Object(custom_data);
    }
    if let Some(event_id) = payload.event_id {
      event["event_id"] = json!(event_id);
    }
    if let Some(url) = payload.event_source_url {
      event["event_source_url"] = json!(url);
    }

    let response = client
      .request(
        &events_url(pixel_id),
        RequestOptions::post().json(json!({ "data": [event] })),
      )
      .await?;
    Ok(response.into())
  }
}
