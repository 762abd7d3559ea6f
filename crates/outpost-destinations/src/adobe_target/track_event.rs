use async_trait::async_trait;
use outpost_action::{ActionDefinition, ActionError, ExecuteContext, Perform, PerformOutput};
use outpost_config::{FieldDef, Platform};
use outpost_mapping::path;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{AdobeTarget, DEFAULT_MBOX};

pub(super) fn action() -> ActionDefinition<AdobeTarget> {
  ActionDefinition::new("trackEvent", "Track Event", TrackEvent)
    .description("Track an event")
    .platform(Platform::Web)
    .default_subscription(r#"type = "track""#)
    .field(
      FieldDef::string("type")
        .label("Event Name")
        .description("Event type or name.")
        .default_value(path("@.type")),
    )
    .field(
      FieldDef::object("properties")
        .label("Event Parameters")
        .description("Parameters specific to the event.")
        .default_value(path("@.properties")),
    )
}

#[derive(Debug, Deserialize)]
struct Payload {
  #[serde(rename = "type")]
  kind: Option<String>,
  properties: Option<Map<String, Value>>,
}

struct TrackEvent;

#[async_trait]
impl Perform<AdobeTarget> for TrackEvent {
  async fn perform(
    &self,
    target: &AdobeTarget,
    ctx: ExecuteContext,
  ) -> Result<PerformOutput, ActionError> {
    let payload: Payload = ctx.payload.parse()?;

    let mut params = payload.properties.unwrap_or_default();
    if let Some(kind) = payload.kind {
      params.insert("event_name".to_string(), json!(kind));
    }

    let mbox = ctx.settings.get_str("mbox_name").unwrap_or(DEFAULT_MBOX);
    target
      .track_event(json!({
        "mbox": mbox,
        "preventDefault": true,
        "params": params,
        "type": "click",
      }))
      .await?;

    Ok(PerformOutput::Empty)
  }
}
