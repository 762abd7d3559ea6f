use async_trait::async_trait;
use outpost_action::{ActionDefinition, ActionError, ExecuteContext, Perform, PerformOutput};
use outpost_config::{FieldDef, Platform};
use outpost_mapping::path;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::AdobeTarget;

pub(super) fn action() -> ActionDefinition<AdobeTarget> {
  ActionDefinition::new("triggerView", "Trigger View", TriggerView)
    .description("Record a view")
    .platform(Platform::Web)
    .field(
      FieldDef::string("viewName")
        .label("View Name")
        .description("Name of the view or page.")
        .required()
        .default_value(path("$.name")),
    )
    .field(
      FieldDef::object("pageParameters")
        .label("Page Parameters")
        .description("Parameters specific to the view or page.")
        .default_value(path("$.properties")),
    )
    .field(
      FieldDef::boolean("sendNotification")
        .label("Send Notifications to Adobe Target.")
        .description(
          "When false, no notification is sent to increment the impression count.",
        )
        .default_value(json!(true)),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
  view_name: String,
  page_parameters: Option<Map<String, Value>>,
  send_notification: Option<bool>,
}

struct TriggerView;

#[async_trait]
impl Perform<AdobeTarget> for TriggerView {
  async fn perform(
    &self,
    target: &AdobeTarget,
    ctx: ExecuteContext,
  ) -> Result<PerformOutput, ActionError> {
    let payload: Payload = ctx.payload.parse()?;

    // Page parameters may override `page`.
    let mut options = Map::new();
    options.insert(
      "page".to_string(),
      json!(payload.send_notification.unwrap_or(true)),
    );
    options.extend(payload.page_parameters.unwrap_or_default());

    target
      .trigger_view(&payload.view_name, Value::Object(options))
      .await?;
    Ok(PerformOutput::Empty)
  }
}
