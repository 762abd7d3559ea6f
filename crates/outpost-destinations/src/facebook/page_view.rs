use async_trait::async_trait;
use outpost_action::{ActionDefinition, ActionError, ExecuteContext, Perform, PerformOutput};
use outpost_request::{RequestClient, RequestOptions, SharedClient};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::events_url;
use super::fields;
use super::user_data::normalize_user_data;

pub(super) fn action() -> ActionDefinition<SharedClient> {
  ActionDefinition::new("pageView", "Page View", PageView)
    .description("Send a page view event when a user lands on a page.")
    .default_subscription(r#"type = "page""#)
    .field(fields::action_source())
    .field(fields::event_time())
    .field(fields::user_data())
    .field(fields::event_id())
    .field(fields::event_source_url())
}

#[derive(Debug, Deserialize)]
struct Payload {
  action_source: String,
  event_time: String,
  user_data: Map<String, Value>,
  event_id: Option<String>,
  event_source_url: Option<String>,
}

struct PageView;

#[async_trait]
impl Perform<SharedClient> for PageView {
  async fn perform(
    &self,
    client: &SharedClient,
    ctx: ExecuteContext,
  ) -> Result<PerformOutput, ActionError> {
    let payload: Payload = ctx.payload.parse()?;
    let pixel_id = ctx.settings.get_str("pixelId").unwrap_or_default();
    let user_data = normalize_user_data(&payload.user_data)?;

    let mut event = json!({
      "event_name": "PageView",
      "event_time": payload.event_time,
      "action_source": payload.action_source,
      "user_data": user_data,
    });
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
