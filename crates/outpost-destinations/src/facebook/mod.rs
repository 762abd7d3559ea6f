//! Facebook Conversions API.
//!
//! Events are posted to the pixel's `events` edge of the Graph API. The
//! system-user token comes from the environment and is attached to every
//! request through `extend_request`.

mod custom;
mod fields;
mod page_view;
mod user_data;

use async_trait::async_trait;
use outpost_action::{ActionError, Authentication, DestinationDefinition, TestAuthentication};
use outpost_config::{DestinationMode, FieldDef};
use outpost_request::{RequestClient, RequestDefaults, RequestOptions, SharedClient};
use outpost_schema::Settings;

pub use user_data::normalize_user_data;

pub const NAME: &str = "Facebook Conversions API (Actions)";
pub const SLUG: &str = "actions-facebook-conversions-api";

/// Graph API version events are sent to.
pub const API_VERSION: &str = "12.0";

/// Environment variable holding the server-side access token.
pub const TOKEN_ENV: &str = "FB_PIXEL_SERVER_SIDE_AUTH_TOKEN";

pub fn definition() -> DestinationDefinition<SharedClient> {
  DestinationDefinition::new(NAME, SLUG, DestinationMode::Cloud)
    .description("Send web and server events to Facebook through the Conversions API.")
    .authentication(
      Authentication::custom(vec![
        FieldDef::string("pixelId")
          .label("Pixel ID")
          .description("Your Facebook Pixel ID")
          .required(),
      ])
      .with_test(PixelEvents),
    )
    .extend_request(|_settings| request_defaults(std::env::var(TOKEN_ENV).ok()))
    .action(page_view::action())
    .action(custom::action())
}

/// The pixel's events endpoint.
pub fn events_url(pixel_id: &str) -> String {
  format!("https://graph.facebook.com/v{API_VERSION}/{pixel_id}/events")
}

fn request_defaults(token: Option<String>) -> RequestDefaults {
  match token {
    Some(token) if !token.is_empty() => {
      RequestDefaults::default().header("authorization", format!("Bearer {token}"))
    }
    _ => RequestDefaults::default(),
  }
}

/// Authentication passes when the pixel's events edge answers 200.
struct PixelEvents;

#[async_trait]
impl TestAuthentication<SharedClient> for PixelEvents {
  async fn test(&self, client: &SharedClient, settings: &Settings) -> Result<bool, ActionError> {
    let pixel_id = settings.get_str("pixelId").unwrap_or_default();
    let response = client
      .request(
        &events_url(pixel_id),
        RequestOptions::get().throw_http_errors(false),
      )
      .await?;
    Ok(response.status == 200)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_events_url() {
    assert_eq!(
      events_url("123"),
      "https://graph.facebook.com/v12.0/123/events"
    );
  }

  #[test]
  fn test_request_defaults_from_token() {
    let defaults = request_defaults(Some("abc".to_string()));
    assert_eq!(defaults.headers["authorization"], "Bearer abc");
    assert!(request_defaults(None).headers.is_empty());
    assert!(request_defaults(Some(String::new())).headers.is_empty());
  }
}
