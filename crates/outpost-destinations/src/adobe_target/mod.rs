//! Adobe Target (at.js).
//!
//! A web destination: at.js is downloaded from the account's admin host and
//! actions call into `adobe.target` in the page.

mod track_event;
mod trigger_view;

use std::sync::Arc;

use async_trait::async_trait;
use outpost_action::{
  ActionError, BrowserDestination, DestinationDefinition, Initialize, WebRuntime,
};
use outpost_config::{DestinationMode, FieldDef};
use outpost_schema::Settings;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

pub const NAME: &str = "Adobe Target Web";
pub const SLUG: &str = "actions-adobe-target-web";

pub const DEFAULT_MBOX: &str = "target-global-mbox";

/// Handle on `adobe.target` in the page.
#[derive(Clone)]
pub struct AdobeTarget {
  runtime: Arc<dyn WebRuntime>,
}

impl AdobeTarget {
  pub fn new(runtime: Arc<dyn WebRuntime>) -> Self {
    Self { runtime }
  }

  /// `adobe.target.trackEvent(options)`
  pub async fn track_event(&self, options: Value) -> Result<(), ActionError> {
    self
      .runtime
      .invoke("adobe.target.trackEvent", vec![options])
      .await?;
    Ok(())
  }

  /// `adobe.target.triggerView(viewName, options)`
  pub async fn trigger_view(&self, view_name: &str, options: Value) -> Result<(), ActionError> {
    self
      .runtime
      .invoke("adobe.target.triggerView", vec![json!(view_name), options])
      .await?;
    Ok(())
  }
}

#[derive(Debug, Deserialize)]
struct TargetSettings {
  client_code: String,
  admin_number: String,
  version: String,
}

/// URL at.js is downloaded from for an account.
pub fn script_url(admin_number: &str, client_code: &str, version: &str) -> String {
  format!(
    "https://admin{admin_number}.testandtarget.omniture.com/admin/rest/v1/libraries/atjs/download?client={client_code}&version={version}"
  )
}

struct LoadAtJs;

#[async_trait]
impl Initialize<AdobeTarget> for LoadAtJs {
  async fn initialize(
    &self,
    settings: &Settings,
    runtime: Arc<dyn WebRuntime>,
  ) -> Result<AdobeTarget, ActionError> {
    let settings: TargetSettings = settings.parse()?;
    let src = script_url(&settings.admin_number, &settings.client_code, &settings.version);
    runtime.load_script(&src).await?;
    info!(%src, "at.js loaded");
    Ok(AdobeTarget::new(runtime))
  }
}

pub fn definition() -> DestinationDefinition<AdobeTarget> {
  DestinationDefinition::new(NAME, SLUG, DestinationMode::Web)
    .description("Personalise pages and record conversions with Adobe Target.")
    .setting(
      FieldDef::string("client_code")
        .label("Client Code")
        .description("Your Adobe Target client code.")
        .required(),
    )
    .setting(
      FieldDef::string("admin_number")
        .label("Admin Number")
        .description("Number of the admin host at.js is downloaded from.")
        .required()
        .default_value(json!("10")),
    )
    .setting(
      FieldDef::string("version")
        .label("at.js Version")
        .description("Version of at.js to load.")
        .required(),
    )
    .setting(
      FieldDef::string("cookie_domain")
        .label("Cookie Domain")
        .description("Domain the at.js cookies are written to."),
    )
    .setting(
      FieldDef::string("mbox_name")
        .label("Mbox Name")
        .description("Name of the global mbox that receives tracked events.")
        .required()
        .default_value(json!(DEFAULT_MBOX)),
    )
    .action(track_event::action())
    .action(trigger_view::action())
}

pub fn destination() -> BrowserDestination<AdobeTarget> {
  BrowserDestination::new(definition(), LoadAtJs)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_script_url() {
    assert_eq!(
      script_url("10", "segmentexchangepartn", "2.8.0"),
      "https://admin10.testandtarget.omniture.com/admin/rest/v1/libraries/atjs/download?client=segmentexchangepartn&version=2.8.0"
    );
  }
}
