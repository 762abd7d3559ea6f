use std::sync::Arc;

use async_trait::async_trait;
use outpost_config::{FieldDef, Platform};
use outpost_schema::{Payload, Settings, ValidationError, validate_payload};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ActionError;
use crate::output::PerformOutput;

/// Everything one action invocation gets besides its capability.
#[derive(Debug, Clone)]
pub struct ExecuteContext {
  /// Payload built for this invocation only.
  pub payload: Payload,
  /// Destination settings, shared read-only across invocations.
  pub settings: Settings,
  pub invocation_id: String,
}

/// The body of an action.
///
/// `C` is the capability the action works through: a request client for
/// cloud destinations, the vendor client for web destinations.
#[async_trait]
pub trait Perform<C>: Send + Sync {
  async fn perform(&self, client: &C, ctx: ExecuteContext) -> Result<PerformOutput, ActionError>;
}

/// A named action with its field declarations.
pub struct ActionDefinition<C> {
  pub key: String,
  pub title: String,
  pub description: String,
  pub platform: Platform,
  /// Filter used when no subscription is configured for this action.
  pub default_subscription: Option<String>,
  pub fields: Vec<FieldDef>,
  perform: Arc<dyn Perform<C>>,
}

impl<C> ActionDefinition<C> {
  pub fn new(
    key: impl Into<String>,
    title: impl Into<String>,
    perform: impl Perform<C> + 'static,
  ) -> Self {
    Self {
      key: key.into(),
      title: title.into(),
      description: String::new(),
      platform: Platform::Cloud,
      default_subscription: None,
      fields: Vec::new(),
      perform: Arc::new(perform),
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn platform(mut self, platform: Platform) -> Self {
    self.platform = platform;
    self
  }

  pub fn default_subscription(mut self, subscribe: impl Into<String>) -> Self {
    self.default_subscription = Some(subscribe.into());
    self
  }

  pub fn field(mut self, field: FieldDef) -> Self {
    self.fields.push(field);
    self
  }

  /// Build this action's payload for an event.
  ///
  /// `overrides` come from the subscription's mapping and win over the
  /// field defaults.
  pub fn validate(
    &self,
    overrides: &Map<String, Value>,
    event: &Value,
  ) -> Result<Payload, ValidationError> {
    validate_payload(&self.fields, overrides, event)
  }

  pub async fn perform(&self, client: &C, ctx: ExecuteContext) -> Result<PerformOutput, ActionError> {
    self.perform.perform(client, ctx).await
  }

  pub fn manifest(&self) -> ActionManifest {
    ActionManifest {
      key: self.key.clone(),
      title: self.title.clone(),
      description: self.description.clone(),
      platform: self.platform,
      default_subscription: self.default_subscription.clone(),
      fields: self.fields.clone(),
    }
  }
}

/// Serializable description of an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionManifest {
  pub key: String,
  pub title: String,
  pub description: String,
  pub platform: Platform,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_subscription: Option<String>,
  pub fields: Vec<FieldDef>,
}
