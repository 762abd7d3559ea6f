use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use outpost_config::{DestinationMode, FieldDef, SubscriptionDef};
use outpost_request::{ExtendedClient, RequestDefaults, SharedClient};
use outpost_schema::{Settings, ValidationError, validate_settings};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::action::{ActionDefinition, ActionManifest};
use crate::error::{ActionError, IntegrationError};

/// How a destination authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
  /// Credentials are plain settings fields.
  Custom,
}

impl fmt::Display for AuthScheme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AuthScheme::Custom => write!(f, "custom"),
    }
  }
}

/// Checks credentials against the partner API.
///
/// Runs once at setup, outside event dispatch.
#[async_trait]
pub trait TestAuthentication<C>: Send + Sync {
  /// Whether the credentials in `settings` are accepted.
  async fn test(&self, client: &C, settings: &Settings) -> Result<bool, ActionError>;
}

pub struct Authentication<C> {
  pub scheme: AuthScheme,
  /// Credential fields, validated together with the destination settings.
  pub fields: Vec<FieldDef>,
  test: Option<Arc<dyn TestAuthentication<C>>>,
}

impl<C> Authentication<C> {
  pub fn new(scheme: AuthScheme, fields: Vec<FieldDef>) -> Self {
    Self {
      scheme,
      fields,
      test: None,
    }
  }

  pub fn custom(fields: Vec<FieldDef>) -> Self {
    Self::new(AuthScheme::Custom, fields)
  }

  pub fn with_test(mut self, test: impl TestAuthentication<C> + 'static) -> Self {
    self.test = Some(Arc::new(test));
    self
  }
}

/// Derives request defaults (auth headers) from settings.
pub type ExtendRequest = Arc<dyn Fn(&Settings) -> RequestDefaults + Send + Sync>;

/// A destination: its settings, authentication and actions.
///
/// Built once by explicit construction and immutable afterwards.
pub struct DestinationDefinition<C> {
  pub name: String,
  pub slug: String,
  pub mode: DestinationMode,
  pub description: String,
  pub settings: Vec<FieldDef>,
  authentication: Option<Authentication<C>>,
  extend_request: Option<ExtendRequest>,
  actions: BTreeMap<String, Arc<ActionDefinition<C>>>,
}

impl<C> DestinationDefinition<C> {
  pub fn new(name: impl Into<String>, slug: impl Into<String>, mode: DestinationMode) -> Self {
    Self {
      name: name.into(),
      slug: slug.into(),
      mode,
      description: String::new(),
      settings: Vec::new(),
      authentication: None,
      extend_request: None,
      actions: BTreeMap::new(),
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn setting(mut self, field: FieldDef) -> Self {
    self.settings.push(field);
    self
  }

  pub fn authentication(mut self, authentication: Authentication<C>) -> Self {
    self.authentication = Some(authentication);
    self
  }

  pub fn extend_request(
    mut self,
    extend: impl Fn(&Settings) -> RequestDefaults + Send + Sync + 'static,
  ) -> Self {
    self.extend_request = Some(Arc::new(extend));
    self
  }

  /// Register an action under its key. A later action with the same key
  /// replaces the earlier one.
  pub fn action(mut self, action: ActionDefinition<C>) -> Self {
    self.actions.insert(action.key.clone(), Arc::new(action));
    self
  }

  pub fn get_action(&self, key: &str) -> Option<&Arc<ActionDefinition<C>>> {
    self.actions.get(key)
  }

  pub fn actions(&self) -> impl Iterator<Item = &Arc<ActionDefinition<C>>> {
    self.actions.values()
  }

  pub fn auth(&self) -> Option<&Authentication<C>> {
    self.authentication.as_ref()
  }

  /// Validate raw settings against the authentication and settings fields.
  pub fn validate_settings(&self, raw: &Value) -> Result<Settings, ValidationError> {
    let mut fields: Vec<FieldDef> = self
      .authentication
      .as_ref()
      .map(|auth| auth.fields.clone())
      .unwrap_or_default();
    fields.extend(self.settings.iter().cloned());

    let settings = validate_settings(&fields, raw)?;
    info!(destination = %self.slug, "settings validated");
    Ok(settings)
  }

  /// Request defaults contributed by `extend_request`, if any.
  pub fn request_defaults(&self, settings: &Settings) -> Option<RequestDefaults> {
    self.extend_request.as_ref().map(|extend| extend(settings))
  }

  /// Run the destination's authentication test.
  ///
  /// Destinations without a test succeed trivially.
  pub async fn test_authentication(&self, client: &C, settings: &Settings) -> Result<(), ActionError> {
    let Some(test) = self.authentication.as_ref().and_then(|auth| auth.test.as_ref()) else {
      return Ok(());
    };

    if test.test(client, settings).await? {
      info!(destination = %self.slug, "authentication succeeded");
      Ok(())
    } else {
      warn!(destination = %self.slug, "authentication rejected");
      Err(
        IntegrationError::new(
          format!("Credentials for {} were rejected", self.name),
          "INVALID_AUTHENTICATION",
          401,
        )
        .into(),
      )
    }
  }

  /// Subscriptions built from each action's default filter.
  pub fn default_subscriptions(&self) -> Vec<SubscriptionDef> {
    self
      .actions
      .values()
      .filter_map(|action| {
        action
          .default_subscription
          .as_ref()
          .map(|subscribe| SubscriptionDef {
            partner_action: action.key.clone(),
            name: action.title.clone(),
            enabled: true,
            subscribe: subscribe.clone(),
            mapping: Default::default(),
          })
      })
      .collect()
  }

  pub fn manifest(&self) -> DestinationManifest {
    DestinationManifest {
      name: self.name.clone(),
      slug: self.slug.clone(),
      mode: self.mode,
      description: self.description.clone(),
      authentication: self.authentication.as_ref().map(|auth| AuthManifest {
        scheme: auth.scheme,
        fields: auth.fields.clone(),
        testable: auth.test.is_some(),
      }),
      settings: self.settings.clone(),
      actions: self.actions.values().map(|a| a.manifest()).collect(),
    }
  }
}

impl DestinationDefinition<SharedClient> {
  /// The client actions of this destination should use.
  ///
  /// Wraps `base` with the destination's request defaults when it has any.
  pub fn request_client(&self, base: SharedClient, settings: &Settings) -> SharedClient {
    match self.request_defaults(settings) {
      Some(defaults) => Arc::new(ExtendedClient::new(base, defaults)),
      None => base,
    }
  }
}

/// Serializable description of a destination, for enumeration tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationManifest {
  pub name: String,
  pub slug: String,
  pub mode: DestinationMode,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub authentication: Option<AuthManifest>,
  pub settings: Vec<FieldDef>,
  pub actions: Vec<ActionManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthManifest {
  pub scheme: AuthScheme,
  pub fields: Vec<FieldDef>,
  pub testable: bool,
}
