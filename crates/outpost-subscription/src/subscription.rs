use outpost_config::SubscriptionDef;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FilterError;
use crate::filter::Filter;

/// A subscription with its filter parsed.
#[derive(Debug, Clone)]
pub struct Subscription {
  def: SubscriptionDef,
  filter: Filter,
}

impl Subscription {
  /// Parse the subscription's filter.
  pub fn compile(def: SubscriptionDef) -> Result<Self, FilterError> {
    let filter = Filter::parse(&def.subscribe)?;
    debug!(action = %def.partner_action, subscribe = %def.subscribe, "subscription compiled");
    Ok(Self { def, filter })
  }

  /// Key of the action this subscription triggers.
  pub fn partner_action(&self) -> &str {
    &self.def.partner_action
  }

  pub fn name(&self) -> &str {
    &self.def.name
  }

  pub fn enabled(&self) -> bool {
    self.def.enabled
  }

  /// Field overrides applied on top of the action's defaults.
  pub fn mapping(&self) -> &Map<String, Value> {
    &self.def.mapping
  }

  pub fn filter(&self) -> &Filter {
    &self.filter
  }

  pub fn definition(&self) -> &SubscriptionDef {
    &self.def
  }

  /// Whether the subscription is enabled and its filter accepts the event.
  pub fn matches(&self, event: &Value) -> bool {
    self.def.enabled && self.filter.matches(event)
  }
}
