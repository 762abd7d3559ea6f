use serde::{Deserialize, Serialize};

use crate::subscription::SubscriptionDef;

/// A configured instance of a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
  /// Slug of the destination in the registry, e.g. "actions-heap".
  pub destination: String,
  /// Raw settings; validated once against the destination's declarations.
  #[serde(default)]
  pub settings: serde_json::Value,
  /// Subscriptions; when empty, the actions' default subscriptions apply.
  #[serde(default)]
  pub subscriptions: Vec<SubscriptionDef>,
}
