use serde::{Deserialize, Serialize};

/// A subscription binds one destination action to a filter over incoming events.
///
/// ```json
/// {
///   "partnerAction": "trackEvent",
///   "name": "Track Event",
///   "enabled": true,
///   "subscribe": "type = \"track\"",
///   "mapping": { "properties": { "@path": "$.properties" } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDef {
  /// Key of the action within its destination.
  pub partner_action: String,
  #[serde(default)]
  pub name: String,
  #[serde(default = "default_enabled")]
  pub enabled: bool,
  /// Filter expression, e.g. `type = "track" or type = "page"`.
  pub subscribe: String,
  /// Per-field overrides; these take precedence over the action's defaults.
  #[serde(default)]
  pub mapping: serde_json::Map<String, serde_json::Value>,
}

fn default_enabled() -> bool {
  true
}
