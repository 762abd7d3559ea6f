use outpost_config::SubscriptionDef;
use outpost_subscription::{Filter, FilterError, Subscription, matches};
use serde_json::{Map, json};

fn subscription(subscribe: &str, enabled: bool) -> SubscriptionDef {
  SubscriptionDef {
    partner_action: "trackEvent".to_string(),
    name: "Track Calls".to_string(),
    enabled,
    subscribe: subscribe.to_string(),
    mapping: Map::new(),
  }
}

const TRACK_PAGE_SCREEN: &str = r#"type = "track" or type = "page" or type = "screen""#;

#[test]
fn test_matches_exactly_track_page_screen() {
  let filter: Filter = TRACK_PAGE_SCREEN.parse().unwrap();

  for kind in ["track", "page", "screen"] {
    assert!(matches(&filter, &json!({ "type": kind })), "{kind} should match");
  }
  for kind in ["identify", "group", "alias", "Track", ""] {
    assert!(!matches(&filter, &json!({ "type": kind })), "{kind} should not match");
  }
  assert!(!matches(&filter, &json!({ "event": "Signed Up" })));
  assert!(!matches(&filter, &json!({ "type": 1 })));
}

#[test]
fn test_disabled_subscription_never_matches() {
  let sub = Subscription::compile(subscription(TRACK_PAGE_SCREEN, false)).unwrap();
  assert!(!sub.matches(&json!({ "type": "track" })));
  assert!(sub.filter().matches(&json!({ "type": "track" })));

  let sub = Subscription::compile(subscription("all", false)).unwrap();
  assert!(!sub.matches(&json!({ "type": "track" })));
}

#[test]
fn test_enabled_subscription_uses_filter() {
  let sub = Subscription::compile(subscription(r#"type = "track""#, true)).unwrap();
  assert_eq!(sub.partner_action(), "trackEvent");
  assert!(sub.matches(&json!({ "type": "track" })));
  assert!(!sub.matches(&json!({ "type": "page" })));
}

#[test]
fn test_unknown_fields_compare_not_equal() {
  let filter: Filter = r#"context.campaign.name = "spring""#.parse().unwrap();
  assert!(!filter.matches(&json!({ "type": "track" })));
  assert!(!filter.matches(&json!({ "context": "not an object" })));
}

#[test]
fn test_evaluation_is_pure() {
  let filter: Filter = TRACK_PAGE_SCREEN.parse().unwrap();
  let event = json!({ "type": "page", "name": "Home" });
  let before = event.clone();

  assert_eq!(filter.matches(&event), filter.matches(&event));
  assert_eq!(event, before);
}

#[test]
fn test_compile_reports_bad_filter() {
  let err = Subscription::compile(subscription(r#"type = "#, true)).unwrap_err();
  assert!(matches!(err, FilterError::UnexpectedEnd { .. }));
}
