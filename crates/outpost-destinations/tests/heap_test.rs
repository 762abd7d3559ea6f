use std::sync::Arc;

use outpost_action::{ActionError, Dispatcher, Outcome};
use outpost_config::SubscriptionDef;
use outpost_destinations::heap;
use outpost_request::{MockClient, SharedClient};
use outpost_subscription::Subscription;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

fn subscriptions(mapping: Value) -> Vec<Subscription> {
  let mapping: Map<String, Value> = serde_json::from_value(mapping).unwrap();
  vec![
    Subscription::compile(SubscriptionDef {
      partner_action: "trackEvent".to_string(),
      name: "Track Calls".to_string(),
      enabled: true,
      subscribe: r#"type = "track" or type = "page" or type = "screen""#.to_string(),
      mapping,
    })
    .unwrap(),
  ]
}

async fn dispatch(event: Value, mapping: Value) -> (Arc<MockClient>, Outcome) {
  let destination = Arc::new(heap::definition());
  let settings = destination
    .validate_settings(&json!({ "appId": "app-1" }))
    .unwrap();
  let mock = Arc::new(MockClient::new());
  let client: SharedClient = mock.clone();

  let mut result = Dispatcher::new(destination)
    .dispatch(
      &event,
      &subscriptions(mapping),
      &settings,
      &client,
      CancellationToken::new(),
    )
    .await
    .unwrap();

  assert_eq!(result.results.len(), 1);
  let outcome = result.results.remove(0).outcome;
  (mock, outcome)
}

#[tokio::test]
async fn test_missing_identity_fails_before_any_request() {
  let event = json!({
    "type": "track",
    "event": "Signed Up",
    "messageId": "m-1",
    "properties": { "plan": "pro" }
  });

  let (mock, outcome) = dispatch(event, json!({})).await;

  match outcome {
    Outcome::Failed {
      error: ActionError::Integration(error),
    } => {
      assert_eq!(error.message, "Either Anonymous id or Identity should be specified.");
      assert_eq!(error.code, "MISSING_REQUIRED_FIELD");
      assert_eq!(error.status, 400);
    }
    other => panic!("unexpected outcome: {other:?}"),
  }
  assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_identity_and_traits_send_two_requests() {
  let event = json!({
    "type": "track",
    "event": "Signed Up",
    "messageId": "m-1",
    "userId": "u1",
    "timestamp": "2022-01-02T03:04:05Z",
    "properties": { "cart": { "total": 10 }, "tags": ["a"] },
    "context": { "traits": { "plan": "pro", "company": { "name": "Acme" } } }
  });

  let (mock, outcome) = dispatch(event, json!({ "identity": { "@path": "$.userId" } })).await;

  match &outcome {
    Outcome::Succeeded { output } => assert_eq!(output.as_array().map(Vec::len), Some(2)),
    other => panic!("unexpected outcome: {other:?}"),
  }

  let requests = mock.requests();
  assert_eq!(requests.len(), 2);

  assert_eq!(requests[0].url, heap::ADD_USER_PROPERTIES_URL);
  assert_eq!(
    requests[0].options.json,
    Some(json!({
      "app_id": "app-1",
      "identity": "u1",
      "properties": { "plan": "pro", "company.name": "Acme" }
    }))
  );

  assert_eq!(requests[1].url, heap::TRACK_URL);
  assert_eq!(
    requests[1].options.json,
    Some(json!({
      "app_id": "app-1",
      "library": "server",
      "events": [{
        "event": "Signed Up",
        "idempotency_key": "m-1",
        "user_identifier": { "identity": "u1" },
        "timestamp": "2022-01-02T03:04:05.000Z",
        "custom_properties": {
          "segment_library": heap::LIBRARY_NAME,
          "cart.total": 10,
          "tags": "[\"a\"]"
        }
      }]
    }))
  );
}

#[tokio::test]
async fn test_anonymous_user_sends_track_only() {
  let event = json!({
    "type": "page",
    "name": "Pricing",
    "messageId": "m-2",
    "anonymousId": "anon-1"
  });

  let (mock, outcome) = dispatch(event, json!({})).await;
  assert!(matches!(outcome, Outcome::Succeeded { .. }));

  let requests = mock.requests();
  assert_eq!(requests.len(), 1);
  let body = requests[0].options.json.as_ref().unwrap();
  let sent = &body["events"][0];
  assert_eq!(sent["event"], "Pricing page viewed");
  assert_eq!(sent["custom_properties"]["name"], "Pricing");
  assert_eq!(sent["user_identifier"], json!({ "anonymous_id": "anon-1" }));
  assert!(sent.get("timestamp").is_none());
}

#[tokio::test]
async fn test_identity_with_anonymous_id_adds_it_to_user_properties() {
  let event = json!({
    "type": "screen",
    "messageId": "m-3",
    "userId": "u1",
    "anonymousId": "anon-1"
  });

  let (mock, _) = dispatch(event, json!({ "identity": { "@path": "$.userId" } })).await;

  let requests = mock.requests();
  assert_eq!(requests.len(), 2);
  assert_eq!(
    requests[0].options.json.as_ref().unwrap()["properties"],
    json!({ "anonymous_id": "anon-1" })
  );
  assert_eq!(
    requests[1].options.json.as_ref().unwrap()["events"][0]["event"],
    "Screen viewed"
  );
}

#[tokio::test]
async fn test_default_subscription_ignores_identify() {
  let destination = heap::definition();
  let defaults = destination.default_subscriptions();
  assert_eq!(defaults.len(), 1);

  let subscription = Subscription::compile(defaults[0].clone()).unwrap();
  assert!(subscription.matches(&json!({ "type": "screen" })));
  assert!(!subscription.matches(&json!({ "type": "identify" })));
}

#[test]
fn test_settings_require_app_id() {
  let err = heap::definition().validate_settings(&json!({})).unwrap_err();
  assert_eq!(err.field(), "appId");
}

#[tokio::test]
async fn test_failed_user_properties_still_sends_track() {
  let destination = Arc::new(heap::definition());
  let settings = destination
    .validate_settings(&json!({ "appId": "app-1" }))
    .unwrap();
  let mock = Arc::new(MockClient::new().with_response(
    heap::ADD_USER_PROPERTIES_URL,
    500,
    json!({ "error": "unavailable" }),
  ));
  let client: SharedClient = mock.clone();

  let event = json!({
    "type": "track",
    "event": "Signed Up",
    "messageId": "m-4",
    "userId": "u1",
    "context": { "traits": { "plan": "pro" } }
  });

  let mut result = Dispatcher::new(destination)
    .dispatch(
      &event,
      &subscriptions(json!({ "identity": { "@path": "$.userId" } })),
      &settings,
      &client,
      CancellationToken::new(),
    )
    .await
    .unwrap();

  match result.results.remove(0).outcome {
    Outcome::Failed {
      error: ActionError::Request(error),
    } => assert_eq!(error.status(), Some(500)),
    other => panic!("unexpected outcome: {other:?}"),
  }

  let urls: Vec<_> = mock.requests().into_iter().map(|r| r.url).collect();
  assert_eq!(urls, vec![heap::ADD_USER_PROPERTIES_URL, heap::TRACK_URL]);
}
