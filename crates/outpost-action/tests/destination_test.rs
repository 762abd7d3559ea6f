use std::sync::Arc;

use async_trait::async_trait;
use outpost_action::{
  ActionDefinition, ActionError, AuthScheme, Authentication, BrowserDestination,
  DestinationDefinition, ExecuteContext, Initialize, Perform, PerformOutput, RecordingRuntime,
  RuntimeCall, TestAuthentication, WebRuntime,
};
use outpost_config::{DestinationMode, FieldDef, Platform};
use outpost_request::{MockClient, RequestClient, RequestDefaults, RequestOptions, SharedClient};
use outpost_schema::Settings;
use serde_json::json;

struct Noop;

#[async_trait]
impl Perform<SharedClient> for Noop {
  async fn perform(
    &self,
    _client: &SharedClient,
    _ctx: ExecuteContext,
  ) -> Result<PerformOutput, ActionError> {
    Ok(PerformOutput::Empty)
  }
}

struct PingStatus;

#[async_trait]
impl TestAuthentication<SharedClient> for PingStatus {
  async fn test(&self, client: &SharedClient, settings: &Settings) -> Result<bool, ActionError> {
    let key = settings.get_str("api_key").unwrap_or_default();
    let response = client
      .request(
        &format!("https://api.test/keys/{key}"),
        RequestOptions::get().throw_http_errors(false),
      )
      .await?;
    Ok(response.status == 200)
  }
}

fn destination() -> DestinationDefinition<SharedClient> {
  DestinationDefinition::new("Example", "example", DestinationMode::Cloud)
    .description("Example destination")
    .authentication(
      Authentication::custom(vec![FieldDef::string("api_key").required()]).with_test(PingStatus),
    )
    .setting(FieldDef::string("region").default_value(json!("us")))
    .extend_request(|settings| {
      RequestDefaults::default().header(
        "authorization",
        format!("Bearer {}", settings.get_str("api_key").unwrap_or_default()),
      )
    })
    .action(
      ActionDefinition::new("track", "Track", Noop)
        .description("Send a track call")
        .default_subscription(r#"type = "track""#)
        .field(FieldDef::string("event")),
    )
    .action(ActionDefinition::new("manual", "Manual", Noop))
}

#[test]
fn test_validate_settings_covers_auth_fields() {
  let destination = destination();

  let settings = destination
    .validate_settings(&json!({ "api_key": "k1" }))
    .unwrap();
  assert_eq!(settings.get_str("api_key"), Some("k1"));
  assert_eq!(settings.get_str("region"), Some("us"));

  let err = destination.validate_settings(&json!({})).unwrap_err();
  assert_eq!(err.field(), "api_key");
}

#[tokio::test]
async fn test_authentication_hook() {
  let destination = destination();
  let settings = destination
    .validate_settings(&json!({ "api_key": "good" }))
    .unwrap();

  let mock = Arc::new(MockClient::new().with_response("https://api.test/keys/bad", 401, json!({})));
  let client: SharedClient = mock.clone();
  destination.test_authentication(&client, &settings).await.unwrap();

  let bad = destination
    .validate_settings(&json!({ "api_key": "bad" }))
    .unwrap();
  let err = destination
    .test_authentication(&client, &bad)
    .await
    .unwrap_err();
  assert_eq!(err.code(), "INVALID_AUTHENTICATION");
  assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_request_client_applies_extend_request() {
  let destination = destination();
  let settings = destination
    .validate_settings(&json!({ "api_key": "secret" }))
    .unwrap();
  let mock = Arc::new(MockClient::new());
  let base: SharedClient = mock.clone();

  let client = destination.request_client(base, &settings);
  client
    .request("https://api.test/track", RequestOptions::post())
    .await
    .unwrap();

  assert_eq!(
    mock.requests()[0].options.headers["authorization"],
    "Bearer secret"
  );
}

#[test]
fn test_manifest_and_default_subscriptions() {
  let destination = destination();
  let manifest = destination.manifest();

  assert_eq!(manifest.slug, "example");
  assert_eq!(manifest.actions.len(), 2);
  let auth = manifest.authentication.as_ref().unwrap();
  assert_eq!(auth.scheme, AuthScheme::Custom);
  assert!(auth.testable);

  let value = serde_json::to_value(&manifest).unwrap();
  assert_eq!(value["mode"], "cloud");
  assert_eq!(value["authentication"]["scheme"], "custom");
  assert_eq!(value["actions"][1]["defaultSubscription"], r#"type = "track""#);

  let defaults = destination.default_subscriptions();
  assert_eq!(defaults.len(), 1);
  assert_eq!(defaults[0].partner_action, "track");
  assert!(defaults[0].enabled);
}

#[derive(Clone)]
struct Vendor {
  runtime: Arc<dyn WebRuntime>,
}

struct LoadVendor;

#[async_trait]
impl Initialize<Vendor> for LoadVendor {
  async fn initialize(
    &self,
    settings: &Settings,
    runtime: Arc<dyn WebRuntime>,
  ) -> Result<Vendor, ActionError> {
    let version = settings.get_str("version").unwrap_or("1");
    runtime
      .load_script(&format!("https://cdn.vendor.test/sdk-{version}.js"))
      .await?;
    Ok(Vendor { runtime })
  }
}

struct Ping;

#[async_trait]
impl Perform<Vendor> for Ping {
  async fn perform(&self, vendor: &Vendor, ctx: ExecuteContext) -> Result<PerformOutput, ActionError> {
    let output = vendor
      .runtime
      .invoke("vendor.ping", vec![ctx.payload.to_value()])
      .await?;
    Ok(PerformOutput::Data(output))
  }
}

#[tokio::test]
async fn test_browser_destination_loads_before_perform() {
  let browser = BrowserDestination::new(
    DestinationDefinition::new("Vendor", "vendor-web", DestinationMode::Web)
      .setting(FieldDef::string("version").default_value(json!("2")))
      .action(
        ActionDefinition::new("ping", "Ping", Ping)
          .platform(Platform::Web)
          .field(FieldDef::string("event").default_value(json!("hello"))),
      ),
    LoadVendor,
  );

  let runtime = Arc::new(RecordingRuntime::new());
  let settings = browser.definition().validate_settings(&json!({})).unwrap();
  let vendor = browser.load(&settings, runtime.clone()).await.unwrap();

  let action = browser.definition().get_action("ping").unwrap();
  let payload = action.validate(&Default::default(), &json!({})).unwrap();
  action
    .perform(
      &vendor,
      ExecuteContext {
        payload,
        settings,
        invocation_id: "i-1".to_string(),
      },
    )
    .await
    .unwrap();

  assert_eq!(
    runtime.calls(),
    vec![
      RuntimeCall::LoadScript {
        src: "https://cdn.vendor.test/sdk-2.js".to_string()
      },
      RuntimeCall::Invoke {
        function: "vendor.ping".to_string(),
        args: vec![json!({ "event": "hello" })],
      },
    ]
  );
}
