//! Web-mode destinations.
//!
//! A web destination's actions run against a vendor SDK in the page. The
//! page is abstracted as a [`WebRuntime`]: loading the vendor script and
//! calling into the SDK are the only operations actions need. A destination
//! contributes an [`Initialize`] hook that loads the script and returns the
//! vendor client; that client is the capability its actions `perform` with.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use outpost_schema::Settings;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::destination::DestinationDefinition;
use crate::error::ActionError;

/// The page a web destination runs in.
#[async_trait]
pub trait WebRuntime: Send + Sync {
  /// Inject a script tag and wait for it to load.
  async fn load_script(&self, src: &str) -> Result<(), ActionError>;

  /// Call a vendor function by its dotted global name.
  async fn invoke(&self, function: &str, args: Vec<Value>) -> Result<Value, ActionError>;
}

/// Bootstraps a web destination's vendor client.
#[async_trait]
pub trait Initialize<C>: Send + Sync {
  async fn initialize(&self, settings: &Settings, runtime: Arc<dyn WebRuntime>)
  -> Result<C, ActionError>;
}

/// A web-mode destination: its definition plus the initializer that
/// produces the client its actions use.
pub struct BrowserDestination<C> {
  definition: Arc<DestinationDefinition<C>>,
  initializer: Arc<dyn Initialize<C>>,
}

impl<C> BrowserDestination<C> {
  pub fn new(definition: DestinationDefinition<C>, initializer: impl Initialize<C> + 'static) -> Self {
    Self {
      definition: Arc::new(definition),
      initializer: Arc::new(initializer),
    }
  }

  pub fn definition(&self) -> &Arc<DestinationDefinition<C>> {
    &self.definition
  }

  /// Run the initializer. Must complete before any action performs.
  #[instrument(name = "browser_load", skip_all, fields(destination = %self.definition.slug))]
  pub async fn load(&self, settings: &Settings, runtime: Arc<dyn WebRuntime>) -> Result<C, ActionError> {
    let client = self.initializer.initialize(settings, runtime).await?;
    info!("destination initialized");
    Ok(client)
  }
}

/// A call observed by [`RecordingRuntime`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeCall {
  LoadScript { src: String },
  Invoke { function: String, args: Vec<Value> },
}

/// A web runtime that records every call and answers with `null`.
///
/// Used by tests and by dry runs of web destinations.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
  calls: Mutex<Vec<RuntimeCall>>,
}

impl RecordingRuntime {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn calls(&self) -> Vec<RuntimeCall> {
    self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Sources of every loaded script, in load order.
  pub fn scripts(&self) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        RuntimeCall::LoadScript { src } => Some(src),
        RuntimeCall::Invoke { .. } => None,
      })
      .collect()
  }

  /// Arguments of every call to `function`, in call order.
  pub fn invocations(&self, function: &str) -> Vec<Vec<Value>> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        RuntimeCall::Invoke { function: f, args } if f == function => Some(args),
        _ => None,
      })
      .collect()
  }

  fn record(&self, call: RuntimeCall) {
    self
      .calls
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(call);
  }
}

#[async_trait]
impl WebRuntime for RecordingRuntime {
  async fn load_script(&self, src: &str) -> Result<(), ActionError> {
    debug!(src, "load script");
    self.record(RuntimeCall::LoadScript {
      src: src.to_string(),
    });
    Ok(())
  }

  async fn invoke(&self, function: &str, args: Vec<Value>) -> Result<Value, ActionError> {
    debug!(function, "invoke");
    self.record(RuntimeCall::Invoke {
      function: function.to_string(),
      args,
    });
    Ok(Value::Null)
  }
}
