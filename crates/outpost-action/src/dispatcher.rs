//! Event dispatch.
//!
//! For one event the dispatcher matches every subscription, builds a payload
//! for each matched action, and runs the actions concurrently on their own
//! tasks. One action failing never affects its siblings; the caller gets one
//! [`ActionResult`] per matched subscription, in subscription order.

use std::sync::Arc;
use std::time::Duration;

use outpost_schema::{Settings, ValidationError};
use outpost_subscription::Subscription;
use serde_json::{Value, json};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::action::{ActionDefinition, ExecuteContext};
use crate::destination::DestinationDefinition;
use crate::error::{ActionError, DispatchError};
use crate::events::{DispatchEvent, DispatchNotifier, NoopNotifier};
use crate::output::PerformOutput;

/// Configuration for a dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
  /// Upper bound on one dispatch, covering every matched action.
  pub timeout: Option<Duration>,
}

/// Terminal state of one action invocation.
#[derive(Debug)]
pub enum Outcome {
  Succeeded { output: Value },
  Failed { error: ActionError },
  ValidationFailed { error: ValidationError },
}

/// Result of one matched subscription.
#[derive(Debug)]
pub struct ActionResult {
  pub subscription: String,
  pub action: String,
  pub invocation_id: String,
  pub outcome: Outcome,
}

impl ActionResult {
  pub fn is_success(&self) -> bool {
    matches!(self.outcome, Outcome::Succeeded { .. })
  }

  pub fn to_json(&self) -> Value {
    let mut value = json!({
      "subscription": self.subscription,
      "action": self.action,
      "invocation_id": self.invocation_id,
    });
    let (status, key, detail) = match &self.outcome {
      Outcome::Succeeded { output } => ("succeeded", "output", output.clone()),
      Outcome::Failed { error } => ("failed", "error", error.to_json()),
      Outcome::ValidationFailed { error } => (
        "validation_failed",
        "error",
        json!({
          "message": error.to_string(),
          "code": error.code(),
          "field": error.field(),
        }),
      ),
    };
    value["status"] = json!(status);
    value[key] = detail;
    value
  }
}

/// Result of a complete dispatch.
#[derive(Debug)]
pub struct DispatchResult {
  pub dispatch_id: String,
  /// One entry per matched subscription, in subscription order.
  pub results: Vec<ActionResult>,
}

impl DispatchResult {
  pub fn succeeded(&self) -> usize {
    self.results.iter().filter(|r| r.is_success()).count()
  }

  pub fn failed(&self) -> usize {
    self.results.len() - self.succeeded()
  }

  pub fn to_json(&self) -> Value {
    json!({
      "dispatch_id": self.dispatch_id,
      "results": self.results.iter().map(ActionResult::to_json).collect::<Vec<_>>(),
    })
  }
}

/// Dispatches events to one destination's actions.
///
/// Generic over `N: DispatchNotifier` like the rest of the observability
/// hooks: `Dispatcher::new` discards events, `Dispatcher::with_notifier`
/// delivers them.
pub struct Dispatcher<C, N: DispatchNotifier = NoopNotifier> {
  destination: Arc<DestinationDefinition<C>>,
  notifier: N,
  config: DispatcherConfig,
}

impl<C> Dispatcher<C, NoopNotifier> {
  pub fn new(destination: Arc<DestinationDefinition<C>>) -> Self {
    Self::with_notifier(destination, NoopNotifier)
  }
}

impl<C, N: DispatchNotifier> Dispatcher<C, N> {
  pub fn with_notifier(destination: Arc<DestinationDefinition<C>>, notifier: N) -> Self {
    Self {
      destination,
      notifier,
      config: DispatcherConfig::default(),
    }
  }

  pub fn with_config(mut self, config: DispatcherConfig) -> Self {
    self.config = config;
    self
  }

  pub fn destination(&self) -> &DestinationDefinition<C> {
    &self.destination
  }
}

/// Where a matched subscription's result comes from.
enum Slot {
  Done(ActionResult),
  Running {
    subscription: String,
    action: String,
    invocation_id: String,
    task: usize,
  },
}

impl<C, N> Dispatcher<C, N>
where
  C: Clone + Send + Sync + 'static,
  N: DispatchNotifier,
{
  /// Dispatch one event.
  ///
  /// Validation happens synchronously before any action starts; matched
  /// actions then run concurrently. Cancelling `cancel`, or exceeding the
  /// configured timeout, aborts in-flight actions on a best-effort basis.
  /// Requests they already sent are not rolled back.
  pub async fn dispatch(
    &self,
    event: &Value,
    subscriptions: &[Subscription],
    settings: &Settings,
    client: &C,
    cancel: CancellationToken,
  ) -> Result<DispatchResult, DispatchError> {
    let dispatch_id = uuid::Uuid::new_v4().to_string();
    self
      .run(dispatch_id, event, subscriptions, settings, client, cancel)
      .await
  }

  #[instrument(
    name = "dispatch",
    skip(self, event, subscriptions, settings, client, cancel),
    fields(destination = %self.destination.slug, dispatch_id = %dispatch_id)
  )]
  async fn run(
    &self,
    dispatch_id: String,
    event: &Value,
    subscriptions: &[Subscription],
    settings: &Settings,
    client: &C,
    cancel: CancellationToken,
  ) -> Result<DispatchResult, DispatchError> {
    let event_type = event.get("type").and_then(Value::as_str).map(str::to_string);
    info!(event_type = ?event_type, subscriptions = subscriptions.len(), "dispatch_started");
    self.notifier.notify(DispatchEvent::DispatchStarted {
      dispatch_id: dispatch_id.clone(),
      destination: self.destination.slug.clone(),
      event_type,
    });

    if cancel.is_cancelled() {
      return Err(self.abort(&dispatch_id, &[], DispatchError::Cancelled));
    }

    let mut slots = Vec::new();
    let mut handles = Vec::new();

    for subscription in subscriptions {
      if !subscription.matches(event) {
        debug!(subscription = %subscription.name(), "subscription did not match");
        continue;
      }

      let invocation_id = uuid::Uuid::new_v4().to_string();
      let key = subscription.partner_action().to_string();
      self.notifier.notify(DispatchEvent::ActionMatched {
        dispatch_id: dispatch_id.clone(),
        invocation_id: invocation_id.clone(),
        action: key.clone(),
        subscription: subscription.name().to_string(),
      });

      let Some(action) = self.destination.get_action(&key) else {
        let error = ActionError::UnknownAction {
          action: key.clone(),
        };
        warn!(action = %key, "subscription references unknown action");
        self.notifier.notify(DispatchEvent::ActionFailed {
          dispatch_id: dispatch_id.clone(),
          invocation_id: invocation_id.clone(),
          action: key.clone(),
          error: error.to_string(),
        });
        slots.push(Slot::Done(ActionResult {
          subscription: subscription.name().to_string(),
          action: key,
          invocation_id,
          outcome: Outcome::Failed { error },
        }));
        continue;
      };

      let payload = match action.validate(subscription.mapping(), event) {
        Ok(payload) => payload,
        Err(error) => {
          warn!(action = %key, %invocation_id, error = %error, "payload validation failed");
          self.notifier.notify(DispatchEvent::ActionValidationFailed {
            dispatch_id: dispatch_id.clone(),
            invocation_id: invocation_id.clone(),
            action: key.clone(),
            error: error.to_string(),
          });
          slots.push(Slot::Done(ActionResult {
            subscription: subscription.name().to_string(),
            action: key,
            invocation_id,
            outcome: Outcome::ValidationFailed { error },
          }));
          continue;
        }
      };

      let invocation = Invocation {
        action: action.clone(),
        client: client.clone(),
        dispatch_id: dispatch_id.clone(),
        ctx: ExecuteContext {
          payload,
          settings: settings.clone(),
          invocation_id: invocation_id.clone(),
        },
        cancel: cancel.clone(),
      };

      slots.push(Slot::Running {
        subscription: subscription.name().to_string(),
        action: key,
        invocation_id,
        task: handles.len(),
      });
      handles.push(tokio::spawn(invocation.run()));
    }

    let aborts: Vec<AbortHandle> = handles.iter().map(|h| h.abort_handle()).collect();
    let timeout = self.config.timeout;

    // Wait for all actions; cancellation and the deadline take precedence.
    let joined = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
          return Err(self.abort(&dispatch_id, &aborts, DispatchError::Cancelled));
        }
        _ = deadline(timeout) => {
          let timeout_ms = timeout.map(|t| t.as_millis() as u64).unwrap_or_default();
          return Err(self.abort(&dispatch_id, &aborts, DispatchError::TimedOut { timeout_ms }));
        }
        joined = futures::future::join_all(handles) => joined,
    };
    let mut joined: Vec<_> = joined.into_iter().map(Some).collect();

    let mut results = Vec::with_capacity(slots.len());
    for slot in slots {
      let result = match slot {
        Slot::Done(result) => result,
        Slot::Running {
          subscription,
          action,
          invocation_id,
          task,
        } => {
          let outcome = match joined.get_mut(task).and_then(Option::take) {
            Some(Ok(Ok(output))) => Outcome::Succeeded {
              output: output.into_value(),
            },
            Some(Ok(Err(error))) => Outcome::Failed { error },
            Some(Err(join_error)) => Outcome::Failed {
              error: ActionError::Panicked {
                message: join_error.to_string(),
              },
            },
            None => Outcome::Failed {
              error: ActionError::Panicked {
                message: "task result missing".to_string(),
              },
            },
          };

          match &outcome {
            Outcome::Succeeded { output } => {
              self.notifier.notify(DispatchEvent::ActionSucceeded {
                dispatch_id: dispatch_id.clone(),
                invocation_id: invocation_id.clone(),
                action: action.clone(),
                output: output.clone(),
              })
            }
            Outcome::Failed { error } => self.notifier.notify(DispatchEvent::ActionFailed {
              dispatch_id: dispatch_id.clone(),
              invocation_id: invocation_id.clone(),
              action: action.clone(),
              error: error.to_string(),
            }),
            Outcome::ValidationFailed { .. } => {}
          }

          ActionResult {
            subscription,
            action,
            invocation_id,
            outcome,
          }
        }
      };
      results.push(result);
    }

    let result = DispatchResult {
      dispatch_id: dispatch_id.clone(),
      results,
    };
    info!(
      matched = result.results.len(),
      succeeded = result.succeeded(),
      failed = result.failed(),
      "dispatch_completed"
    );
    self.notifier.notify(DispatchEvent::DispatchCompleted {
      dispatch_id,
      succeeded: result.succeeded(),
      failed: result.failed(),
    });

    Ok(result)
  }

  fn abort(&self, dispatch_id: &str, tasks: &[AbortHandle], reason: DispatchError) -> DispatchError {
    for task in tasks {
      task.abort();
    }
    warn!(in_flight = tasks.len(), reason = %reason, "dispatch aborted");
    self.notifier.notify(DispatchEvent::DispatchAborted {
      dispatch_id: dispatch_id.to_string(),
      reason: reason.to_string(),
    });
    reason
  }
}

/// Resolves after `timeout`, or never when there is none.
async fn deadline(timeout: Option<Duration>) {
  match timeout {
    Some(timeout) => tokio::time::sleep(timeout).await,
    None => std::future::pending::<()>().await,
  }
}

/// One action invocation, moved onto its own task.
struct Invocation<C> {
  action: Arc<ActionDefinition<C>>,
  client: C,
  dispatch_id: String,
  ctx: ExecuteContext,
  cancel: CancellationToken,
}

impl<C: Send + Sync + 'static> Invocation<C> {
  #[instrument(
    name = "action_perform",
    skip(self),
    fields(
      dispatch_id = %self.dispatch_id,
      action = %self.action.key,
      invocation_id = %self.ctx.invocation_id,
    )
  )]
  async fn run(self) -> Result<PerformOutput, ActionError> {
    if self.cancel.is_cancelled() {
      return Err(ActionError::Cancelled);
    }

    info!(payload = %self.ctx.payload.to_value(), "action_started");

    let result = self.action.perform(&self.client, self.ctx).await;

    match &result {
      Ok(_) => info!("action_completed"),
      Err(e) => error!(error = %e, code = e.code(), "action_failed"),
    }

    result
  }
}
