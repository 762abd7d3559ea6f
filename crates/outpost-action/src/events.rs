//! Dispatch events and notifiers for observability.
//!
//! The dispatcher emits an event at each step of a dispatch so consumers can
//! persist outcomes, stream them to a UI, or just log them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted while dispatching one event to a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DispatchEvent {
  /// Dispatch of an event has started.
  DispatchStarted {
    dispatch_id: String,
    destination: String,
    event_type: Option<String>,
  },

  /// A subscription matched and its action will run.
  ActionMatched {
    dispatch_id: String,
    invocation_id: String,
    action: String,
    subscription: String,
  },

  /// The action's payload could not be built.
  ActionValidationFailed {
    dispatch_id: String,
    invocation_id: String,
    action: String,
    error: String,
  },

  /// The action's `perform` completed successfully.
  ActionSucceeded {
    dispatch_id: String,
    invocation_id: String,
    action: String,
    output: serde_json::Value,
  },

  /// The action failed.
  ActionFailed {
    dispatch_id: String,
    invocation_id: String,
    action: String,
    error: String,
  },

  /// Every matched action has finished.
  DispatchCompleted {
    dispatch_id: String,
    succeeded: usize,
    failed: usize,
  },

  /// The dispatch was cancelled or timed out before all actions finished.
  DispatchAborted { dispatch_id: String, reason: String },
}

/// Trait for receiving dispatch events.
///
/// The dispatcher calls `notify` for each event; implementations decide
/// what to do with them.
pub trait DispatchNotifier: Send + Sync {
  fn notify(&self, event: DispatchEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl DispatchNotifier for NoopNotifier {
  fn notify(&self, _event: DispatchEvent) {}
}

/// A notifier that sends events to an unbounded channel.
///
/// Event volume is a handful per dispatch, so the channel is unbounded to
/// keep a slow consumer from stalling dispatch.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<DispatchEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<DispatchEvent>) -> Self {
    Self { sender }
  }
}

impl DispatchNotifier for ChannelNotifier {
  fn notify(&self, event: DispatchEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

/// A notifier that writes each event to the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl DispatchNotifier for TracingNotifier {
  fn notify(&self, event: DispatchEvent) {
    match event {
      DispatchEvent::DispatchStarted {
        dispatch_id,
        destination,
        event_type,
      } => info!(%dispatch_id, %destination, ?event_type, "dispatch_started"),
      DispatchEvent::ActionMatched {
        dispatch_id,
        invocation_id,
        action,
        subscription,
      } => info!(%dispatch_id, %invocation_id, %action, %subscription, "action_matched"),
      DispatchEvent::ActionValidationFailed {
        dispatch_id,
        invocation_id,
        action,
        error,
      } => warn!(%dispatch_id, %invocation_id, %action, %error, "action_validation_failed"),
      DispatchEvent::ActionSucceeded {
        dispatch_id,
        invocation_id,
        action,
        output,
      } => info!(%dispatch_id, %invocation_id, %action, %output, "action_succeeded"),
      DispatchEvent::ActionFailed {
        dispatch_id,
        invocation_id,
        action,
        error,
      } => warn!(%dispatch_id, %invocation_id, %action, %error, "action_failed"),
      DispatchEvent::DispatchCompleted {
        dispatch_id,
        succeeded,
        failed,
      } => info!(%dispatch_id, succeeded, failed, "dispatch_completed"),
      DispatchEvent::DispatchAborted {
        dispatch_id,
        reason,
      } => warn!(%dispatch_id, %reason, "dispatch_aborted"),
    }
  }
}
