//! Action and dispatch errors.

use outpost_request::RequestError;
use outpost_schema::ValidationError;
use serde::Serialize;
use thiserror::Error;

/// A destination business-rule failure raised inside `perform`.
///
/// Carries a stable code and an HTTP-like status so callers can decide
/// whether the event is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct IntegrationError {
  pub message: String,
  pub code: String,
  pub status: u16,
}

impl IntegrationError {
  pub fn new(message: impl Into<String>, code: impl Into<String>, status: u16) -> Self {
    Self {
      message: message.into(),
      code: code.into(),
      status,
    }
  }
}

/// Why a single action invocation failed.
#[derive(Debug, Error)]
pub enum ActionError {
  /// Business-rule failure reported by the destination.
  #[error(transparent)]
  Integration(#[from] IntegrationError),

  /// Outbound request failed (transport error or non-2xx status).
  #[error(transparent)]
  Request(#[from] RequestError),

  /// Payload or settings did not satisfy their field declarations.
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The validated payload did not deserialize into the action's input type.
  #[error("invalid payload: {0}")]
  InvalidPayload(#[from] serde_json::Error),

  /// A subscription names an action the destination does not define.
  #[error("unknown action '{action}'")]
  UnknownAction { action: String },

  /// The web runtime rejected a script load or vendor call.
  #[error("web runtime error: {message}")]
  Runtime { message: String },

  /// The invocation was cancelled before it started.
  #[error("action cancelled")]
  Cancelled,

  /// The invocation's task panicked or was aborted.
  #[error("action task failed: {message}")]
  Panicked { message: String },
}

impl ActionError {
  /// Stable machine-readable code.
  pub fn code(&self) -> &str {
    match self {
      ActionError::Integration(err) => &err.code,
      ActionError::Request(_) => "REQUEST_FAILED",
      ActionError::Validation(err) => err.code(),
      ActionError::InvalidPayload(_) => "INVALID_PAYLOAD",
      ActionError::UnknownAction { .. } => "UNKNOWN_ACTION",
      ActionError::Runtime { .. } => "RUNTIME_ERROR",
      ActionError::Cancelled => "CANCELLED",
      ActionError::Panicked { .. } => "TASK_FAILED",
    }
  }

  /// HTTP-like status, when one applies.
  pub fn status(&self) -> Option<u16> {
    match self {
      ActionError::Integration(err) => Some(err.status),
      ActionError::Request(err) => err.status(),
      ActionError::Validation(_) | ActionError::InvalidPayload(_) => Some(400),
      _ => None,
    }
  }

  pub(crate) fn to_json(&self) -> serde_json::Value {
    serde_json::json!({
      "message": self.to_string(),
      "code": self.code(),
      "status": self.status(),
    })
  }
}

/// Errors that abort a whole dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
  /// The caller cancelled the dispatch.
  #[error("dispatch cancelled")]
  Cancelled,

  /// The dispatch exceeded its configured timeout.
  #[error("dispatch timed out after {timeout_ms}ms")]
  TimedOut { timeout_ms: u64 },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_integration_error_code_and_status() {
    let err: ActionError = IntegrationError::new(
      "Either Anonymous id or Identity should be specified.",
      "MISSING_REQUIRED_FIELD",
      400,
    )
    .into();

    assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
    assert_eq!(err.status(), Some(400));
    assert_eq!(
      err.to_string(),
      "Either Anonymous id or Identity should be specified."
    );
  }

  #[test]
  fn test_validation_error_code() {
    let err: ActionError = ValidationError::MissingRequiredField {
      field: "viewName".to_string(),
    }
    .into();
    assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
    assert_eq!(err.to_json()["status"], 400);
  }
}
