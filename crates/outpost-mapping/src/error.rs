use thiserror::Error;

/// Errors raised while evaluating a mapping against an event.
#[derive(Debug, Error)]
pub enum MappingError {
  /// The path expression could not be parsed.
  #[error("invalid path '{path}': {message}")]
  InvalidPath { path: String, message: String },

  /// An `@`-prefixed key that names no known directive.
  #[error("unknown directive '{name}'")]
  UnknownDirective { name: String },

  /// A known directive with a malformed argument.
  #[error("invalid {directive} directive: {message}")]
  InvalidDirective {
    directive: &'static str,
    message: String,
  },

  /// Template rendering failed.
  #[error("template error: {message}")]
  Template { message: String },
}

impl MappingError {
  pub(crate) fn invalid_directive(directive: &'static str, message: impl Into<String>) -> Self {
    Self::InvalidDirective {
      directive,
      message: message.into(),
    }
  }
}
