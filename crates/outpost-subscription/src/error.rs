use outpost_mapping::MappingError;
use thiserror::Error;

/// Errors raised while compiling a subscription filter.
#[derive(Debug, Error)]
pub enum FilterError {
  /// The filter was empty or only whitespace.
  #[error("filter is empty")]
  Empty,

  /// Input that is not a valid token.
  #[error("invalid token '{text}' at offset {offset}")]
  InvalidToken { text: String, offset: usize },

  /// A token that does not fit the grammar at this position.
  #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
  UnexpectedToken {
    found: String,
    expected: &'static str,
    offset: usize,
  },

  /// The filter ended before the expression was complete.
  #[error("unexpected end of filter, expected {expected}")]
  UnexpectedEnd { expected: &'static str },

  /// A field reference that is not a valid path.
  #[error("invalid field '{field}': {source}")]
  InvalidField {
    field: String,
    #[source]
    source: MappingError,
  },

  /// A function name other than `contains` or `match`.
  #[error("unknown function '{name}'")]
  UnknownFunction { name: String },
}
