use outpost_config::FieldType;
use outpost_mapping::MappingError;
use thiserror::Error;

/// Errors produced while building a payload or validating settings.
#[derive(Debug, Error)]
pub enum ValidationError {
  /// A required field resolved to nothing.
  #[error("missing required field '{field}'")]
  MissingRequiredField { field: String },

  /// A value could not be coerced to the declared type.
  #[error("field '{field}' expected {expected}, got {found}")]
  TypeMismatch {
    field: String,
    expected: FieldType,
    found: String,
  },

  /// A value outside the declared choices.
  #[error("field '{field}' does not allow value {value}")]
  InvalidChoice {
    field: String,
    value: serde_json::Value,
  },

  /// The field's mapping could not be evaluated.
  #[error("failed to resolve field '{field}': {source}")]
  Mapping {
    field: String,
    #[source]
    source: MappingError,
  },
}

impl ValidationError {
  /// Name of the field this error is about.
  pub fn field(&self) -> &str {
    match self {
      ValidationError::MissingRequiredField { field }
      | ValidationError::TypeMismatch { field, .. }
      | ValidationError::InvalidChoice { field, .. }
      | ValidationError::Mapping { field, .. } => field,
    }
  }

  /// Stable machine-readable code.
  pub fn code(&self) -> &'static str {
    match self {
      ValidationError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
      ValidationError::TypeMismatch { .. } => "TYPE_MISMATCH",
      ValidationError::InvalidChoice { .. } => "INVALID_CHOICE",
      ValidationError::Mapping { .. } => "INVALID_MAPPING",
    }
  }
}
