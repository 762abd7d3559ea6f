use std::fmt;
use std::str::FromStr;

use outpost_mapping::Path;
use serde_json::Value;

use crate::error::FilterError;

/// A parsed subscription filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  /// Matches every event.
  All,
  Or(Box<Filter>, Box<Filter>),
  And(Box<Filter>, Box<Filter>),
  Not(Box<Filter>),
  Compare {
    field: Path,
    op: CompareOp,
    value: Literal,
  },
  /// `contains(field, "needle")`: substring of a string field, or element of
  /// an array field.
  Contains { field: Path, needle: Literal },
  /// `match(field, "Order *")`: glob over a string field (`*` and `?`).
  Match { field: Path, pattern: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
  Eq,
  NotEq,
}

impl fmt::Display for CompareOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CompareOp::Eq => write!(f, "="),
      CompareOp::NotEq => write!(f, "!="),
    }
  }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  String(String),
  Number(f64),
  Bool(bool),
  Null,
}

impl Literal {
  /// Whether a resolved event value equals this literal.
  ///
  /// Numbers compare by value regardless of integer/float representation.
  pub fn equals(&self, value: &Value) -> bool {
    match (self, value) {
      (Literal::String(expected), Value::String(actual)) => expected == actual,
      (Literal::Number(expected), Value::Number(actual)) => actual.as_f64() == Some(*expected),
      (Literal::Bool(expected), Value::Bool(actual)) => expected == actual,
      (Literal::Null, Value::Null) => true,
      _ => false,
    }
  }
}

impl Filter {
  /// Parse a filter expression.
  pub fn parse(source: &str) -> Result<Self, FilterError> {
    crate::parser::parse(source)
  }
}

impl FromStr for Filter {
  type Err = FilterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Filter::parse(s)
  }
}
