//! Filter evaluation.
//!
//! Fields that do not exist in the event never equal anything: `=` is false
//! and `!=` is true.

use outpost_mapping::{Scope, resolve};
use serde_json::Value;

use crate::filter::{CompareOp, Filter, Literal};

impl Filter {
  /// Whether the event satisfies this filter.
  pub fn matches(&self, event: &Value) -> bool {
    let scope = Scope::new(event);
    self.eval(&scope)
  }

  fn eval(&self, scope: &Scope<'_>) -> bool {
    match self {
      Filter::All => true,
      Filter::Or(lhs, rhs) => lhs.eval(scope) || rhs.eval(scope),
      Filter::And(lhs, rhs) => lhs.eval(scope) && rhs.eval(scope),
      Filter::Not(inner) => !inner.eval(scope),
      Filter::Compare { field, op, value } => {
        let equal = resolve(scope, field).is_some_and(|actual| value.equals(actual));
        match op {
          CompareOp::Eq => equal,
          CompareOp::NotEq => !equal,
        }
      }
      Filter::Contains { field, needle } => match resolve(scope, field) {
        Some(Value::String(haystack)) => match needle {
          Literal::String(needle) => haystack.contains(needle.as_str()),
          _ => false,
        },
        Some(Value::Array(items)) => items.iter().any(|item| needle.equals(item)),
        _ => false,
      },
      Filter::Match { field, pattern } => match resolve(scope, field) {
        Some(Value::String(actual)) => glob(pattern, actual),
        _ => false,
      },
    }
  }
}

/// Glob match supporting `*` (any run) and `?` (any single character).
fn glob(pattern: &str, text: &str) -> bool {
  let pattern: Vec<char> = pattern.chars().collect();
  let text: Vec<char> = text.chars().collect();

  let (mut p, mut t) = (0, 0);
  let mut backtrack: Option<(usize, usize)> = None;

  while t < text.len() {
    match pattern.get(p) {
      Some('*') => {
        backtrack = Some((p, t));
        p += 1;
      }
      Some(&c) if c == '?' || c == text[t] => {
        p += 1;
        t += 1;
      }
      _ => match backtrack {
        Some((star, matched)) => {
          p = star + 1;
          t = matched + 1;
          backtrack = Some((star, matched + 1));
        }
        None => return false,
      },
    }
  }

  pattern[p..].iter().all(|&c| c == '*')
}
