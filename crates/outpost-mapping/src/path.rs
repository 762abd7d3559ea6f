//! Path expressions over nested JSON events.
//!
//! Syntax: a root (`$` or `@`) followed by members and indices:
//! `$.properties.products[0].id`, `@.context['user agent']`. A path without a
//! root (`properties.plan`) is rooted at `$`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::MappingError;

/// Root scope a path is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
  /// `@`: the whole event, regardless of nesting.
  Event,
  /// `$`: the current context root.
  Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Key(String),
  Index(usize),
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
  root: Root,
  segments: Vec<Segment>,
}

impl Path {
  /// Parse a path expression.
  pub fn parse(source: &str) -> Result<Self, MappingError> {
    let invalid = |message: String| MappingError::InvalidPath {
      path: source.to_string(),
      message,
    };

    let trimmed = source.trim();
    let (root, rest, bare) = match trimmed.chars().next() {
      Some('$') => (Root::Context, &trimmed[1..], false),
      Some('@') => (Root::Event, &trimmed[1..], false),
      Some(_) => (Root::Context, trimmed, true),
      None => return Err(invalid("empty path".to_string())),
    };

    let chars: Vec<char> = rest.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;
    let mut expect_member = bare;

    while i < chars.len() || expect_member {
      if expect_member {
        let start = i;
        while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
          i += 1;
        }
        if start == i {
          return Err(invalid("empty member name".to_string()));
        }
        segments.push(Segment::Key(chars[start..i].iter().collect()));
        expect_member = false;
        continue;
      }

      match chars[i] {
        '.' => {
          i += 1;
          expect_member = true;
        }
        '[' => {
          i += 1;
          match chars.get(i) {
            Some(&quote) if quote == '\'' || quote == '"' => {
              i += 1;
              let start = i;
              while i < chars.len() && chars[i] != quote {
                i += 1;
              }
              if i >= chars.len() {
                return Err(invalid("unterminated quoted member".to_string()));
              }
              segments.push(Segment::Key(chars[start..i].iter().collect()));
              i += 1;
            }
            _ => {
              let start = i;
              while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
              }
              let digits: String = chars[start..i].iter().collect();
              let index = digits
                .parse::<usize>()
                .map_err(|_| invalid(format!("invalid index '{}'", digits)))?;
              segments.push(Segment::Index(index));
            }
          }
          if chars.get(i) != Some(&']') {
            return Err(invalid("expected ']'".to_string()));
          }
          i += 1;
        }
        c => return Err(invalid(format!("unexpected character '{}'", c))),
      }
    }

    Ok(Self { root, segments })
  }

  pub fn root(&self) -> Root {
    self.root
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }
}

impl FromStr for Path {
  type Err = MappingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Path::parse(s)
  }
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.root {
      Root::Event => f.write_str("@")?,
      Root::Context => f.write_str("$")?,
    }
    for segment in &self.segments {
      match segment {
        Segment::Key(key) if key.chars().all(|c| c.is_alphanumeric() || c == '_') => {
          write!(f, ".{}", key)?
        }
        Segment::Key(key) => write!(f, "['{}']", key)?,
        Segment::Index(index) => write!(f, "[{}]", index)?,
      }
    }
    Ok(())
  }
}

/// The two roots a path can be evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
  event: &'a Value,
  context: &'a Value,
}

impl<'a> Scope<'a> {
  /// Top-level scope: both roots name the event.
  pub fn new(event: &'a Value) -> Self {
    Self {
      event,
      context: event,
    }
  }

  /// Scope with an explicit context root.
  pub fn with_roots(event: &'a Value, context: &'a Value) -> Self {
    Self { event, context }
  }

  pub fn event(&self) -> &'a Value {
    self.event
  }

  pub fn context(&self) -> &'a Value {
    self.context
  }

  fn root(&self, root: Root) -> &'a Value {
    match root {
      Root::Event => self.event,
      Root::Context => self.context,
    }
  }
}

/// Resolve a path against a scope. Missing members yield `None`.
pub fn resolve<'a>(scope: &Scope<'a>, path: &Path) -> Option<&'a Value> {
  path
    .segments
    .iter()
    .try_fold(scope.root(path.root), |current, segment| {
      match (segment, current) {
        (Segment::Key(key), Value::Object(map)) => map.get(key),
        (Segment::Key(key), Value::Array(items)) => {
          key.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        (Segment::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
      }
    })
}

/// Parse `path` and resolve it against a top-level scope over `event`.
pub fn resolve_str<'a>(event: &'a Value, path: &str) -> Result<Option<&'a Value>, MappingError> {
  let path = Path::parse(path)?;
  Ok(resolve(&Scope::new(event), &path))
}
