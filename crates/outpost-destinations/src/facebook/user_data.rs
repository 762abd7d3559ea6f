//! User data normalisation.
//!
//! Facebook matches users on SHA-256 hashes of normalised identifiers.
//! Browser-level signals (IP, user agent, click ids) are sent as they are.

use outpost_action::{ActionError, IntegrationError};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

enum Normalize {
  Lowercase,
  Digits,
  FirstLetter,
  NoSpaces,
}

/// (input key, output key, normalisation); hashed after normalising.
const HASHED: [(&str, &str, Normalize); 11] = [
  ("externalId", "external_id", Normalize::Lowercase),
  ("email", "em", Normalize::Lowercase),
  ("phone", "ph", Normalize::Digits),
  ("gender", "ge", Normalize::FirstLetter),
  ("dateOfBirth", "db", Normalize::Digits),
  ("lastName", "ln", Normalize::Lowercase),
  ("firstName", "fn", Normalize::Lowercase),
  ("city", "ct", Normalize::NoSpaces),
  ("state", "st", Normalize::Lowercase),
  ("zip", "zp", Normalize::NoSpaces),
  ("country", "country", Normalize::Lowercase),
];

const PLAIN: [&str; 4] = ["client_ip_address", "client_user_agent", "fbc", "fbp"];

/// Build the `user_data` object of a Conversions API event.
///
/// Fails when no usable identifier is present.
pub fn normalize_user_data(raw: &Map<String, Value>) -> Result<Map<String, Value>, ActionError> {
  let mut out = Map::new();

  for (input, output, normalize) in &HASHED {
    let Some(text) = raw.get(*input).and_then(as_text) else {
      continue;
    };
    let normalized = match normalize {
      Normalize::Lowercase => text.trim().to_lowercase(),
      Normalize::Digits => text.chars().filter(char::is_ascii_digit).collect(),
      Normalize::FirstLetter => text.trim().chars().take(1).flat_map(char::to_lowercase).collect(),
      Normalize::NoSpaces => text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect(),
    };
    if !normalized.is_empty() {
      out.insert(output.to_string(), Value::String(sha256_hex(&normalized)));
    }
  }

  for key in PLAIN {
    if let Some(text) = raw.get(key).and_then(as_text).filter(|t| !t.is_empty()) {
      out.insert(key.to_string(), Value::String(text));
    }
  }

  if out.is_empty() {
    return Err(
      IntegrationError::new(
        "Must include at least one user data property",
        "MISSING_REQUIRED_FIELD",
        400,
      )
      .into(),
    );
  }

  Ok(out)
}

fn as_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn sha256_hex(input: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}
