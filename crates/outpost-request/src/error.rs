use thiserror::Error;

/// Errors surfaced by a request client.
#[derive(Debug, Error)]
pub enum RequestError {
  /// The URL could not be parsed or uses an unsupported scheme.
  #[error("invalid url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  /// An HTTP method name that is not supported.
  #[error("unsupported HTTP method: {0}")]
  InvalidMethod(String),

  /// The server answered with a non-2xx status.
  #[error("request to {url} failed with status {status}")]
  Http {
    status: u16,
    url: String,
    body: serde_json::Value,
  },

  /// The request did not complete within its timeout.
  #[error("request to {url} timed out")]
  Timeout { url: String },

  /// Connection or protocol failure.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
}

impl RequestError {
  /// HTTP status, when the server responded.
  pub fn status(&self) -> Option<u16> {
    match self {
      RequestError::Http { status, .. } => Some(*status),
      RequestError::Transport(err) => err.status().map(|s| s.as_u16()),
      _ => None,
    }
  }
}
