use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a destination runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationMode {
  /// Server-side: actions issue HTTP requests through a request client.
  Cloud,
  /// Browser-side: actions call a vendor script injected into the page.
  Web,
}

impl fmt::Display for DestinationMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DestinationMode::Cloud => write!(f, "cloud"),
      DestinationMode::Web => write!(f, "web"),
    }
  }
}

/// Platform an individual action targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  #[default]
  Cloud,
  Web,
}
