use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::{RequestClient, check_status};
use crate::error::RequestError;
use crate::options::RequestOptions;
use crate::response::Response;

/// A request captured by [`MockClient`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedRequest {
  pub url: String,
  #[serde(flatten)]
  pub options: RequestOptions,
}

struct CannedResponse {
  prefix: String,
  status: u16,
  body: Value,
}

/// Request client that never touches the network.
///
/// Every request is recorded in order. Responses are chosen by the longest
/// registered URL prefix; unmatched requests get `200 {}`.
#[derive(Default)]
pub struct MockClient {
  requests: Mutex<Vec<RecordedRequest>>,
  responses: Mutex<Vec<CannedResponse>>,
}

impl MockClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a canned response for URLs starting with `prefix`.
  pub fn respond(&self, prefix: impl Into<String>, status: u16, body: Value) {
    self
      .responses
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(CannedResponse {
        prefix: prefix.into(),
        status,
        body,
      });
  }

  pub fn with_response(self, prefix: impl Into<String>, status: u16, body: Value) -> Self {
    self.respond(prefix, status, body);
    self
  }

  /// Requests received so far, in arrival order.
  pub fn requests(&self) -> Vec<RecordedRequest> {
    self
      .requests
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  fn canned(&self, url: &str) -> (u16, Value) {
    let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
    responses
      .iter()
      .filter(|r| url.starts_with(&r.prefix))
      .max_by_key(|r| r.prefix.len())
      .map(|r| (r.status, r.body.clone()))
      .unwrap_or_else(|| (200, json!({})))
  }
}

#[async_trait]
impl RequestClient for MockClient {
  async fn request(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    debug!(method = %options.method, url, "mock request");
    let throw = options.throw_http_errors;
    self
      .requests
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(RecordedRequest {
        url: url.to_string(),
        options,
      });

    let (status, body) = self.canned(url);
    let response = Response {
      url: url.to_string(),
      status,
      headers: Default::default(),
      body,
    };
    check_status(response, throw)
  }
}
