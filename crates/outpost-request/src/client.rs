use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RequestError;
use crate::options::RequestOptions;
use crate::response::Response;

/// Issues HTTP calls on behalf of actions.
#[async_trait]
pub trait RequestClient: Send + Sync {
  async fn request(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError>;
}

/// The request client handed to cloud-mode actions.
pub type SharedClient = Arc<dyn RequestClient>;

/// Apply `throw_http_errors` to a completed response.
pub(crate) fn check_status(response: Response, throw: bool) -> Result<Response, RequestError> {
  if throw && !response.ok() {
    return Err(RequestError::Http {
      status: response.status,
      url: response.url,
      body: response.body,
    });
  }
  Ok(response)
}
