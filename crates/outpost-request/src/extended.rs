use async_trait::async_trait;

use crate::client::{RequestClient, SharedClient};
use crate::error::RequestError;
use crate::options::{RequestDefaults, RequestOptions};
use crate::response::Response;

/// Applies destination-wide defaults to every request before delegating.
pub struct ExtendedClient {
  inner: SharedClient,
  defaults: RequestDefaults,
}

impl ExtendedClient {
  pub fn new(inner: SharedClient, defaults: RequestDefaults) -> Self {
    Self { inner, defaults }
  }

  pub fn defaults(&self) -> &RequestDefaults {
    &self.defaults
  }
}

#[async_trait]
impl RequestClient for ExtendedClient {
  async fn request(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    self
      .inner
      .request(url, options.with_defaults(&self.defaults))
      .await
  }
}
