use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::client::{RequestClient, check_status};
use crate::error::RequestError;
use crate::options::RequestOptions;
use crate::response::Response;

/// Request client backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
  client: Client,
}

impl HttpClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Use a preconfigured reqwest client (proxies, pools, user agent).
  pub fn with_client(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl RequestClient for HttpClient {
  async fn request(&self, url: &str, options: RequestOptions) -> Result<Response, RequestError> {
    let parsed = parse_url(url)?;

    let mut request = self
      .client
      .request(options.method.to_reqwest(), parsed.clone());

    for (name, value) in &options.headers {
      request = request.header(name, value);
    }

    if let Some(body) = &options.json {
      request = request.json(body);
    } else if let Some(body) = &options.body {
      request = request.body(body.clone());
    }

    if let Some(timeout_ms) = options.timeout_ms {
      request = request.timeout(Duration::from_millis(timeout_ms));
    }

    debug!(method = %options.method, url = %parsed, "sending request");

    let response = request.send().await.map_err(|err| {
      if err.is_timeout() {
        RequestError::Timeout {
          url: url.to_string(),
        }
      } else {
        RequestError::Transport(err)
      }
    })?;

    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
      .headers()
      .iter()
      .filter_map(|(k, v)| {
        v.to_str()
          .ok()
          .map(|val| (k.as_str().to_string(), val.to_string()))
      })
      .collect();
    let text = response.text().await?;

    debug!(url = %parsed, status, "response received");

    let response = Response {
      url: parsed.to_string(),
      status,
      headers,
      body: Response::parse_body(text),
    };
    check_status(response, options.throw_http_errors)
  }
}

fn parse_url(url: &str) -> Result<Url, RequestError> {
  let parsed = Url::parse(url).map_err(|e| RequestError::InvalidUrl {
    url: url.to_string(),
    message: e.to_string(),
  })?;

  match parsed.scheme() {
    "http" | "https" => Ok(parsed),
    scheme => Err(RequestError::InvalidUrl {
      url: url.to_string(),
      message: format!("unsupported scheme '{scheme}'"),
    }),
  }
}
