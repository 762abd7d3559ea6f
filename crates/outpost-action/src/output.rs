use outpost_request::Response;
use serde_json::Value;

/// What a `perform` produced.
///
/// Actions return whatever shape is natural for them: nothing (web calls),
/// one response, or several responses awaited together. The dispatcher
/// normalises all of them with [`PerformOutput::into_value`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PerformOutput {
  #[default]
  Empty,
  Response(Response),
  Responses(Vec<Response>),
  Data(Value),
}

impl PerformOutput {
  pub fn into_value(self) -> Value {
    match self {
      PerformOutput::Empty => Value::Null,
      PerformOutput::Response(response) => response_value(response),
      PerformOutput::Responses(responses) => {
        Value::Array(responses.into_iter().map(response_value).collect())
      }
      PerformOutput::Data(value) => value,
    }
  }
}

impl From<Response> for PerformOutput {
  fn from(response: Response) -> Self {
    PerformOutput::Response(response)
  }
}

impl From<Vec<Response>> for PerformOutput {
  fn from(responses: Vec<Response>) -> Self {
    PerformOutput::Responses(responses)
  }
}

fn response_value(response: Response) -> Value {
  serde_json::json!({
    "url": response.url,
    "status": response.status,
    "body": response.body,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn response(url: &str) -> Response {
    Response {
      url: url.to_string(),
      status: 200,
      headers: Default::default(),
      body: json!({ "ok": true }),
    }
  }

  #[test]
  fn test_normalise_shapes() {
    assert_eq!(PerformOutput::Empty.into_value(), Value::Null);
    assert_eq!(
      PerformOutput::from(response("https://a.test")).into_value(),
      json!({ "url": "https://a.test", "status": 200, "body": { "ok": true } })
    );
    let many = PerformOutput::from(vec![response("https://a.test"), response("https://b.test")]);
    assert_eq!(many.into_value().as_array().map(Vec::len), Some(2));
    assert_eq!(PerformOutput::Data(json!(1)).into_value(), json!(1));
  }
}
