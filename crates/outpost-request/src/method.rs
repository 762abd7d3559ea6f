use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
  #[default]
  Get,
  Post,
  Put,
  Patch,
  Delete,
  Head,
  Options,
}

impl Method {
  pub(crate) fn to_reqwest(self) -> reqwest::Method {
    match self {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
      Method::Head => reqwest::Method::HEAD,
      Method::Options => reqwest::Method::OPTIONS,
    }
  }
}

impl FromStr for Method {
  type Err = RequestError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "GET" => Ok(Method::Get),
      "POST" => Ok(Method::Post),
      "PUT" => Ok(Method::Put),
      "PATCH" => Ok(Method::Patch),
      "DELETE" => Ok(Method::Delete),
      "HEAD" => Ok(Method::Head),
      "OPTIONS" => Ok(Method::Options),
      _ => Err(RequestError::InvalidMethod(s.to_string())),
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
      Method::Head => "HEAD",
      Method::Options => "OPTIONS",
    };
    f.write_str(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_method_case_insensitive() {
    assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
    assert_eq!("Get".parse::<Method>().unwrap(), Method::Get);
    assert!(matches!(
      "FETCH".parse::<Method>(),
      Err(RequestError::InvalidMethod(m)) if m == "FETCH"
    ));
  }

  #[test]
  fn test_display_round_trips() {
    assert_eq!(Method::Delete.to_string(), "DELETE");
    assert_eq!(
      Method::Delete.to_string().parse::<Method>().unwrap(),
      Method::Delete
    );
  }
}
