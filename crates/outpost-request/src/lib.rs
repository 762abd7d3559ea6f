//! Outpost Request
//!
//! Actions never build their own transport. They receive a [`RequestClient`]
//! and describe each call with [`RequestOptions`]; the client decides how the
//! call is made.
//!
//! - [`HttpClient`] sends real requests with reqwest.
//! - [`ExtendedClient`] layers destination-wide defaults (auth headers) over
//!   another client.
//! - [`MockClient`] records requests and answers with canned responses, for
//!   tests and dry runs.

mod client;
mod error;
mod extended;
mod http;
mod method;
mod mock;
mod options;
mod response;

pub use client::{RequestClient, SharedClient};
pub use error::RequestError;
pub use extended::ExtendedClient;
pub use http::HttpClient;
pub use method::Method;
pub use mock::{MockClient, RecordedRequest};
pub use options::{RequestDefaults, RequestOptions};
pub use response::Response;
