//! Subscription matching.
//!
//! A subscription's `subscribe` string is a small boolean filter over the
//! event envelope:
//!
//! ```text
//! type = "track" or type = "page" or type = "screen"
//! type = "track" and not event = "Order Completed"
//! contains(context.page.url, "/checkout") and match(event, "Order *")
//! all
//! ```
//!
//! Filters are parsed once when a subscription is compiled and evaluated as a
//! pure function of the event afterwards.

mod error;
mod eval;
mod filter;
mod lexer;
mod parser;
mod subscription;

pub use error::FilterError;
pub use filter::{CompareOp, Filter, Literal};
pub use subscription::Subscription;

/// Evaluate a parsed filter against an event.
pub fn matches(filter: &Filter, event: &serde_json::Value) -> bool {
  filter.matches(event)
}
