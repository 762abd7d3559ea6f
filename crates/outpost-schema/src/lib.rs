//! Outpost Schema
//!
//! Builds a fully resolved, type-checked [`Payload`] from a set of field
//! declarations and a raw event, and validates destination [`Settings`].
//!
//! # Flow
//! 1. Resolution: the subscription override, else the field default, is
//!    evaluated against the event via `outpost-mapping`.
//! 2. Null handling: `null` on a field without `allowNull` counts as absent.
//! 3. Requiredness: an absent required field fails with `MissingRequiredField`.
//! 4. Coercion: the value is checked against the declared type, with a narrow
//!    set of coercions (ISO-8601 string → datetime, numeric string → number, ...).
//!
//! Validation is fail-fast: the first failing field, in declaration order, is
//! reported.

mod coerce;
mod error;
mod payload;
mod validate;

pub use coerce::{coerce_value, parse_datetime};
pub use error::ValidationError;
pub use payload::{Payload, Settings};
pub use validate::{validate_payload, validate_settings};
