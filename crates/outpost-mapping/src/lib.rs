//! Outpost Mapping
//!
//! Evaluates field defaults and subscription overrides against a raw event.
//!
//! A mapping is plain JSON. Literals pass through verbatim; single-key objects
//! whose key starts with `@` are directives:
//!
//! ```json
//! {
//!   "message_id": { "@path": "$.messageId" },
//!   "full_name": { "@template": "{{ traits.first }} {{ traits.last }}" },
//!   "plan": { "@if": { "exists": { "@path": "$.traits.plan" }, "then": { "@path": "$.traits.plan" }, "else": "free" } },
//!   "products": { "@arrayPath": ["$.properties.products", { "sku": { "@path": "$.id" } }] }
//! }
//! ```
//!
//! Paths have two roots: `@` always names the whole event, `$` names the
//! current context, which is the event at the top level and the current item
//! inside `@arrayPath`.

mod directive;
mod error;
mod path;
mod template;

pub use directive::{array_path, literal, map_value, path, template};
pub use error::MappingError;
pub use path::{Path, Root, Scope, Segment, resolve, resolve_str};
