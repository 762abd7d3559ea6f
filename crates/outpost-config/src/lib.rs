//! Outpost Config
//!
//! This crate contains the serializable declaration types for Outpost.
//! Field declarations and action platforms are authored in code by each
//! destination; subscriptions and settings arrive as JSON configuration
//! external to the engine.
//!
//! Configuration can be loaded from:
//! - JSON files (via CLI with `--config=heap.json`)
//! - `<data-dir>/destinations/<slug>.json`
//!
//! The engine validates settings against the destination's field declarations
//! once, compiles subscription filters, and only then dispatches events.

mod destination;
mod enums;
mod field;
mod subscription;

pub use destination::DestinationConfig;
pub use enums::{DestinationMode, Platform};
pub use field::{FieldDef, FieldType};
pub use subscription::SubscriptionDef;
