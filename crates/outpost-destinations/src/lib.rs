//! Destinations shipped with Outpost.
//!
//! Each destination is built by an explicit constructor; nothing registers
//! itself at load time. [`Registry::standard`] collects them for tooling.
//!
//! - [`heap`]: Heap server-side tracking (cloud)
//! - [`facebook`]: Facebook Conversions API (cloud)
//! - [`adobe_target`]: Adobe Target at.js (web)

pub mod adobe_target;
pub mod facebook;
pub mod heap;
mod registry;

pub use registry::{Registry, RegistryError};
