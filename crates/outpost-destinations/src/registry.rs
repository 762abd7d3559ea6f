use std::collections::BTreeMap;
use std::sync::Arc;

use outpost_action::{DestinationDefinition, DestinationManifest};
use outpost_config::DestinationMode;
use outpost_request::SharedClient;
use thiserror::Error;
use tracing::debug;

use crate::{adobe_target, facebook, heap};

/// Errors from destination lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// No destination with this slug is registered.
  #[error("unknown destination '{slug}'")]
  UnknownDestination { slug: String },

  /// The destination only runs in the browser.
  #[error("destination '{slug}' runs in web mode and cannot be dispatched server-side")]
  WebOnly { slug: String },
}

/// Registered destinations, keyed by slug.
///
/// Cloud destinations are kept whole so they can be dispatched; web
/// destinations contribute their manifest only, since their actions run
/// against a page runtime.
#[derive(Default)]
pub struct Registry {
  cloud: BTreeMap<String, Arc<DestinationDefinition<SharedClient>>>,
  manifests: BTreeMap<String, DestinationManifest>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every destination shipped with Outpost.
  pub fn standard() -> Self {
    let mut registry = Self::new();
    registry.register_cloud(heap::definition());
    registry.register_cloud(facebook::definition());
    registry.register_web(&adobe_target::definition());
    registry
  }

  /// Register a cloud destination, replacing any with the same slug.
  pub fn register_cloud(&mut self, definition: DestinationDefinition<SharedClient>) {
    debug!(slug = %definition.slug, "registering cloud destination");
    self
      .manifests
      .insert(definition.slug.clone(), definition.manifest());
    self
      .cloud
      .insert(definition.slug.clone(), Arc::new(definition));
  }

  /// Register a web destination's manifest.
  pub fn register_web<C>(&mut self, definition: &DestinationDefinition<C>) {
    debug!(slug = %definition.slug, "registering web destination");
    self.cloud.remove(&definition.slug);
    self
      .manifests
      .insert(definition.slug.clone(), definition.manifest());
  }

  /// A cloud destination by slug.
  pub fn cloud(&self, slug: &str) -> Result<Arc<DestinationDefinition<SharedClient>>, RegistryError> {
    if let Some(definition) = self.cloud.get(slug) {
      return Ok(definition.clone());
    }
    match self.manifests.get(slug) {
      Some(manifest) if manifest.mode == DestinationMode::Web => Err(RegistryError::WebOnly {
        slug: slug.to_string(),
      }),
      _ => Err(RegistryError::UnknownDestination {
        slug: slug.to_string(),
      }),
    }
  }

  pub fn manifest(&self, slug: &str) -> Result<&DestinationManifest, RegistryError> {
    self
      .manifests
      .get(slug)
      .ok_or_else(|| RegistryError::UnknownDestination {
        slug: slug.to_string(),
      })
  }

  /// Manifests of every registered destination, ordered by slug.
  pub fn manifests(&self) -> impl Iterator<Item = &DestinationManifest> {
    self.manifests.values()
  }
}
