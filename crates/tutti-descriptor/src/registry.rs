//! Registry of plugin descriptors indexed by URI.
//!
//! Built from a [`DescriptorStore`] and read-only afterwards. The registry is an
//! ordinary owned value passed to whoever needs it; there is no global world.

use crate::descriptor::PluginDescriptor;
use crate::error::RegistryError;
use crate::store::DescriptorStore;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    descriptors: Vec<Arc<PluginDescriptor>>,
    by_uri: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every descriptor of `store`, in store order.
    pub fn build(store: &DescriptorStore) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in store.descriptors() {
            registry.register(Arc::clone(descriptor))?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        descriptor: impl Into<Arc<PluginDescriptor>>,
    ) -> Result<(), RegistryError> {
        let descriptor = descriptor.into();
        if self.by_uri.contains_key(descriptor.uri()) {
            return Err(RegistryError::DuplicateUri(descriptor.uri().to_string()));
        }
        tracing::debug!("Registered plugin {}", descriptor.uri());
        self.by_uri
            .insert(descriptor.uri().to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Absence is a normal outcome, not an error.
    pub fn find_by_uri(&self, uri: &str) -> Option<&Arc<PluginDescriptor>> {
        self.by_uri.get(uri).map(|&i| &self.descriptors[i])
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.by_uri.contains_key(uri)
    }

    /// Every descriptor in registration order. The iterator is `Clone`, so it
    /// can be restarted without touching the registry.
    pub fn all(&self) -> std::slice::Iter<'_, Arc<PluginDescriptor>> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Arc<PluginDescriptor>;
    type IntoIter = std::slice::Iter<'a, Arc<PluginDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}
