//! Host facade: discovery, registry and instantiation in one place.

use crate::config::HostConfig;
use crate::{Error, HostBuilder, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tutti_descriptor::{discover, load_bundle, LoadError, PluginDescriptor, Registry, RegistryError};
use tutti_plugin::{InstantiateError, PluginInstance, ProcessorLibrary};

/// A plugin host.
///
/// Owns the registry and the processor library. Instances hold their own
/// `Arc` to the descriptor, so they never borrow the host; their lifetime is
/// tied only to the buffers connected to them.
///
/// # Example
///
/// ```ignore
/// use tutti_host::prelude::*;
///
/// let host = Host::builder()
///     .search_path("/usr/lib/tutti")
///     .build()?;
///
/// for plugin in host.plugins() {
///     println!("{} ({} ports)", plugin.uri(), plugin.port_count());
/// }
///
/// let mut gain = host.instantiate("http://example.org/plugins/gain", 48000.0)?;
/// ```
pub struct Host {
    config: HostConfig,
    registry: Registry,
    library: ProcessorLibrary,
    failures: Vec<(PathBuf, LoadError)>,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    /// Scan `config.search_paths` and build a host with the standard library.
    pub fn new(config: HostConfig) -> Result<Self> {
        Self::discover(config, ProcessorLibrary::new())
    }

    /// Scan `config.search_paths` with a custom processor library.
    pub fn discover(config: HostConfig, library: ProcessorLibrary) -> Result<Self> {
        config.validate()?;

        let discovery = discover(&config.search_paths);
        let registry = Registry::build(&discovery.store)?;

        Ok(Self {
            config,
            registry,
            library,
            failures: discovery.failures,
        })
    }

    /// Host over an already populated registry. Nothing is scanned.
    pub fn from_registry(
        config: HostConfig,
        registry: Registry,
        library: ProcessorLibrary,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            library,
            failures: Vec::new(),
        })
    }

    /// Load one more bundle and register its plugins. Returns how many were added.
    ///
    /// Nothing is registered if any URI in the bundle is already known.
    pub fn load_bundle(&mut self, location: impl AsRef<Path>) -> Result<usize> {
        let descriptors = load_bundle(location.as_ref())?;

        if let Some(dup) = descriptors.iter().find(|d| self.registry.contains(d.uri())) {
            return Err(RegistryError::DuplicateUri(dup.uri().to_string()).into());
        }

        let count = descriptors.len();
        for descriptor in descriptors {
            self.registry.register(descriptor)?;
        }

        tracing::debug!(
            "Registered {} plugin(s) from {}",
            count,
            location.as_ref().display()
        );
        Ok(count)
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn library(&self) -> &ProcessorLibrary {
        &self.library
    }

    /// Bundles skipped during discovery, with the reason.
    pub fn failures(&self) -> &[(PathBuf, LoadError)] {
        &self.failures
    }

    pub fn find(&self, uri: &str) -> Option<&Arc<PluginDescriptor>> {
        self.registry.find_by_uri(uri)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &Arc<PluginDescriptor>> + '_ {
        self.registry.all()
    }

    /// Instantiate the plugin registered under `uri`.
    pub fn instantiate<'a>(&self, uri: &str, sample_rate: f64) -> Result<PluginInstance<'a>> {
        let descriptor = self
            .find(uri)
            .ok_or_else(|| Error::UnknownPlugin(uri.to_string()))?;
        Ok(self.instantiate_descriptor(descriptor, sample_rate)?)
    }

    /// Instantiate a descriptor directly, whether or not it is registered.
    pub fn instantiate_descriptor<'a>(
        &self,
        descriptor: &Arc<PluginDescriptor>,
        sample_rate: f64,
    ) -> std::result::Result<PluginInstance<'a>, InstantiateError> {
        PluginInstance::instantiate(
            Arc::clone(descriptor),
            sample_rate,
            &self.config.supported_features,
            &self.library,
        )
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("plugins", &self.registry.len())
            .field("failures", &self.failures.len())
            .field("config", &self.config)
            .field("library", &self.library)
            .finish()
    }
}
