//! Builder for configuring and constructing a `Host`.

use crate::config::HostConfig;
use crate::{Host, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tutti_plugin::{ProcessorFactory, ProcessorLibrary};

/// Search paths start out as the platform defaults (or `TUTTI_PLUGIN_PATH`).
/// The first call to [`search_path`](Self::search_path) replaces them; later
/// calls append.
///
/// # Example
///
/// ```ignore
/// use tutti_host::prelude::*;
///
/// let host = Host::builder()
///     .search_path("./plugins")
///     .feature("urn:tutti:feature:fixed-block")
///     .block_size(256)
///     .build()?;
/// ```
pub struct HostBuilder {
    config: HostConfig,
    library: ProcessorLibrary,
    bundles: Vec<PathBuf>,
    custom_paths: bool,
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self {
            config: HostConfig::default(),
            library: ProcessorLibrary::new(),
            bundles: Vec::new(),
            custom_paths: false,
        }
    }
}

impl HostBuilder {
    /// Declare a feature the host supports.
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.config.supported_features.insert(feature.into());
        self
    }

    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .supported_features
            .extend(features.into_iter().map(Into::into));
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        if !self.custom_paths {
            self.config.search_paths.clear();
            self.custom_paths = true;
        }
        self.config.search_paths.push(path.into());
        self
    }

    /// Skip directory scanning. Only bundles added with [`bundle`](Self::bundle)
    /// are loaded.
    pub fn no_search_paths(mut self) -> Self {
        self.config.search_paths.clear();
        self.custom_paths = true;
        self
    }

    /// Load a specific bundle after discovery. Unlike discovered bundles, a
    /// failure here fails the build.
    pub fn bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundles.push(path.into());
        self
    }

    pub fn block_size(mut self, frames: usize) -> Self {
        self.config.block_size = frames;
        self
    }

    /// Register a processor reachable from manifests as `builtin:<name>`.
    pub fn processor(mut self, name: impl Into<String>, factory: impl ProcessorFactory + 'static) -> Self {
        self.library.register(name, Arc::new(factory));
        self
    }

    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self.custom_paths = true;
        self
    }

    pub fn build(self) -> Result<Host> {
        let mut host = Host::discover(self.config, self.library)?;
        for bundle in &self.bundles {
            host.load_bundle(bundle)?;
        }

        tracing::info!(
            "Plugin host ready: {} plugin(s), {} bundle(s) skipped",
            host.registry().len(),
            host.failures().len()
        );
        Ok(host)
    }
}
