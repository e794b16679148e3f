//! Host configuration.

use crate::{Error, Result};
use std::path::PathBuf;
use tutti_descriptor::{default_search_paths, FeatureSet};

/// Largest block the host will hand to a plugin in one `run` call.
pub const MAX_BLOCK_SIZE: usize = 65536;

/// Configuration for the plugin host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Feature identifiers the host provides to plugins. Empty by default, so
    /// any plugin that requires a feature fails to instantiate.
    pub supported_features: FeatureSet,
    /// Directories scanned for bundles.
    pub search_paths: Vec<PathBuf>,
    /// Frames per processing block.
    pub block_size: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            supported_features: FeatureSet::new(),
            search_paths: default_search_paths(),
            block_size: 512,
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "block_size {} out of range (1-{} frames)",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if let Some(feature) = self.supported_features.iter().find(|f| f.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "supported feature {:?} is blank",
                feature
            )));
        }
        Ok(())
    }

    pub fn supports(&self, feature: &str) -> bool {
        self.supported_features.contains(feature)
    }
}
