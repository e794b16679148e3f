//! Descriptor store and bundle discovery.
//!
//! The store is filled once at startup, either bundle by bundle or by scanning
//! search paths, and is read-only afterwards.

use crate::bundle::{is_bundle, load_bundle};
use crate::descriptor::PluginDescriptor;
use crate::error::LoadError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable holding a platform path list of bundle directories.
pub const PLUGIN_PATH_ENV: &str = "TUTTI_PLUGIN_PATH";

/// Owns every discovered descriptor.
#[derive(Debug, Default, Clone)]
pub struct DescriptorStore {
    descriptors: Vec<Arc<PluginDescriptor>>,
}

impl DescriptorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one bundle and append its descriptors. Returns how many were added.
    pub fn load_bundle(&mut self, location: impl AsRef<Path>) -> Result<usize, LoadError> {
        let loaded = load_bundle(location)?;
        let count = loaded.len();
        self.descriptors.extend(loaded.into_iter().map(Arc::new));
        Ok(count)
    }

    pub fn insert(&mut self, descriptor: PluginDescriptor) {
        self.descriptors.push(Arc::new(descriptor));
    }

    pub fn descriptors(&self) -> &[Arc<PluginDescriptor>] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Outcome of scanning search paths.
///
/// Bundles that fail to load do not abort discovery; they are collected in
/// `failures` so the caller decides what to do with them.
#[derive(Debug, Default)]
pub struct Discovery {
    pub store: DescriptorStore,
    pub bundles: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, LoadError)>,
}

/// Scan each search path for bundle directories and load them.
///
/// Missing search paths are skipped. Bundles are visited in sorted path order.
pub fn discover<P: AsRef<Path>>(search_paths: &[P]) -> Discovery {
    let mut discovery = Discovery::default();

    for path in bundle_paths(search_paths) {
        match discovery.store.load_bundle(&path) {
            Ok(count) => {
                tracing::debug!("Bundle {} provided {} plugin(s)", path.display(), count);
                discovery.bundles.push(path);
            }
            Err(e) => {
                tracing::warn!("Failed to load bundle {}: {}", path.display(), e);
                discovery.failures.push((path, e));
            }
        }
    }

    tracing::info!(
        "Discovered {} plugin(s) in {} bundle(s) ({} failed)",
        discovery.store.len(),
        discovery.bundles.len(),
        discovery.failures.len()
    );
    discovery
}

/// Bundle directories directly under the given search paths, sorted.
pub fn bundle_paths<P: AsRef<Path>>(search_paths: &[P]) -> Vec<PathBuf> {
    let mut bundles = Vec::new();

    for root in search_paths {
        let root = root.as_ref();
        if is_bundle(root) {
            bundles.push(root.to_path_buf());
            continue;
        }
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping search path {}: {}", root.display(), e);
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if is_bundle(&path) {
                bundles.push(path);
            }
        }
    }

    bundles.sort();
    bundles.dedup();
    bundles
}

/// Search paths from `TUTTI_PLUGIN_PATH`, or the platform defaults when unset.
pub fn default_search_paths() -> Vec<PathBuf> {
    match std::env::var_os(PLUGIN_PATH_ENV) {
        Some(value) if !value.is_empty() => std::env::split_paths(&value).collect(),
        _ => platform_search_paths(),
    }
}

fn platform_search_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Library/Audio/Plug-Ins/Tutti"),
            PathBuf::from(format!(
                "{}/Library/Audio/Plug-Ins/Tutti",
                std::env::var("HOME").unwrap_or_default()
            )),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        vec![
            PathBuf::from("C:\\Program Files\\Common Files\\Tutti"),
            PathBuf::from("C:\\Program Files (x86)\\Common Files\\Tutti"),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![
            PathBuf::from("/usr/lib/tutti"),
            PathBuf::from("/usr/local/lib/tutti"),
            PathBuf::from(format!(
                "{}/.tutti",
                std::env::var("HOME").unwrap_or_default()
            )),
        ]
    }
}
