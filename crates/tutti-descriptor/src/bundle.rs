//! Bundle loading.
//!
//! A bundle is a directory holding a `manifest.toml` that lists one or more
//! plugins, plus whatever binaries those plugins name.

use crate::descriptor::PluginDescriptor;
use crate::error::{DescriptorError, LoadError};
use crate::port::{Capability, ControlRange, PortCaps, PortDescriptor};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default, rename = "plugin")]
    plugins: Vec<ManifestPlugin>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestPlugin {
    uri: Option<String>,
    name: Option<String>,
    binary: Option<String>,
    #[serde(default)]
    required_features: Vec<String>,
    #[serde(default, rename = "port")]
    ports: Vec<ManifestPort>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestPort {
    index: Option<usize>,
    symbol: Option<String>,
    name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    default: Option<f32>,
    minimum: Option<f32>,
    maximum: Option<f32>,
}

/// Load every plugin described by the bundle at `location`.
///
/// `location` may be the bundle directory or its manifest file. A bundle
/// listing no plugins yields an empty vector.
pub fn load_bundle(location: impl AsRef<Path>) -> Result<Vec<PluginDescriptor>, LoadError> {
    let location = location.as_ref();
    let (bundle_dir, manifest_path) = resolve(location)?;

    let text = std::fs::read_to_string(&manifest_path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: location.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: manifest_path.clone(),
                source,
            }
        }
    })?;

    parse_manifest(&text, &bundle_dir)
}

/// Parse manifest text as if it were loaded from `bundle_dir`.
pub fn parse_manifest(text: &str, bundle_dir: &Path) -> Result<Vec<PluginDescriptor>, LoadError> {
    let malformed = |reason: String| LoadError::Malformed {
        path: bundle_dir.to_path_buf(),
        reason,
    };

    let manifest: Manifest = toml::from_str(text).map_err(|e| malformed(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut descriptors = Vec::with_capacity(manifest.plugins.len());
    for (i, plugin) in manifest.plugins.into_iter().enumerate() {
        let descriptor = build_plugin(plugin, bundle_dir)
            .map_err(|e| malformed(format!("plugin #{}: {}", i, e)))?;
        if !seen.insert(descriptor.uri().to_string()) {
            return Err(malformed(format!(
                "plugin #{}: URI {} declared twice",
                i,
                descriptor.uri()
            )));
        }
        descriptors.push(descriptor);
    }

    tracing::debug!(
        "Loaded {} plugin(s) from {}",
        descriptors.len(),
        bundle_dir.display()
    );
    Ok(descriptors)
}

/// Check whether `dir` looks like a bundle.
pub fn is_bundle(dir: &Path) -> bool {
    dir.is_dir() && dir.join(MANIFEST_FILE).is_file()
}

fn resolve(location: &Path) -> Result<(PathBuf, PathBuf), LoadError> {
    if location.is_dir() {
        return Ok((location.to_path_buf(), location.join(MANIFEST_FILE)));
    }
    if location.is_file() {
        let dir = location
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        return Ok((dir, location.to_path_buf()));
    }
    Err(LoadError::NotFound {
        path: location.to_path_buf(),
    })
}

fn build_plugin(plugin: ManifestPlugin, bundle_dir: &Path) -> Result<PluginDescriptor, DescriptorError> {
    let uri = plugin.uri.ok_or(DescriptorError::MissingField("uri"))?;
    let name = plugin.name.ok_or(DescriptorError::MissingField("name"))?;

    let mut builder = PluginDescriptor::builder(uri, name).bundle(bundle_dir);
    if let Some(binary) = plugin.binary {
        builder = builder.binary(binary);
    }
    for feature in plugin.required_features {
        builder = builder.required_feature(feature);
    }
    for port in plugin.ports {
        builder = builder.port(build_port(port)?);
    }
    builder.build()
}

fn build_port(port: ManifestPort) -> Result<PortDescriptor, DescriptorError> {
    let index = port.index.ok_or(DescriptorError::MissingField("port index"))?;
    let symbol = port.symbol.ok_or(DescriptorError::MissingField("port symbol"))?;

    let mut caps = PortCaps::EMPTY;
    for name in &port.types {
        let cap = Capability::from_manifest(name).ok_or_else(|| DescriptorError::UnknownPortType {
            index,
            name: name.clone(),
        })?;
        caps.insert(cap);
    }

    let mut descriptor = PortDescriptor::new(index, symbol, caps);
    if let Some(name) = port.name {
        descriptor = descriptor.named(name);
    }

    // Only control ports carry a range. Missing bounds widen to include [0, 1].
    if port.default.is_some() || port.minimum.is_some() || port.maximum.is_some() {
        if !caps.contains(Capability::Control) {
            return Err(DescriptorError::InvalidRange { index });
        }
        let default = port.default.or(port.minimum).unwrap_or(0.0);
        let minimum = port.minimum.unwrap_or(default.min(0.0));
        let maximum = port.maximum.unwrap_or(default.max(1.0).max(minimum));
        descriptor = descriptor.ranged(ControlRange::new(default, minimum, maximum));
    }

    Ok(descriptor)
}
