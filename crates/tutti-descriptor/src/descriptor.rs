//! Plugin descriptors and the port schema query surface.

use crate::error::{DescriptorError, PortError};
use crate::port::{Capability, PortCaps, PortDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Set of feature identifiers, either required by a plugin or supported by a host.
pub type FeatureSet = BTreeSet<String>;

/// Static metadata for one plugin: identity, ports and requirements.
///
/// Immutable once built. Hosts share it behind an `Arc`. Deserializing goes
/// through [`PluginDescriptorBuilder::build`], so a cached descriptor is held
/// to the same port invariants as one loaded from a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct PluginDescriptor {
    uri: String,
    name: String,
    ports: Vec<PortDescriptor>,
    required_features: FeatureSet,

    /// Manifest `binary` entry: `builtin:<name>` or a library path.
    binary: Option<String>,

    /// Bundle directory the descriptor was loaded from.
    bundle: PathBuf,
}

/// Unchecked wire form of [`PluginDescriptor`].
#[derive(Deserialize)]
struct RawDescriptor {
    uri: String,
    name: String,
    #[serde(default)]
    ports: Vec<PortDescriptor>,
    #[serde(default)]
    required_features: FeatureSet,
    #[serde(default)]
    binary: Option<String>,
    #[serde(default)]
    bundle: PathBuf,
}

impl TryFrom<RawDescriptor> for PluginDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        PluginDescriptorBuilder {
            uri: raw.uri,
            name: raw.name,
            ports: raw.ports,
            required_features: raw.required_features,
            binary: raw.binary,
            bundle: raw.bundle,
        }
        .build()
    }
}

impl PluginDescriptor {
    pub fn builder(uri: impl Into<String>, name: impl Into<String>) -> PluginDescriptorBuilder {
        PluginDescriptorBuilder {
            uri: uri.into(),
            name: name.into(),
            ports: Vec::new(),
            required_features: FeatureSet::new(),
            binary: None,
            bundle: PathBuf::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary(&self) -> Option<&str> {
        self.binary.as_deref()
    }

    pub fn bundle(&self) -> &Path {
        &self.bundle
    }

    pub fn required_features(&self) -> &FeatureSet {
        &self.required_features
    }

    /// Required features missing from `supported`, in sorted order.
    pub fn missing_features<'a>(&'a self, supported: &'a FeatureSet) -> impl Iterator<Item = &'a str> {
        self.required_features
            .difference(supported)
            .map(String::as_str)
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn port_at(&self, index: usize) -> Result<&PortDescriptor, PortError> {
        self.ports.get(index).ok_or(PortError::IndexOutOfRange {
            index,
            count: self.ports.len(),
        })
    }

    /// Ports in index order. `ports()[i].index() == i` always holds.
    pub fn ports(&self) -> &[PortDescriptor] {
        &self.ports
    }

    pub fn port_by_symbol(&self, symbol: &str) -> Option<&PortDescriptor> {
        self.ports.iter().find(|p| p.symbol() == symbol)
    }

    /// Ports carrying every tag in `caps`.
    pub fn ports_with(&self, caps: PortCaps) -> impl Iterator<Item = &PortDescriptor> + Clone {
        self.ports.iter().filter(move |p| p.caps().contains_all(caps))
    }

    pub fn audio_inputs(&self) -> impl Iterator<Item = &PortDescriptor> + Clone {
        self.ports_with(PortCaps::AUDIO | PortCaps::INPUT)
    }

    pub fn audio_outputs(&self) -> impl Iterator<Item = &PortDescriptor> + Clone {
        self.ports_with(PortCaps::AUDIO | PortCaps::OUTPUT)
    }

    pub fn control_inputs(&self) -> impl Iterator<Item = &PortDescriptor> + Clone {
        self.ports_with(PortCaps::CONTROL | PortCaps::INPUT)
    }
}

pub struct PluginDescriptorBuilder {
    uri: String,
    name: String,
    ports: Vec<PortDescriptor>,
    required_features: FeatureSet,
    binary: Option<String>,
    bundle: PathBuf,
}

impl PluginDescriptorBuilder {
    pub fn port(mut self, port: PortDescriptor) -> Self {
        self.ports.push(port);
        self
    }

    pub fn ports(mut self, ports: impl IntoIterator<Item = PortDescriptor>) -> Self {
        self.ports.extend(ports);
        self
    }

    pub fn required_feature(mut self, feature: impl Into<String>) -> Self {
        self.required_features.insert(feature.into());
        self
    }

    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    pub fn bundle(mut self, bundle: impl Into<PathBuf>) -> Self {
        self.bundle = bundle.into();
        self
    }

    /// Validate the port invariants and freeze the descriptor.
    ///
    /// Ports may be supplied in any order; they are stored sorted by index and
    /// must form the range `[0, n)`.
    pub fn build(mut self) -> Result<PluginDescriptor, DescriptorError> {
        if self.uri.trim().is_empty() {
            return Err(DescriptorError::MissingField("uri"));
        }
        if self.name.trim().is_empty() {
            return Err(DescriptorError::MissingField("name"));
        }

        self.ports.sort_by_key(PortDescriptor::index);

        let mut symbols = HashSet::with_capacity(self.ports.len());
        for (expected, port) in self.ports.iter().enumerate() {
            let index = port.index();
            if index < expected {
                return Err(DescriptorError::DuplicatePortIndex { index });
            }
            if index > expected {
                return Err(DescriptorError::NonContiguousPorts {
                    expected,
                    found: index,
                });
            }
            validate_port(port)?;
            if !symbols.insert(port.symbol()) {
                return Err(DescriptorError::DuplicateSymbol(port.symbol().to_string()));
            }
        }

        Ok(PluginDescriptor {
            uri: self.uri,
            name: self.name,
            ports: self.ports,
            required_features: self.required_features,
            binary: self.binary,
            bundle: self.bundle,
        })
    }
}

fn validate_port(port: &PortDescriptor) -> Result<(), DescriptorError> {
    let index = port.index();
    let caps = port.caps();

    if port.symbol().trim().is_empty() {
        return Err(DescriptorError::MissingField("port symbol"));
    }
    if caps.is_empty() {
        return Err(DescriptorError::EmptyCapabilities { index });
    }
    if caps.contains(Capability::Input) && caps.contains(Capability::Output) {
        return Err(DescriptorError::ConflictingDirection { index });
    }
    if caps.contains(Capability::Audio) && caps.contains(Capability::Control) {
        return Err(DescriptorError::ConflictingDataType { index });
    }
    if let Some(range) = port.range() {
        if !range.is_valid() {
            return Err(DescriptorError::InvalidRange { index });
        }
    }
    Ok(())
}
