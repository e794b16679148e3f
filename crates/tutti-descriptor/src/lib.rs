//! Plugin descriptors for the Tutti plugin host
//!
//! Everything the host knows about a plugin before it is instantiated:
//!
//! - **Descriptor store**: plugin metadata loaded from bundles on disk
//! - **Port schema**: ordered ports tagged from `{input, output, audio, control}`
//! - **Registry**: descriptors indexed by URI
//!
//! ## Usage
//!
//! ```ignore
//! use tutti_descriptor::{discover, default_search_paths, Capability, Registry};
//!
//! let discovery = discover(&default_search_paths());
//! let registry = Registry::build(&discovery.store)?;
//!
//! if let Some(gain) = registry.find_by_uri("http://example.org/plugins/gain") {
//!     for port in gain.ports() {
//!         println!("{} {}", port.symbol(), port.caps());
//!     }
//!     assert!(gain.port_at(0)?.has_capability(Capability::Control));
//! }
//! ```

pub mod error;
pub use error::{DescriptorError, LoadError, PortError, RegistryError};

mod port;
pub use port::{Capability, ControlRange, PortCaps, PortDescriptor};

mod descriptor;
pub use descriptor::{FeatureSet, PluginDescriptor, PluginDescriptorBuilder};

mod bundle;
pub use bundle::{is_bundle, load_bundle, parse_manifest, MANIFEST_FILE};

mod store;
pub use store::{
    bundle_paths, default_search_paths, discover, DescriptorStore, Discovery, PLUGIN_PATH_ENV,
};

mod registry;
pub use registry::Registry;
