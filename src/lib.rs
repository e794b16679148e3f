//! # Tutti Host
//!
//! A minimal plugin host: discover plugin bundles, index them by URI and drive
//! instances through their lifecycle against caller-owned buffers.
//!
//! ## Architecture
//!
//! ```text
//!   search paths ──► DescriptorStore ──► Registry ──► Host::instantiate
//!                    (bundle loading)    (by URI)          │
//!                                                          ▼
//!                 caller buffers ──connect_port──► PluginInstance
//!                                                  Created → Activated → Running
//!                                                        → Deactivated → Freed
//! ```
//!
//! - [`descriptor`]: bundles, port schema, registry (`tutti-descriptor`)
//! - [`plugin`]: instance lifecycle, buffer binding, processors (`tutti-plugin`)
//! - [`Host::render`]: offline rendering over a test tone, with WAV output
//!
//! ## Quick Start
//!
//! ```ignore
//! use tutti_host::prelude::*;
//! use std::cell::Cell;
//!
//! let host = Host::builder().search_path("./plugins").build()?;
//!
//! let gain = Cell::new(0.5);
//! let input = audio_cells(128);
//! let output = audio_cells(128);
//!
//! let mut instance = host.instantiate("http://example.org/plugins/gain", 48000.0)?;
//! instance.connect_port(0, PortBuffer::control_cell(&gain))?;
//! instance.connect_port(1, PortBuffer::audio_cells(&input))?;
//! instance.connect_port(2, PortBuffer::audio_cells(&output))?;
//!
//! instance.activate()?;
//! instance.run(128)?;
//! instance.deactivate()?;
//! instance.free();
//! ```
//!
//! ## Feature Flags
//!
//! - `dylib` (default): load plugin code from shared libraries named by a
//!   manifest's `binary`. Without it only `builtin:` processors work.

/// Descriptor store, port schema and URI registry.
pub mod descriptor {
    pub use tutti_descriptor::*;
}

/// Instance lifecycle, buffer binding and processors.
pub mod plugin {
    pub use tutti_plugin::*;
}

mod error;
pub use error::{Error, Result};

mod config;
pub use config::{HostConfig, MAX_BLOCK_SIZE};

mod builder;
mod host;
mod render;

pub use builder::HostBuilder;
pub use host::Host;
pub use render::{RenderOptions, Rendered};

/// Convenience prelude for common imports
pub mod prelude {
    // Host
    pub use crate::{Error, Host, HostBuilder, HostConfig, RenderOptions, Rendered};

    // Descriptors
    pub use crate::descriptor::{
        Capability, ControlRange, FeatureSet, PluginDescriptor, PortCaps, PortDescriptor, Registry,
    };

    // Instances and buffers
    pub use crate::plugin::{
        audio_cells, read_cells, InstanceState, PluginInstance, PortBuffer, Processor,
        ProcessorFactory,
    };
}
