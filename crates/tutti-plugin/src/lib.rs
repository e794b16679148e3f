//! Plugin instance hosting for Tutti
//!
//! Turns a [`PluginDescriptor`] into a running plugin:
//!
//! - **Instance lifecycle**: `Created → Activated → Running → Deactivated → Freed`,
//!   with `Failed` on internal plugin errors
//! - **Buffer binding**: ports are bound to caller-owned memory, never copied
//! - **Processors**: built-ins (`builtin:gain`, ...) or dynamic libraries
//!   exporting the `tutti_plugin_entry` C ABI
//!
//! ## Usage
//!
//! ```ignore
//! use tutti_plugin::{audio_cells, PluginInstance, PortBuffer, ProcessorLibrary};
//! use std::cell::Cell;
//!
//! let library = ProcessorLibrary::new();
//! let mut instance = PluginInstance::instantiate(descriptor, 48000.0, &features, &library)?;
//!
//! let gain = Cell::new(0.5);
//! let (input, output) = (audio_cells(128), audio_cells(128));
//! instance.connect_port(0, PortBuffer::control_cell(&gain))?;
//! instance.connect_port(1, PortBuffer::audio_cells(&input))?;
//! instance.connect_port(2, PortBuffer::audio_cells(&output))?;
//!
//! instance.activate()?;
//! instance.run(128)?;
//! instance.deactivate()?;
//! instance.free();
//! ```

pub mod error;
pub use error::{ConnectError, InstantiateError, ProcessError, RunError, StateError};

mod buffer;
pub use buffer::{audio_cells, read_cells, BindingTable, PortBuffer, PortData};

mod processor;
pub use processor::{Processor, ProcessorFactory};

pub mod instance;
pub use instance::{InstanceState, PluginInstance};

mod builtin;
pub use builtin::{builtin_factories, Builtin, BUILTIN_PREFIX};

#[cfg(feature = "dylib")]
pub mod dylib;

mod library;
pub use library::ProcessorLibrary;

pub use tutti_descriptor::{FeatureSet, PluginDescriptor};
