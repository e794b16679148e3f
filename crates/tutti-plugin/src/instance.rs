//! Plugin instance lifecycle.
//!
//! ```text
//! Created -> Activated -> Running -> Deactivated -> Freed
//!    \___________\___________\___________\--> Failed (then only free)
//! ```
//!
//! Every failed call leaves the state untouched, except an internal failure
//! inside `run`, which moves the instance to `Failed`.

use crate::buffer::{BindingTable, PortBuffer};
use crate::error::{ConnectError, InstantiateError, RunError, StateError};
use crate::processor::{Processor, ProcessorFactory};
use std::fmt;
use std::sync::Arc;
use tutti_descriptor::{FeatureSet, PluginDescriptor, PortDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    Created,
    Activated,
    Running,
    Deactivated,
    Freed,
    Failed,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceState::Created => write!(f, "created"),
            InstanceState::Activated => write!(f, "activated"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::Deactivated => write!(f, "deactivated"),
            InstanceState::Freed => write!(f, "freed"),
            InstanceState::Failed => write!(f, "failed"),
        }
    }
}

/// A live plugin bound to caller-owned buffers that outlive `'a`.
///
/// Not reentrant: callers serialize access. Distinct instances of the same
/// descriptor are independent.
pub struct PluginInstance<'a> {
    descriptor: Arc<PluginDescriptor>,
    sample_rate: f64,
    state: InstanceState,
    bindings: BindingTable<'a>,
    processor: Option<Box<dyn Processor>>,
    /// `activate` was delivered to the processor without a matching `deactivate`.
    active: bool,
}

impl<'a> PluginInstance<'a> {
    /// Create an instance in the `Created` state.
    ///
    /// Every feature the descriptor requires must be in `supported`. With an
    /// empty supported set, any plugin that requires a feature is refused.
    pub fn instantiate(
        descriptor: Arc<PluginDescriptor>,
        sample_rate: f64,
        supported: &FeatureSet,
        factory: &dyn ProcessorFactory,
    ) -> Result<Self, InstantiateError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(InstantiateError::InvalidSampleRate(sample_rate));
        }

        if let Some(feature) = descriptor.missing_features(supported).next() {
            return Err(InstantiateError::UnsupportedFeature {
                uri: descriptor.uri().to_string(),
                feature: feature.to_string(),
            });
        }

        let processor = factory.instantiate(&descriptor, sample_rate, supported)?;
        tracing::debug!("Instantiated {} at {} Hz", descriptor.uri(), sample_rate);

        Ok(Self {
            bindings: BindingTable::with_ports(descriptor.port_count()),
            descriptor,
            sample_rate,
            state: InstanceState::Created,
            processor: Some(processor),
            active: false,
        })
    }

    /// Bind `buffer` to port `index`, replacing any previous binding.
    ///
    /// Only allowed while `Created` or `Activated`.
    pub fn connect_port(&mut self, index: usize, buffer: PortBuffer<'a>) -> Result<(), ConnectError> {
        if !matches!(self.state, InstanceState::Created | InstanceState::Activated) {
            return Err(ConnectError::InvalidState { state: self.state });
        }

        let port = self
            .descriptor
            .port_at(index)
            .map_err(|_| ConnectError::IndexOutOfRange {
                index,
                count: self.descriptor.port_count(),
            })?;
        check_buffer(port, &buffer)?;

        self.bindings.bind(index, buffer);
        Ok(())
    }

    pub fn activate(&mut self) -> Result<(), StateError> {
        if self.state != InstanceState::Created {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to: InstanceState::Activated,
            });
        }
        if let Some(processor) = self.processor.as_mut() {
            processor.activate();
            self.active = true;
        }
        self.transition(InstanceState::Activated);
        Ok(())
    }

    /// Run one cycle of `frame_count` frames.
    ///
    /// Every audio and control port must be bound and every audio buffer must
    /// hold at least `frame_count` samples; nothing is processed otherwise.
    pub fn run(&mut self, frame_count: usize) -> Result<(), RunError> {
        if !matches!(self.state, InstanceState::Activated | InstanceState::Running) {
            return Err(RunError::InvalidState { state: self.state });
        }
        self.check_bindings(frame_count)?;

        if frame_count > 0 {
            let processor = self
                .processor
                .as_mut()
                .ok_or(RunError::InvalidState { state: self.state })?;

            if let Err(e) = processor.run(&self.bindings.ports(), frame_count) {
                tracing::debug!("{} failed during run: {}", self.descriptor.uri(), e);
                self.active = false;
                self.transition(InstanceState::Failed);
                return Err(RunError::Internal(e));
            }
        }

        if self.state != InstanceState::Running {
            self.transition(InstanceState::Running);
        }
        Ok(())
    }

    pub fn deactivate(&mut self) -> Result<(), StateError> {
        if !matches!(self.state, InstanceState::Activated | InstanceState::Running) {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to: InstanceState::Deactivated,
            });
        }
        self.deactivate_processor();
        self.transition(InstanceState::Deactivated);
        Ok(())
    }

    /// Release the processor and every binding.
    ///
    /// Allowed from any state. Calling it again after the first time does
    /// nothing.
    pub fn free(&mut self) {
        if self.state == InstanceState::Freed {
            return;
        }
        self.deactivate_processor();
        self.processor = None;
        self.bindings.clear();
        self.transition(InstanceState::Freed);
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn descriptor(&self) -> &Arc<PluginDescriptor> {
        &self.descriptor
    }

    pub fn uri(&self) -> &str {
        self.descriptor.uri()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn port_count(&self) -> usize {
        self.descriptor.port_count()
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.bindings.is_bound(index)
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.bound_count()
    }

    fn check_bindings(&self, frame_count: usize) -> Result<(), RunError> {
        for port in self.descriptor.ports() {
            if !port.requires_buffer() {
                continue;
            }
            let index = port.index();
            match self.bindings.get(index) {
                None => return Err(RunError::UnboundPort { index }),
                Some(PortBuffer::Audio(cells)) if cells.len() < frame_count => {
                    return Err(RunError::BufferTooSmall {
                        index,
                        len: cells.len(),
                        frames: frame_count,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn deactivate_processor(&mut self) {
        if self.active {
            if let Some(processor) = self.processor.as_mut() {
                processor.deactivate();
            }
            self.active = false;
        }
    }

    fn transition(&mut self, to: InstanceState) {
        tracing::debug!("{}: {} -> {}", self.descriptor.uri(), self.state, to);
        self.state = to;
    }
}

impl Drop for PluginInstance<'_> {
    fn drop(&mut self) {
        self.free();
    }
}

impl fmt::Debug for PluginInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("uri", &self.descriptor.uri())
            .field("sample_rate", &self.sample_rate)
            .field("state", &self.state)
            .field("bound", &self.bindings.bound_count())
            .finish()
    }
}

fn check_buffer(port: &PortDescriptor, buffer: &PortBuffer<'_>) -> Result<(), ConnectError> {
    let index = port.index();
    if port.is_audio() {
        match buffer {
            PortBuffer::Audio(cells) if !cells.is_empty() => Ok(()),
            _ => Err(ConnectError::TypeMismatch {
                index,
                expected: "non-empty audio buffer",
            }),
        }
    } else if port.is_control() {
        match buffer {
            PortBuffer::Control(_) => Ok(()),
            _ => Err(ConnectError::TypeMismatch {
                index,
                expected: "control cell",
            }),
        }
    } else {
        // Untyped ports take whatever the caller offers.
        Ok(())
    }
}
