//! The seam between the host and plugin code.
//!
//! The lifecycle layer only sees [`Processor`] trait objects; whether the code
//! behind them is a built-in or a dynamically loaded library is decided by the
//! [`ProcessorFactory`] that created them.

use crate::buffer::PortData;
use crate::error::ProcessError;
use tutti_descriptor::{FeatureSet, PluginDescriptor};

/// A live plugin. Called from one thread at a time.
pub trait Processor: Send {
    fn activate(&mut self) {}

    /// Process `frames` samples. Output buffers are written in place.
    ///
    /// The host has already checked that every audio and control port is bound
    /// and that audio buffers hold at least `frames` samples.
    fn run(&mut self, ports: &PortData<'_>, frames: usize) -> Result<(), ProcessError>;

    fn deactivate(&mut self) {}
}

/// Creates processors for descriptors.
pub trait ProcessorFactory: Send + Sync {
    /// `features` is the host's supported set; the host has already checked it
    /// covers the descriptor's requirements.
    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        sample_rate: f64,
        features: &FeatureSet,
    ) -> Result<Box<dyn Processor>, ProcessError>;
}

impl<F> ProcessorFactory for F
where
    F: Fn(&PluginDescriptor, f64, &FeatureSet) -> Result<Box<dyn Processor>, ProcessError>
        + Send
        + Sync,
{
    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        sample_rate: f64,
        features: &FeatureSet,
    ) -> Result<Box<dyn Processor>, ProcessError> {
        self(descriptor, sample_rate, features)
    }
}
