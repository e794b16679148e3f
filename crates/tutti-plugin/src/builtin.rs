//! Built-in processors, addressed from manifests as `builtin:<name>`.
//!
//! Each processor finds its ports by capability rather than by fixed index, so
//! a manifest may order ports however it likes.

use crate::buffer::PortData;
use crate::error::ProcessError;
use crate::processor::{Processor, ProcessorFactory};
use std::sync::Arc;
use tutti_descriptor::{FeatureSet, PluginDescriptor};

pub const BUILTIN_PREFIX: &str = "builtin:";

/// Every built-in factory under its manifest name.
pub fn builtin_factories() -> Vec<(&'static str, Arc<dyn ProcessorFactory>)> {
    vec![
        ("gain", Arc::new(Builtin::Gain) as Arc<dyn ProcessorFactory>),
        ("passthrough", Arc::new(Builtin::Passthrough)),
        ("mix", Arc::new(Builtin::Mix)),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `out[i] = in[i] * gain` for each audio input/output pair.
    Gain,
    /// Copies each audio input to the matching output.
    Passthrough,
    /// Sums two audio inputs scaled by a level control.
    Mix,
}

impl ProcessorFactory for Builtin {
    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        _sample_rate: f64,
        _features: &FeatureSet,
    ) -> Result<Box<dyn Processor>, ProcessError> {
        let inputs: Vec<usize> = descriptor.audio_inputs().map(|p| p.index()).collect();
        let outputs: Vec<usize> = descriptor.audio_outputs().map(|p| p.index()).collect();
        let control = descriptor.control_inputs().next().map(|p| p.index());

        if outputs.is_empty() {
            return Err(ProcessError::MissingPort("audio output"));
        }

        match self {
            Builtin::Gain => Ok(Box::new(Gain {
                gain: control.ok_or(ProcessError::MissingPort("gain control"))?,
                pairs: pair(&inputs, &outputs)?,
            })),
            Builtin::Passthrough => Ok(Box::new(Passthrough {
                pairs: pair(&inputs, &outputs)?,
            })),
            Builtin::Mix => {
                if inputs.len() < 2 {
                    return Err(ProcessError::MissingPort("second audio input"));
                }
                Ok(Box::new(Mix {
                    level: control.ok_or(ProcessError::MissingPort("level control"))?,
                    a: inputs[0],
                    b: inputs[1],
                    output: outputs[0],
                }))
            }
        }
    }
}

fn pair(inputs: &[usize], outputs: &[usize]) -> Result<Vec<(usize, usize)>, ProcessError> {
    if inputs.len() < outputs.len() {
        return Err(ProcessError::MissingPort("audio input"));
    }
    Ok(inputs.iter().copied().zip(outputs.iter().copied()).collect())
}

fn audio<'a>(ports: &PortData<'a>, index: usize) -> Result<&'a [std::cell::Cell<f32>], ProcessError> {
    ports
        .audio(index)
        .ok_or_else(|| ProcessError::Other(format!("port {} is not an audio buffer", index)))
}

struct Gain {
    gain: usize,
    pairs: Vec<(usize, usize)>,
}

impl Processor for Gain {
    fn run(&mut self, ports: &PortData<'_>, frames: usize) -> Result<(), ProcessError> {
        let gain = ports.control(self.gain).unwrap_or(1.0);
        for &(i, o) in &self.pairs {
            let (input, output) = (audio(ports, i)?, audio(ports, o)?);
            for (x, y) in input[..frames].iter().zip(&output[..frames]) {
                y.set(x.get() * gain);
            }
        }
        Ok(())
    }
}

struct Passthrough {
    pairs: Vec<(usize, usize)>,
}

impl Processor for Passthrough {
    fn run(&mut self, ports: &PortData<'_>, frames: usize) -> Result<(), ProcessError> {
        for &(i, o) in &self.pairs {
            let (input, output) = (audio(ports, i)?, audio(ports, o)?);
            for (x, y) in input[..frames].iter().zip(&output[..frames]) {
                y.set(x.get());
            }
        }
        Ok(())
    }
}

struct Mix {
    level: usize,
    a: usize,
    b: usize,
    output: usize,
}

impl Processor for Mix {
    fn run(&mut self, ports: &PortData<'_>, frames: usize) -> Result<(), ProcessError> {
        let level = ports.control(self.level).unwrap_or(1.0);
        let (a, b, out) = (
            audio(ports, self.a)?,
            audio(ports, self.b)?,
            audio(ports, self.output)?,
        );
        for ((x, y), o) in a[..frames].iter().zip(&b[..frames]).zip(&out[..frames]) {
            o.set((x.get() + y.get()) * level);
        }
        Ok(())
    }
}
