//! Offline rendering
//!
//! Drives one plugin over a sine test tone in blocks of the host block size
//! and collects what comes out of its audio outputs. [`Rendered::write_wav`]
//! stores the result as a 32-bit float WAV file via hound.

use crate::{Error, Host, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::cell::Cell;
use std::f32::consts::TAU;
use std::path::Path;
use tutti_plugin::{audio_cells, read_cells, PortBuffer};

/// What to feed a plugin and for how long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub sample_rate: f64,
    /// Total frames to render. Must be non-zero.
    pub frames: usize,
    /// Sine frequency written to every audio input. 0 gives silence.
    pub tone_hz: f32,
    pub amplitude: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            frames: 48000,
            tone_hz: 440.0,
            amplitude: 0.5,
        }
    }
}

/// Output of [`Host::render`].
#[derive(Debug, Clone)]
pub struct Rendered {
    pub uri: String,
    pub sample_rate: f64,
    pub frames: usize,
    /// One entry per audio output port in index order: symbol and samples.
    pub channels: Vec<(String, Vec<f32>)>,
    /// Control output values after the last block.
    pub controls: Vec<(String, f32)>,
}

impl Rendered {
    /// Absolute peak of each audio output.
    pub fn peaks(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.channels.iter().map(|(symbol, samples)| {
            let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
            (symbol.as_str(), peak)
        })
    }

    /// Write every audio output as one interleaved channel of a float WAV file.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.channels.is_empty() {
            return Err(Error::NoAudioOutput(self.uri.clone()));
        }
        let channels = u16::try_from(self.channels.len()).map_err(|_| {
            Error::InvalidConfig(format!("{} audio outputs do not fit in a WAV file", self.channels.len()))
        })?;

        let spec = WavSpec {
            channels,
            sample_rate: self.sample_rate.round() as u32,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut writer = WavWriter::create(path.as_ref(), spec)?;
        for frame in 0..self.frames {
            for (_, samples) in &self.channels {
                writer.write_sample(samples[frame])?;
            }
        }
        writer.finalize()?;

        tracing::debug!(
            "Wrote {} frames x {} channel(s) to {}",
            self.frames,
            channels,
            path.as_ref().display()
        );
        Ok(())
    }
}

impl Host {
    /// Render `options.frames` frames of the plugin registered under `uri`.
    ///
    /// Audio inputs receive the test tone, control inputs sit at their range
    /// default (0 without a range). Runs in blocks of `config().block_size`.
    pub fn render(&self, uri: &str, options: &RenderOptions) -> Result<Rendered> {
        if options.frames == 0 {
            return Err(Error::InvalidConfig("Render length must be at least one frame".to_string()));
        }
        let descriptor = self
            .find(uri)
            .ok_or_else(|| Error::UnknownPlugin(uri.to_string()))?;
        let block_size = self.config().block_size;

        // Buffers outlive the instance that borrows them.
        let audio: Vec<Vec<Cell<f32>>> = descriptor
            .ports()
            .iter()
            .map(|port| if port.is_audio() { audio_cells(block_size) } else { Vec::new() })
            .collect();
        let controls: Vec<Cell<f32>> = descriptor
            .ports()
            .iter()
            .map(|port| Cell::new(port.range().map_or(0.0, |r| r.default)))
            .collect();

        let mut instance = self.instantiate_descriptor(descriptor, options.sample_rate)?;
        for port in descriptor.ports() {
            let index = port.index();
            if port.is_audio() {
                instance.connect_port(index, PortBuffer::audio_cells(&audio[index]))?;
            } else if port.is_control() {
                instance.connect_port(index, PortBuffer::control_cell(&controls[index]))?;
            }
        }

        let outputs: Vec<_> = descriptor
            .ports()
            .iter()
            .filter(|p| p.is_output() && p.is_audio())
            .collect();
        let mut channels: Vec<(String, Vec<f32>)> = outputs
            .iter()
            .map(|p| (p.symbol().to_string(), Vec::with_capacity(options.frames)))
            .collect();

        instance.activate()?;
        let mut offset = 0;
        while offset < options.frames {
            let frames = block_size.min(options.frames - offset);

            for port in descriptor.audio_inputs() {
                for (i, sample) in audio[port.index()][..frames].iter().enumerate() {
                    let t = (offset + i) as f64 / options.sample_rate;
                    let phase = TAU * options.tone_hz * t as f32;
                    sample.set(options.amplitude * phase.sin());
                }
            }

            instance.run(frames)?;

            for (port, (_, samples)) in outputs.iter().zip(channels.iter_mut()) {
                samples.extend_from_slice(&read_cells(&audio[port.index()][..frames]));
            }
            offset += frames;
        }
        instance.deactivate()?;
        instance.free();

        let controls = descriptor
            .ports()
            .iter()
            .filter(|p| p.is_output() && p.is_control())
            .map(|p| (p.symbol().to_string(), controls[p.index()].get()))
            .collect();

        tracing::debug!("Rendered {} frames of {}", options.frames, uri);
        Ok(Rendered {
            uri: uri.to_string(),
            sample_rate: options.sample_rate,
            frames: options.frames,
            channels,
            controls,
        })
    }
}
