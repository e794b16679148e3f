//! Port descriptors and the closed capability vocabulary.
//!
//! A port carries a *set* of capability tags rather than a single kind, so a
//! control-rate input is `input|control` and callers can test each tag on its
//! own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// One tag from the fixed vocabulary `{input, output, audio, control}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Input,
    Output,
    Audio,
    Control,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Input,
        Capability::Output,
        Capability::Audio,
        Capability::Control,
    ];

    const fn bit(self) -> u8 {
        match self {
            Capability::Input => 1 << 0,
            Capability::Output => 1 << 1,
            Capability::Audio => 1 << 2,
            Capability::Control => 1 << 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Input => "input",
            Capability::Output => "output",
            Capability::Audio => "audio",
            Capability::Control => "control",
        }
    }

    /// Map a manifest port type onto the closed vocabulary.
    ///
    /// `cv` ports carry audio-rate sample buffers and are hosted as audio.
    /// Anything else is unsupported and returns `None`.
    pub fn from_manifest(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "input" => Some(Capability::Input),
            "output" => Some(Capability::Output),
            "audio" | "cv" => Some(Capability::Audio),
            "control" => Some(Capability::Control),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small bit-set of [`Capability`] tags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Capability>", from = "Vec<Capability>")]
pub struct PortCaps(u8);

impl PortCaps {
    pub const EMPTY: PortCaps = PortCaps(0);
    pub const INPUT: PortCaps = PortCaps(Capability::Input.bit());
    pub const OUTPUT: PortCaps = PortCaps(Capability::Output.bit());
    pub const AUDIO: PortCaps = PortCaps(Capability::Audio.bit());
    pub const CONTROL: PortCaps = PortCaps(Capability::Control.bit());

    pub const fn with(self, cap: Capability) -> Self {
        PortCaps(self.0 | cap.bit())
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// True when every tag in `other` is also in `self`.
    pub const fn contains_all(self, other: PortCaps) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: PortCaps) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: PortCaps) -> Self {
        PortCaps(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> + Clone {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Capability> for PortCaps {
    fn from(cap: Capability) -> Self {
        PortCaps(cap.bit())
    }
}

impl From<Vec<Capability>> for PortCaps {
    fn from(caps: Vec<Capability>) -> Self {
        caps.into_iter().collect()
    }
}

impl From<PortCaps> for Vec<Capability> {
    fn from(caps: PortCaps) -> Self {
        caps.iter().collect()
    }
}

impl FromIterator<Capability> for PortCaps {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(PortCaps::EMPTY, PortCaps::with)
    }
}

impl BitOr for PortCaps {
    type Output = PortCaps;

    fn bitor(self, rhs: PortCaps) -> PortCaps {
        self.union(rhs)
    }
}

impl BitOr<Capability> for PortCaps {
    type Output = PortCaps;

    fn bitor(self, rhs: Capability) -> PortCaps {
        self.with(rhs)
    }
}

impl fmt::Display for PortCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, cap) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(cap.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for PortCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortCaps({})", self)
    }
}

/// Value range of a control port.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub default: f32,
    pub minimum: f32,
    pub maximum: f32,
}

impl ControlRange {
    pub fn new(default: f32, minimum: f32, maximum: f32) -> Self {
        Self {
            default,
            minimum,
            maximum,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.minimum <= self.maximum
            && self.default >= self.minimum
            && self.default <= self.maximum
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.minimum, self.maximum)
    }
}

/// Static description of one port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDescriptor {
    index: usize,
    symbol: String,
    name: String,
    caps: PortCaps,
    range: Option<ControlRange>,
}

impl PortDescriptor {
    /// The display name defaults to the symbol.
    pub fn new(index: usize, symbol: impl Into<String>, caps: impl Into<PortCaps>) -> Self {
        let symbol = symbol.into();
        Self {
            index,
            name: symbol.clone(),
            symbol,
            caps: caps.into(),
            range: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn ranged(mut self, range: ControlRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn caps(&self) -> PortCaps {
        self.caps
    }

    pub fn range(&self) -> Option<&ControlRange> {
        self.range.as_ref()
    }

    pub fn has_capability(&self, cap: Capability) -> bool {
        self.caps.contains(cap)
    }

    pub fn is_audio(&self) -> bool {
        self.caps.contains(Capability::Audio)
    }

    pub fn is_control(&self) -> bool {
        self.caps.contains(Capability::Control)
    }

    pub fn is_input(&self) -> bool {
        self.caps.contains(Capability::Input)
    }

    pub fn is_output(&self) -> bool {
        self.caps.contains(Capability::Output)
    }

    /// Audio and control ports must be bound before the plugin can run.
    pub fn requires_buffer(&self) -> bool {
        self.caps.intersects(PortCaps::AUDIO | PortCaps::CONTROL)
    }
}
