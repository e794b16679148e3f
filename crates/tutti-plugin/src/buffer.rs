//! Port buffers and the binding table.
//!
//! The host never copies or owns sample memory. Buffers are borrowed from the
//! caller as `Cell` slices, so the caller can keep reading outputs and writing
//! inputs between runs while the instance holds the binding. `Cell` is not
//! `Sync`, which keeps a bound instance on one thread.

use std::cell::Cell;

/// Caller-owned memory bound to one port.
#[derive(Debug, Clone, Copy)]
pub enum PortBuffer<'a> {
    /// Sample buffer for an audio port. Must hold at least one run's frames.
    Audio(&'a [Cell<f32>]),
    /// Single scalar cell for a control port.
    Control(&'a Cell<f32>),
}

impl<'a> PortBuffer<'a> {
    /// Borrow a plain sample slice for the lifetime of the binding.
    pub fn audio(samples: &'a mut [f32]) -> Self {
        PortBuffer::Audio(Cell::from_mut(samples).as_slice_of_cells())
    }

    pub fn audio_cells(cells: &'a [Cell<f32>]) -> Self {
        PortBuffer::Audio(cells)
    }

    pub fn control(value: &'a mut f32) -> Self {
        PortBuffer::Control(Cell::from_mut(value))
    }

    pub fn control_cell(cell: &'a Cell<f32>) -> Self {
        PortBuffer::Control(cell)
    }

    /// Number of elements: samples for audio, always 1 for control.
    pub fn len(&self) -> usize {
        match self {
            PortBuffer::Audio(cells) => cells.len(),
            PortBuffer::Control(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PortBuffer::Audio(_) => "audio buffer",
            PortBuffer::Control(_) => "control cell",
        }
    }

    /// Raw pointer for handing the buffer across a C ABI.
    pub(crate) fn as_mut_ptr(&self) -> *mut f32 {
        match self {
            PortBuffer::Audio(cells) => cells.as_ptr() as *mut f32,
            PortBuffer::Control(cell) => cell.as_ptr(),
        }
    }
}

/// Allocate a zeroed sample buffer that can be bound with
/// [`PortBuffer::audio_cells`] and still read by the caller.
pub fn audio_cells(len: usize) -> Vec<Cell<f32>> {
    vec![Cell::new(0.0); len]
}

/// Copy a sample buffer out of its cells.
pub fn read_cells(cells: &[Cell<f32>]) -> Vec<f32> {
    cells.iter().map(Cell::get).collect()
}

/// Maps port index to the caller's buffer for the life of an instance.
#[derive(Debug, Clone, Default)]
pub struct BindingTable<'a> {
    slots: Vec<Option<PortBuffer<'a>>>,
}

impl<'a> BindingTable<'a> {
    pub fn with_ports(port_count: usize) -> Self {
        Self {
            slots: vec![None; port_count],
        }
    }

    /// Bind or rebind. The caller has already checked the index and type.
    pub(crate) fn bind(&mut self, index: usize, buffer: PortBuffer<'a>) {
        self.slots[index] = Some(buffer);
    }

    pub fn get(&self, index: usize) -> Option<&PortBuffer<'a>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn port_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub fn ports(&self) -> PortData<'_> {
        PortData { slots: &self.slots }
    }
}

/// Read/write view of the bound buffers handed to a processor during `run`.
#[derive(Debug, Clone, Copy)]
pub struct PortData<'a> {
    slots: &'a [Option<PortBuffer<'a>>],
}

impl<'a> PortData<'a> {
    pub fn get(&self, index: usize) -> Option<PortBuffer<'a>> {
        self.slots.get(index).copied().flatten()
    }

    pub fn audio(&self, index: usize) -> Option<&'a [Cell<f32>]> {
        match self.get(index) {
            Some(PortBuffer::Audio(cells)) => Some(cells),
            _ => None,
        }
    }

    pub fn control_cell(&self, index: usize) -> Option<&'a Cell<f32>> {
        match self.get(index) {
            Some(PortBuffer::Control(cell)) => Some(cell),
            _ => None,
        }
    }

    pub fn control(&self, index: usize) -> Option<f32> {
        self.control_cell(index).map(Cell::get)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
