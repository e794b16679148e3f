//! Dynamic library loader
//!
//! Plugin libraries export one symbol, `tutti_plugin_entry`, returning the
//! entry at a given index or null past the end. Each entry is a table of C
//! function pointers shaped like an LV2 descriptor.

use crate::buffer::PortData;
use crate::error::ProcessError;
use crate::processor::{Processor, ProcessorFactory};
use std::ffi::{c_char, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use std::sync::Arc;
use tutti_descriptor::{FeatureSet, PluginDescriptor};

pub const ENTRY_SYMBOL: &[u8] = b"tutti_plugin_entry\0";

/// Upper bound on entries scanned in one library.
const MAX_ENTRIES: u32 = 1024;

pub type EntryFn = unsafe extern "C" fn(index: u32) -> *const TuttiPluginEntry;

/// C ABI plugin entry.
///
/// `features` passed to `instantiate` is a null-terminated array of
/// null-terminated feature identifiers. `run` returns 0 on success.
#[repr(C)]
pub struct TuttiPluginEntry {
    pub uri: *const c_char,
    pub instantiate: Option<
        unsafe extern "C" fn(
            entry: *const TuttiPluginEntry,
            sample_rate: f64,
            features: *const *const c_char,
        ) -> *mut c_void,
    >,
    pub connect_port: Option<unsafe extern "C" fn(handle: *mut c_void, port: u32, data: *mut f32)>,
    pub activate: Option<unsafe extern "C" fn(handle: *mut c_void)>,
    pub run: Option<unsafe extern "C" fn(handle: *mut c_void, frames: u32) -> i32>,
    pub deactivate: Option<unsafe extern "C" fn(handle: *mut c_void)>,
    pub cleanup: Option<unsafe extern "C" fn(handle: *mut c_void)>,
}

/// An opened plugin library. Kept alive by every processor created from it.
pub struct DylibBinary {
    path: PathBuf,
    entry_fn: EntryFn,
    // Must drop after every handle; processors hold an Arc to the binary.
    // None when the entry table is linked into the host itself.
    _library: Option<libloading::Library>,
}

impl DylibBinary {
    pub fn open(path: &Path) -> Result<Self, ProcessError> {
        let library = unsafe {
            libloading::Library::new(path).map_err(|e| ProcessError::Library {
                path: path.to_path_buf(),
                reason: format!("Failed to load library: {}", e),
            })?
        };

        let entry_fn: EntryFn = unsafe {
            *library
                .get::<EntryFn>(ENTRY_SYMBOL)
                .map_err(|e| ProcessError::Library {
                    path: path.to_path_buf(),
                    reason: format!("No tutti_plugin_entry symbol: {}", e),
                })?
        };

        tracing::debug!("Opened plugin library {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entry_fn,
            _library: Some(library),
        })
    }

    /// Wrap an entry function linked into the host process. `label` stands in
    /// for the library path in errors and logs.
    pub fn linked(label: impl Into<PathBuf>, entry_fn: EntryFn) -> Self {
        Self {
            path: label.into(),
            entry_fn,
            _library: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// URIs of every entry the library exports.
    pub fn uris(&self) -> Vec<String> {
        self.entries()
            .filter_map(|entry| unsafe { entry_uri(entry) })
            .collect()
    }

    fn entries(&self) -> impl Iterator<Item = &TuttiPluginEntry> + '_ {
        (0..MAX_ENTRIES)
            .map(move |i| unsafe { (self.entry_fn)(i) })
            .take_while(|p| !p.is_null())
            // Entries are static data inside the library, which outlives `self`.
            .map(|p| unsafe { &*p })
    }

    fn find(&self, uri: &str) -> Result<&TuttiPluginEntry, ProcessError> {
        self.entries()
            .find(|entry| unsafe { entry_uri(entry) }.as_deref() == Some(uri))
            .ok_or_else(|| ProcessError::EntryNotFound {
                path: self.path.clone(),
                uri: uri.to_string(),
            })
    }
}

fn abi_port_count(uri: &str, count: usize) -> Result<u32, ProcessError> {
    u32::try_from(count).map_err(|_| {
        ProcessError::InstantiationFailed(format!(
            "{} declares {} ports, more than the C ABI can address",
            uri, count
        ))
    })
}

unsafe fn entry_uri(entry: &TuttiPluginEntry) -> Option<String> {
    if entry.uri.is_null() {
        return None;
    }
    Some(CStr::from_ptr(entry.uri).to_string_lossy().into_owned())
}

/// Creates processors from one entry of a [`DylibBinary`], matched by URI.
#[derive(Clone)]
pub struct DylibFactory {
    binary: Arc<DylibBinary>,
}

impl DylibFactory {
    pub fn new(binary: Arc<DylibBinary>) -> Self {
        Self { binary }
    }
}

impl ProcessorFactory for DylibFactory {
    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        sample_rate: f64,
        features: &FeatureSet,
    ) -> Result<Box<dyn Processor>, ProcessError> {
        let entry = self.binary.find(descriptor.uri())?;
        let port_count = abi_port_count(descriptor.uri(), descriptor.port_count())?;

        let instantiate_fn = entry.instantiate.ok_or_else(|| {
            ProcessError::InstantiationFailed("No instantiate function".to_string())
        })?;
        let run_fn = entry
            .run
            .ok_or_else(|| ProcessError::InstantiationFailed("No run function".to_string()))?;
        let connect_fn = entry.connect_port.ok_or_else(|| {
            ProcessError::InstantiationFailed("No connect_port function".to_string())
        })?;

        let feature_names = features
            .iter()
            .map(|f| CString::new(f.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                ProcessError::InstantiationFailed(format!("Invalid feature identifier: {}", e))
            })?;
        let mut feature_ptrs: Vec<*const c_char> =
            feature_names.iter().map(|f| f.as_ptr()).collect();
        feature_ptrs.push(ptr::null());

        let handle = unsafe { instantiate_fn(entry, sample_rate, feature_ptrs.as_ptr()) };
        let handle = NonNull::new(handle).ok_or_else(|| {
            ProcessError::InstantiationFailed(format!(
                "{} returned a null handle",
                descriptor.uri()
            ))
        })?;

        Ok(Box::new(DylibProcessor {
            handle,
            connect_fn,
            run_fn,
            activate_fn: entry.activate,
            deactivate_fn: entry.deactivate,
            cleanup_fn: entry.cleanup,
            port_count,
            _binary: Arc::clone(&self.binary),
        }))
    }
}

struct DylibProcessor {
    handle: NonNull<c_void>,
    connect_fn: unsafe extern "C" fn(*mut c_void, u32, *mut f32),
    run_fn: unsafe extern "C" fn(*mut c_void, u32) -> i32,
    activate_fn: Option<unsafe extern "C" fn(*mut c_void)>,
    deactivate_fn: Option<unsafe extern "C" fn(*mut c_void)>,
    cleanup_fn: Option<unsafe extern "C" fn(*mut c_void)>,
    port_count: u32,
    _binary: Arc<DylibBinary>,
}

// Safety: the handle is only touched through &mut self, one thread at a time.
unsafe impl Send for DylibProcessor {}

impl Processor for DylibProcessor {
    fn activate(&mut self) {
        if let Some(activate) = self.activate_fn {
            unsafe { activate(self.handle.as_ptr()) };
        }
    }

    fn run(&mut self, ports: &PortData<'_>, frames: usize) -> Result<(), ProcessError> {
        let frames = u32::try_from(frames)
            .map_err(|_| ProcessError::Other(format!("Block of {} frames is too large", frames)))?;

        // Bindings may change between runs, so reconnect every port each cycle.
        for index in 0..self.port_count {
            let data = ports
                .get(index as usize)
                .map_or(ptr::null_mut(), |buffer| buffer.as_mut_ptr());
            unsafe { (self.connect_fn)(self.handle.as_ptr(), index, data) };
        }

        match unsafe { (self.run_fn)(self.handle.as_ptr(), frames) } {
            0 => Ok(()),
            status => Err(ProcessError::Status(status)),
        }
    }

    fn deactivate(&mut self) {
        if let Some(deactivate) = self.deactivate_fn {
            unsafe { deactivate(self.handle.as_ptr()) };
        }
    }
}

impl Drop for DylibProcessor {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup_fn {
            unsafe { cleanup(self.handle.as_ptr()) };
        }
    }
}
