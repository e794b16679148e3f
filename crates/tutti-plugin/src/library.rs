//! Resolves a descriptor's `binary` to the factory that runs it.

use crate::builtin::{builtin_factories, BUILTIN_PREFIX};
use crate::error::ProcessError;
use crate::processor::{Processor, ProcessorFactory};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tutti_descriptor::{FeatureSet, PluginDescriptor};

#[cfg(feature = "dylib")]
use crate::dylib::{DylibBinary, DylibFactory};
#[cfg(feature = "dylib")]
use parking_lot::Mutex;

/// Built-in and dynamically loaded processor factories.
///
/// Itself a [`ProcessorFactory`] that dispatches on the descriptor's binary:
/// `builtin:<name>` looks up a registered factory, anything else is a library
/// path relative to the bundle. Opened libraries are cached per path.
pub struct ProcessorLibrary {
    builtins: HashMap<String, Arc<dyn ProcessorFactory>>,
    #[cfg(feature = "dylib")]
    libraries: Mutex<HashMap<PathBuf, Arc<DylibBinary>>>,
}

impl Default for ProcessorLibrary {
    fn default() -> Self {
        let mut library = Self::empty();
        for (name, factory) in builtin_factories() {
            library.builtins.insert(name.to_string(), factory);
        }
        library
    }
}

impl ProcessorLibrary {
    /// Library with the standard built-ins registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with no built-ins at all.
    pub fn empty() -> Self {
        Self {
            builtins: HashMap::new(),
            #[cfg(feature = "dylib")]
            libraries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a factory under `builtin:<name>`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn ProcessorFactory>) {
        self.builtins.insert(name.into(), factory);
    }

    pub fn builtin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builtins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn loaded_library_count(&self) -> usize {
        #[cfg(feature = "dylib")]
        {
            self.libraries.lock().len()
        }

        #[cfg(not(feature = "dylib"))]
        {
            0
        }
    }

    /// The factory responsible for `descriptor`.
    pub fn resolve(&self, descriptor: &PluginDescriptor) -> Result<Arc<dyn ProcessorFactory>, ProcessError> {
        let binary = descriptor.binary().ok_or(ProcessError::NoBinary)?;

        if let Some(name) = binary.strip_prefix(BUILTIN_PREFIX) {
            return self
                .builtins
                .get(name)
                .cloned()
                .ok_or_else(|| ProcessError::UnknownBuiltin(name.to_string()));
        }

        let path = descriptor.bundle().join(binary);
        self.open_library(path)
    }

    #[cfg(feature = "dylib")]
    fn open_library(&self, path: PathBuf) -> Result<Arc<dyn ProcessorFactory>, ProcessError> {
        let mut libraries = self.libraries.lock();
        let binary = match libraries.get(&path) {
            Some(binary) => Arc::clone(binary),
            None => {
                let binary = Arc::new(DylibBinary::open(&path)?);
                libraries.insert(path, Arc::clone(&binary));
                binary
            }
        };
        Ok(Arc::new(DylibFactory::new(binary)))
    }

    #[cfg(not(feature = "dylib"))]
    fn open_library(&self, path: PathBuf) -> Result<Arc<dyn ProcessorFactory>, ProcessError> {
        Err(ProcessError::Library {
            path,
            reason: "Dynamic library support not compiled (enable 'dylib' feature)".to_string(),
        })
    }
}

impl ProcessorFactory for ProcessorLibrary {
    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        sample_rate: f64,
        features: &FeatureSet,
    ) -> Result<Box<dyn Processor>, ProcessError> {
        self.resolve(descriptor)?
            .instantiate(descriptor, sample_rate, features)
    }
}

impl std::fmt::Debug for ProcessorLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorLibrary")
            .field("builtins", &self.builtin_names())
            .field("libraries", &self.loaded_library_count())
            .finish()
    }
}
