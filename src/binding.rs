//! Load-once binding to a native compiler runtime.
//!
//! The native libraries have no unload facility, so once a runtime version
//! has been loaded it stays active until the process exits. Requests for a
//! different version are still serviced, with the already-loaded runtime,
//! and [`RuntimeBinding::is_restart_required`] reports the mismatch.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use crate::config::CompilerVersion;
use crate::native::DynamicLibraryLoader;

/// The compiler's single entry point: an argument vector in, a text blob out.
pub trait NativeCompiler: Send + Sync {
    fn compile(&self, args: &[String]) -> String;
}

/// Makes the entry point of a runtime version callable.
pub trait CompilerLoader: Send + Sync {
    fn load(&self, version: CompilerVersion) -> Result<Arc<dyn NativeCompiler>, BindError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("failed to load compiler library '{library}': {reason}")]
    LoadFailed { library: String, reason: String },
    #[error("compiler library '{library}' does not export '{symbol}'")]
    MissingSymbol { library: String, symbol: String },
}

/// A loaded runtime together with the version it was loaded for.
#[derive(Clone)]
pub struct ActiveCompiler {
    pub version: CompilerVersion,
    pub compiler: Arc<dyn NativeCompiler>,
}

/// Owner of the loaded-runtime state.
pub struct RuntimeBinding {
    loader: Box<dyn CompilerLoader>,
    // None until the first successful load, never reset afterwards.
    state: Mutex<Option<ActiveCompiler>>,
}

static GLOBAL_BINDING: OnceLock<Arc<RuntimeBinding>> = OnceLock::new();

impl RuntimeBinding {
    pub fn new(loader: impl CompilerLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            state: Mutex::new(None),
        }
    }

    /// The process-wide binding backed by the dynamic library loader.
    ///
    /// The first call decides the library directory; later calls return the
    /// same instance and ignore their argument.
    pub fn global(library_dir: Option<PathBuf>) -> Arc<RuntimeBinding> {
        GLOBAL_BINDING
            .get_or_init(|| Arc::new(RuntimeBinding::new(DynamicLibraryLoader::new(library_dir))))
            .clone()
    }

    /// Make sure a runtime is loaded, loading `version` if none is yet.
    pub fn ensure_loaded(&self, version: CompilerVersion) -> Result<(), BindError> {
        self.acquire(version).map(|_| ())
    }

    /// Like [`Self::ensure_loaded`], returning the runtime that will actually
    /// serve the request. This is the loaded one, not necessarily `version`.
    pub fn acquire(&self, version: CompilerVersion) -> Result<ActiveCompiler, BindError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(active) = state.as_ref() {
            if active.version != version {
                log::warn!(
                    "Requested {} but {} is already loaded. Restart required.",
                    version.label(),
                    active.version.label()
                );
            }
            return Ok(active.clone());
        }

        match self.loader.load(version) {
            Ok(compiler) => {
                log::info!("Loaded: {}", version.library_name());
                let active = ActiveCompiler { version, compiler };
                *state = Some(active.clone());
                Ok(active)
            }
            Err(err) => {
                log::error!("Failed to load: {}: {err}", version.library_name());
                Err(err)
            }
        }
    }

    pub fn current_version(&self) -> Option<CompilerVersion> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.as_ref().map(|active| active.version)
    }

    /// True iff a runtime is loaded and it is not `requested`.
    pub fn is_restart_required(&self, requested: CompilerVersion) -> bool {
        self.current_version()
            .is_some_and(|loaded| loaded != requested)
    }
}
