//! Dynamic-library backed compiler runtimes.
//!
//! Each [`CompilerVersion`] ships as a shared library named after
//! [`CompilerVersion::library_name`] (`libpawnc3107.so` on Linux). The
//! library exports two C functions:
//!
//! ```c
//! char *pawnmc_compile(int argc, const char *const *argv);
//! void pawnmc_free_output(char *output);
//! ```
//!
//! `pawnmc_compile` runs the compiler and returns its combined output,
//! starting with an `Exit code: <n>` line. The returned buffer is owned by
//! the library and handed back through `pawnmc_free_output`.

use libloading::Library;
use std::ffi::{CStr, CString, c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::binding::{BindError, CompilerLoader, NativeCompiler};
use crate::config::CompilerVersion;

/// Environment variable naming the directory that holds the compiler libraries.
pub const LIBRARY_PATH_ENV: &str = "PAWNMC_LIBRARY_PATH";

const COMPILE_SYMBOL: &str = "pawnmc_compile";
const FREE_OUTPUT_SYMBOL: &str = "pawnmc_free_output";

// The compiler recurses deeply on large includes.
const COMPILE_THREAD_STACK_SIZE: usize = 8 * 1024 * 1024;

type CompileFn = unsafe extern "C" fn(c_int, *const *const c_char) -> *mut c_char;
type FreeOutputFn = unsafe extern "C" fn(*mut c_char);

/// Loads compiler runtimes from shared libraries on disk.
#[derive(Debug, Clone)]
pub struct DynamicLibraryLoader {
    library_dir: Option<PathBuf>,
}

impl DynamicLibraryLoader {
    /// `library_dir` takes precedence over `PAWNMC_LIBRARY_PATH`; with
    /// neither set the platform's library search path is used.
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        let library_dir = library_dir.or_else(|| std::env::var_os(LIBRARY_PATH_ENV).map(PathBuf::from));
        Self { library_dir }
    }

    pub fn library_path(&self, version: CompilerVersion) -> PathBuf {
        let file_name = libloading::library_filename(version.library_name());
        match &self.library_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

impl CompilerLoader for DynamicLibraryLoader {
    fn load(&self, version: CompilerVersion) -> Result<Arc<dyn NativeCompiler>, BindError> {
        let path = self.library_path(version);
        log::debug!("Opening compiler library {}", path.display());
        let library = NativeLibrary::open(&path, version.library_name())?;
        Ok(Arc::new(library))
    }
}

/// An opened compiler library. Never unloaded once opened.
pub struct NativeLibrary {
    name: String,
    compile_fn: CompileFn,
    free_output_fn: FreeOutputFn,
    // keeps the function pointers above valid
    _library: Library,
}

impl NativeLibrary {
    pub fn open(path: &Path, name: &str) -> Result<Self, BindError> {
        // SAFETY: the compiler libraries run no initialisation code with
        // preconditions beyond being loaded once.
        let library = unsafe { Library::new(path) }.map_err(|e| BindError::LoadFailed {
            library: name.to_string(),
            reason: e.to_string(),
        })?;

        let missing = |symbol: &str| BindError::MissingSymbol {
            library: name.to_string(),
            symbol: symbol.to_string(),
        };

        // SAFETY: the signatures match the exported C functions documented above.
        let compile_fn = unsafe { library.get::<CompileFn>(COMPILE_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|_| missing(COMPILE_SYMBOL))?;
        let free_output_fn = unsafe { library.get::<FreeOutputFn>(FREE_OUTPUT_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|_| missing(FREE_OUTPUT_SYMBOL))?;

        Ok(Self {
            name: name.to_string(),
            compile_fn,
            free_output_fn,
            _library: library,
        })
    }

    fn call(&self, args: &[String]) -> String {
        let c_args = match args
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<CString>, _>>()
        {
            Ok(c_args) => c_args,
            Err(e) => return format!("Exit code: -1\nInvalid argument: {e}"),
        };
        let argv = c_args.iter().map(|arg| arg.as_ptr()).collect::<Vec<*const c_char>>();

        log::debug!("Calling {COMPILE_SYMBOL} in {} with {} arguments", self.name, argv.len());
        // SAFETY: argv holds argc valid NUL-terminated strings that outlive the call.
        let raw = unsafe { (self.compile_fn)(argv.len() as c_int, argv.as_ptr()) };
        if raw.is_null() {
            log::error!("{COMPILE_SYMBOL} in {} returned no output", self.name);
            return "Exit code: -1\n".to_string();
        }

        // SAFETY: raw is a NUL-terminated buffer owned by the library until freed.
        let output = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        unsafe { (self.free_output_fn)(raw) };
        output
    }
}

impl NativeCompiler for NativeLibrary {
    fn compile(&self, args: &[String]) -> String {
        if args.is_empty() {
            return "Exit code: -1\nNo arguments provided".to_string();
        }
        run_with_large_stack(|| self.call(args))
    }
}

/// Run `f` on a dedicated thread with a compiler-sized stack and wait for it.
/// A thread that cannot be spawned or that panics yields an `Exit code: -1` blob.
pub(crate) fn run_with_large_stack<F>(f: F) -> String
where
    F: FnOnce() -> String + Send,
{
    std::thread::scope(|scope| {
        let spawned = std::thread::Builder::new()
            .name("pawncc".to_string())
            .stack_size(COMPILE_THREAD_STACK_SIZE)
            .spawn_scoped(scope, f);

        match spawned {
            Ok(handle) => handle.join().unwrap_or_else(|_| {
                log::error!("Compiler thread panicked");
                "Exit code: -1\nCompiler thread panicked".to_string()
            }),
            Err(e) => {
                log::error!("Failed to create compile thread: {e}");
                String::from("Exit code: -1\nFailed to create compile thread")
            }
        }
    })
}
