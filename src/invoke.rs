use std::path::Path;
use std::sync::Arc;

use crate::args;
use crate::binding::RuntimeBinding;
use crate::config::Configuration;
use crate::output::{self, CompileResult};

/// Runs one compile: load the runtime, build arguments, call the entry
/// point and parse what it returns.
///
/// Blocks for as long as the compiler runs; there is no timeout.
pub struct Invoker {
    binding: Arc<RuntimeBinding>,
}

impl Invoker {
    pub fn new(binding: Arc<RuntimeBinding>) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &Arc<RuntimeBinding> {
        &self.binding
    }

    pub fn invoke(&self, source_file: &Path, config: &Configuration) -> CompileResult {
        let active = match self.binding.acquire(config.compiler_version) {
            Ok(active) => active,
            Err(_) => return CompileResult::load_failed(),
        };

        log::debug!("Compiling with: {}", active.version.label());

        let args = args::argument_list(config, source_file);
        log::debug!("Compiler arguments: {}", args.join(" "));

        let raw = active.compiler.compile(&args);
        output::parse(&raw)
    }
}
