//! Entry point for hosts.
//!
//! A [`CompilerSession`] is what a front-end talks to. It adds nothing to
//! the invocation itself; hosts are expected to serialise their own calls
//! (one compile in flight at a time) and to keep compiles off any thread
//! that must stay responsive, e.g. through [`CompilerSession::spawn_compile`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::binding::RuntimeBinding;
use crate::config::{CompilerVersion, Configuration};
use crate::invoke::Invoker;
use crate::output::CompileResult;

#[derive(Clone)]
pub struct CompilerSession {
    invoker: Arc<Invoker>,
}

impl CompilerSession {
    pub fn new(binding: Arc<RuntimeBinding>) -> Self {
        Self {
            invoker: Arc::new(Invoker::new(binding)),
        }
    }

    pub fn compile(&self, source_file: &Path, config: &Configuration) -> CompileResult {
        self.invoker.invoke(source_file, config)
    }

    /// Run [`Self::compile`] on a background thread.
    pub fn spawn_compile(&self, source_file: PathBuf, config: Configuration) -> JoinHandle<CompileResult> {
        let session = self.clone();
        std::thread::spawn(move || session.compile(&source_file, &config))
    }

    pub fn loaded_version(&self) -> Option<CompilerVersion> {
        self.invoker.binding().current_version()
    }

    pub fn is_restart_required(&self, requested: CompilerVersion) -> bool {
        self.invoker.binding().is_restart_required(requested)
    }
}
