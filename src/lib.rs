//! Session manager for a natively loaded Pawn compiler.
//!
//! The crate turns a [`config::Configuration`] into `pawncc` arguments,
//! keeps a load-once binding to the compiler runtime of the selected
//! version, and folds the compiler's raw output into a
//! [`output::CompileResult`]. Hosts talk to [`session::CompilerSession`]:
//!
//! ```rust,ignore
//! use pawnmc::binding::RuntimeBinding;
//! use pawnmc::config::Configuration;
//! use pawnmc::session::CompilerSession;
//!
//! let session = CompilerSession::new(RuntimeBinding::global(None));
//! let result = session.compile(Path::new("gamemodes/main.pwn"), &Configuration::default());
//! println!("{}", result.message);
//! ```

pub mod args;
pub mod binding;
pub mod cli;
pub mod config;
pub mod invoke;
#[allow(unsafe_code)] // dynamic loading requires unsafe
pub mod native;
pub mod output;
pub mod session;
pub mod settings;
