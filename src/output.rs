//! Parsing of the compiler's combined output.
//!
//! The native entry point returns one text blob whose first line is
//! `Exit code: <n>` and whose remaining lines are the compiler's messages.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Status used when the compiler could not be invoked or its output had no
/// readable exit status.
pub const STATUS_NOT_INVOKED: i32 = -1;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load compiler library";

/// Outcome of one compile, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResult {
    pub status_code: i32,
    pub message: String,
}

impl CompileResult {
    pub fn new(status_code: i32, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// The result reported when the compiler library could not be loaded.
    pub fn load_failed() -> Self {
        Self::new(STATUS_NOT_INVOKED, LOAD_FAILED_MESSAGE)
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 0
    }

    /// Distinguishes a binding problem from a genuine compile error.
    pub fn is_load_failure(&self) -> bool {
        self.status_code == STATUS_NOT_INVOKED && self.message == LOAD_FAILED_MESSAGE
    }
}

static EXIT_CODE_LINE: OnceLock<Regex> = OnceLock::new();

fn exit_code_line() -> &'static Regex {
    EXIT_CODE_LINE.get_or_init(|| Regex::new(r"^Exit code: (-?\d+)").expect("valid exit code regex"))
}

/// Parse a raw output blob into a [`CompileResult`].
///
/// The first line is always consumed as the status line, even when it does
/// not carry an exit code; the body is everything after the first newline.
/// Only the leading `-?digits` after the prefix are read, the rest of the
/// status line is ignored.
pub fn parse(raw: &str) -> CompileResult {
    let (status_line, body) = match raw.split_once('\n') {
        Some((status_line, body)) => (status_line, body),
        None => (raw, ""),
    };

    let status_code = match exit_code_line().captures(status_line) {
        Some(captures) => captures[1].parse::<i32>().unwrap_or_else(|_| {
            log::debug!("Unparseable exit code in status line: {status_line:?}");
            STATUS_NOT_INVOKED
        }),
        None => {
            log::debug!("Compiler output has no exit code line: {status_line:?}");
            STATUS_NOT_INVOKED
        }
    };

    CompileResult::new(status_code, body)
}
