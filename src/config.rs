//! Compiler configuration types.
//!
//! A [`Configuration`] is an immutable snapshot of the options a single
//! compile runs with. It is produced by whatever settings source the host
//! uses (see [`crate::settings`]) and is read-only to the rest of the crate.
//!
//! # Example
//!
//! ```rust
//! use pawnmc::config::{CompilerVersion, Configuration, DebugLevel};
//!
//! let config = Configuration::builder()
//!     .debug_level(DebugLevel::D2)
//!     .samp_compatibility(true)
//!     .include_path("/sdcard/pawno/include")
//!     .compiler_version(CompilerVersion::V31011)
//!     .build();
//!
//! assert_eq!(config.debug_level.value(), 2);
//! assert_eq!(config.include_paths.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Debug level passed to the compiler as `-d<N>`.
///
/// Higher levels keep more debug information and runtime checks, lower
/// levels produce more optimized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum DebugLevel {
    D0,
    D1,
    D2,
    #[default]
    D3,
}

impl DebugLevel {
    pub const ALL: [DebugLevel; 4] = [DebugLevel::D0, DebugLevel::D1, DebugLevel::D2, DebugLevel::D3];

    pub fn value(self) -> u8 {
        match self {
            DebugLevel::D0 => 0,
            DebugLevel::D1 => 1,
            DebugLevel::D2 => 2,
            DebugLevel::D3 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DebugLevel::D0 => "Disabled (-d0)",
            DebugLevel::D1 => "Runtime Validation (-d1)",
            DebugLevel::D2 => "Full Debugging (-d2)",
            DebugLevel::D3 => "Maximum Debug (-d3)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DebugLevel::D0 => "No debug symbols and no runtime validation.",
            DebugLevel::D1 => "Enables array bounds checking without debug symbols.",
            DebugLevel::D2 => "Complete debug information and runtime checks.",
            DebugLevel::D3 => "Most detailed debug data, disables optimization.",
        }
    }

    /// Strict lookup by numeric level.
    pub fn from_int(n: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|level| i64::from(level.value()) == n)
    }

    /// Lenient lookup used for stored settings: unknown levels become `D1`.
    pub fn from_value(n: i64) -> Self {
        Self::from_int(n).unwrap_or(DebugLevel::D1)
    }
}

/// A compiler runtime the host knows how to load.
///
/// Each variant maps to one native library. Adding a runtime is a code
/// change; the set is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompilerVersion {
    #[default]
    V3107,
    V31011,
}

impl CompilerVersion {
    pub const ALL: [CompilerVersion; 2] = [CompilerVersion::V3107, CompilerVersion::V31011];

    /// Version string identifier, as stored in settings.
    pub fn value(self) -> &'static str {
        match self {
            CompilerVersion::V3107 => "3.10.7",
            CompilerVersion::V31011 => "3.10.11",
        }
    }

    /// Name of the native library that provides this runtime.
    pub fn library_name(self) -> &'static str {
        match self {
            CompilerVersion::V3107 => "pawnc3107",
            CompilerVersion::V31011 => "pawnc31011",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompilerVersion::V3107 => "Pawn 3.10.7-pawnmc.2",
            CompilerVersion::V31011 => "Pawn 3.10.11-pawnmc.1",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CompilerVersion::V3107 => "Recommended for most SA-MP gamemodes",
            CompilerVersion::V31011 => "Recommended for open.mp gamemodes",
        }
    }

    /// Lenient lookup used for stored settings: unknown strings become the default.
    pub fn from_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CompilerVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|version| version.value() == s)
            .ok_or_else(|| {
                let known = Self::ALL.map(|version| version.value()).join(", ");
                format!("unknown compiler version '{s}' (expected one of: {known})")
            })
    }
}

/// Immutable compiler options for one compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub debug_level: DebugLevel,
    /// Require `;` at the end of statements (`-;+`).
    pub mandatory_semicolons: bool,
    /// Require parentheses around function call arguments (`-(+`).
    pub mandatory_parentheses: bool,
    /// SA-MP compatibility mode (`-Z+`).
    pub samp_compatibility: bool,
    /// Include directories, in the order they are searched. Not deduplicated.
    pub include_paths: Vec<String>,
    /// Whitespace-separated flags appended after everything else.
    pub custom_flags: String,
    pub compiler_version: CompilerVersion,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::default(),
            mandatory_semicolons: true,
            mandatory_parentheses: true,
            samp_compatibility: false,
            include_paths: Vec::new(),
            custom_flags: String::new(),
            compiler_version: CompilerVersion::default(),
        }
    }
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Start a builder from an existing snapshot, e.g. to apply overrides.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder { config: self.clone() }
    }
}

/// Builder for [`Configuration`].
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn debug_level(mut self, value: DebugLevel) -> Self {
        self.config.debug_level = value;
        self
    }

    pub fn mandatory_semicolons(mut self, value: bool) -> Self {
        self.config.mandatory_semicolons = value;
        self
    }

    pub fn mandatory_parentheses(mut self, value: bool) -> Self {
        self.config.mandatory_parentheses = value;
        self
    }

    pub fn samp_compatibility(mut self, value: bool) -> Self {
        self.config.samp_compatibility = value;
        self
    }

    /// Append one include path.
    pub fn include_path(mut self, value: impl Into<String>) -> Self {
        self.config.include_paths.push(value.into());
        self
    }

    /// Replace the include path list.
    pub fn include_paths(mut self, value: Vec<String>) -> Self {
        self.config.include_paths = value;
        self
    }

    pub fn custom_flags(mut self, value: impl Into<String>) -> Self {
        self.config.custom_flags = value.into();
        self
    }

    pub fn compiler_version(mut self, value: CompilerVersion) -> Self {
        self.config.compiler_version = value;
        self
    }

    pub fn build(self) -> Configuration {
        self.config
    }
}
