use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;

use crate::config::{CompilerVersion, Configuration, DebugLevel};
use crate::settings::DEFAULT_SETTINGS_FILE;

/// Compile Pawn scripts with a bundled compiler runtime.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Verbosity:
    /// -v -> Debug
    /// -vv -> Trace
    /// -q -> Warn
    /// -qq -> Error
    /// -qqq -> Off.
    /// Default (/ no argument given): 'info'
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<InfoLevel>,

    /// Settings file holding the stored compiler options.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Directory containing the compiler libraries. Overrides PAWNMC_LIBRARY_PATH.
    #[arg(long, global = true)]
    pub library_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a source file.
    Compile {
        /// The .pwn file to compile. Defaults to the last compiled file.
        file: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,

        /// Store the effective options in the settings file.
        #[arg(long)]
        save: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the compiler arguments that would be used for a file, as JSON.
    Args {
        file: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },
    /// List the available compiler versions.
    Versions,
    /// List the debug levels accepted by `-d`.
    Levels,
}

/// Per-invocation overrides of the stored options.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// Debug level (0-3).
    #[arg(short = 'd', long, value_parser = parse_debug_level)]
    pub debug_level: Option<DebugLevel>,

    /// Don't require semicolons at the end of statements.
    #[arg(long)]
    pub no_semicolons: bool,

    /// Don't require parentheses around call arguments.
    #[arg(long)]
    pub no_parentheses: bool,

    /// Enable SA-MP compatibility mode.
    #[arg(long)]
    pub samp: bool,

    /// Additional include directory. Can be given multiple times.
    #[arg(short = 'i', long = "include")]
    pub includes: Vec<String>,

    /// Extra compiler flags, appended after all other options.
    #[arg(long, allow_hyphen_values = true)]
    pub flags: Option<String>,

    /// Compiler runtime version, e.g. 3.10.11.
    #[arg(long)]
    pub compiler_version: Option<CompilerVersion>,
}

impl OptionArgs {
    /// Layer these overrides on top of a stored configuration.
    pub fn apply(&self, config: &Configuration) -> Configuration {
        let mut builder = config.to_builder();

        if let Some(level) = self.debug_level {
            builder = builder.debug_level(level);
        }
        if self.no_semicolons {
            builder = builder.mandatory_semicolons(false);
        }
        if self.no_parentheses {
            builder = builder.mandatory_parentheses(false);
        }
        if self.samp {
            builder = builder.samp_compatibility(true);
        }
        for include in &self.includes {
            builder = builder.include_path(include.clone());
        }
        if let Some(flags) = &self.flags {
            builder = builder.custom_flags(flags.clone());
        }
        if let Some(version) = self.compiler_version {
            builder = builder.compiler_version(version);
        }

        builder.build()
    }
}

fn parse_debug_level(value: &str) -> Result<DebugLevel, String> {
    value
        .parse::<i64>()
        .ok()
        .and_then(DebugLevel::from_int)
        .ok_or_else(|| format!("invalid debug level '{value}' (expected 0, 1, 2 or 3)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn compile_with_overrides() {
        let cli = parse(&[
            "pawnmc",
            "compile",
            "gm.pwn",
            "-d",
            "1",
            "--samp",
            "-i",
            "/inc/a",
            "--include",
            "/inc/b",
            "--flags",
            "-O2 -w234",
            "--compiler-version",
            "3.10.11",
        ])
        .expect("expected compile command");

        match cli.command {
            Command::Compile { file, options, .. } => {
                assert_eq!(file, Some(PathBuf::from("gm.pwn")));
                let config = options.apply(&Configuration::default());
                assert_eq!(config.debug_level, DebugLevel::D1);
                assert!(config.samp_compatibility);
                assert_eq!(config.include_paths, vec!["/inc/a", "/inc/b"]);
                assert_eq!(config.custom_flags, "-O2 -w234");
                assert_eq!(config.compiler_version, CompilerVersion::V31011);
            }
            other => panic!("expected compile command, got {other:?}"),
        }
    }

    #[test]
    fn overrides_extend_stored_includes() {
        let stored = Configuration::builder().include_path("/stored").build();
        let options = OptionArgs {
            includes: vec!["/extra".to_string()],
            no_semicolons: true,
            ..Default::default()
        };

        let config = options.apply(&stored);
        assert_eq!(config.include_paths, vec!["/stored", "/extra"]);
        assert!(!config.mandatory_semicolons);
        assert!(config.mandatory_parentheses);
    }

    #[test]
    fn compile_file_is_optional() {
        let cli = parse(&["pawnmc", "compile"]).expect("expected compile command");
        assert!(matches!(cli.command, Command::Compile { file: None, .. }));
        assert_eq!(cli.settings, PathBuf::from(DEFAULT_SETTINGS_FILE));
    }

    #[test]
    fn rejects_unknown_debug_level() {
        let err = parse(&["pawnmc", "args", "gm.pwn", "-d", "5"]).expect_err("expected invalid value");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = parse(&["pawnmc", "args", "gm.pwn", "--compiler-version", "2.0"])
            .expect_err("expected invalid value");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["pawnmc", "versions", "--library-dir", "/opt/pawn"]).expect("expected versions");
        assert!(matches!(cli.command, Command::Versions));
        assert_eq!(cli.library_dir, Some(PathBuf::from("/opt/pawn")));
    }

    #[test]
    fn levels_takes_no_arguments() {
        let cli = parse(&["pawnmc", "levels"]).expect("expected levels");
        assert!(matches!(cli.command, Command::Levels));
        assert!(parse(&["pawnmc", "levels", "3"]).is_err());
    }
}
