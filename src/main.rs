use anyhow::{Result, anyhow};
use clap::Parser;
use console::{Term, style};
use std::io::Write;
use std::path::{Path, PathBuf};

use pawnmc::binding::RuntimeBinding;
use pawnmc::cli::{self, OptionArgs};
use pawnmc::config::{CompilerVersion, DebugLevel};
use pawnmc::output::CompileResult;
use pawnmc::session::CompilerSession;
use pawnmc::{args, settings::Settings};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let log_level_filter = cli.verbose.log_level_filter();

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}:\n{}", record.level(), record.args()))
        .filter_level(log_level_filter)
        .target(env_logger::fmt::Target::Stderr)
        .init();

    match cli.command {
        cli::Command::Compile {
            file,
            options,
            save,
            json,
        } => {
            let binding = RuntimeBinding::global(cli.library_dir);
            let code = compile(&cli.settings, file, &options, save, json, CompilerSession::new(binding))?;
            std::process::exit(code);
        }
        cli::Command::Args { file, options } => {
            let settings = Settings::load(&cli.settings)?;
            let config = options.apply(&settings.configuration());
            let args = args::argument_list(&config, &file);
            println!("{}", serde_json::to_string_pretty(&args)?);
            Ok(())
        }
        cli::Command::Versions => {
            for version in CompilerVersion::ALL {
                println!(
                    "{}  {}  ({})",
                    version.value(),
                    version.label(),
                    version.description()
                );
            }
            Ok(())
        }
        cli::Command::Levels => {
            for level in DebugLevel::ALL {
                println!("{}  {}  ({})", level.value(), level.label(), level.description());
            }
            Ok(())
        }
    }
}

fn compile(
    settings_path: &Path,
    file: Option<PathBuf>,
    options: &OptionArgs,
    save: bool,
    json: bool,
    session: CompilerSession,
) -> Result<i32> {
    let mut settings = Settings::load(settings_path)?;
    let file = file
        .or_else(|| settings.auto_load_file())
        .ok_or_else(|| anyhow!("No source file given and no previously compiled file to load"))?;
    if !file.is_file() {
        return Err(anyhow!("Source file not found: {}", file.display()));
    }

    let config = options.apply(&settings.configuration());
    log::info!("Using {}", config.compiler_version.label());

    let result = session
        .spawn_compile(file.clone(), config.clone())
        .join()
        .map_err(|_| anyhow!("Compilation thread panicked"))?;

    if session.is_restart_required(config.compiler_version) {
        if let Some(loaded) = session.loaded_version() {
            log::warn!(
                "{} is still loaded. Restart pawnmc to switch to {}.",
                loaded.label(),
                config.compiler_version.label()
            );
        }
    }

    settings.last_selected_file = Some(file.to_string_lossy().to_string());
    if save {
        settings.set_configuration(&config);
    }
    settings.save(settings_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&result);
    }

    Ok(exit_status(result.status_code))
}

/// Map a compiler status onto a process exit status. Only the low byte
/// survives on Unix, so anything non-zero is kept within 1..=255.
fn exit_status(status_code: i32) -> i32 {
    match status_code {
        0 => 0,
        code if code < 0 => 1,
        code => code.min(255),
    }
}

fn render_result(result: &CompileResult) {
    let plain_output = !Term::stdout().is_term();

    if result.is_load_failure() {
        if plain_output {
            eprintln!("{}", result.message);
        } else {
            eprintln!("{}", style(&result.message).red());
        }
        return;
    }

    if !result.message.is_empty() {
        print!("{}", result.message);
        if !result.message.ends_with('\n') {
            println!();
        }
    }

    let summary = match result.status_code {
        0 => String::from("Compilation successful"),
        code => format!("Compilation failed (exit code {code})"),
    };

    if plain_output {
        println!("{summary}");
    } else if result.is_success() {
        println!("{}", style(&summary).green().bold());
    } else {
        println!("{}", style(&summary).red().bold());
    }
}
