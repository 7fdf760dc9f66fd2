//! Translation of a [`Configuration`] into compiler command-line arguments.
//!
//! The compiler resolves conflicting flags by keeping the last occurrence,
//! so the group order below is part of the contract: custom flags come last
//! and can override anything configured before them.

use std::path::Path;

use crate::config::Configuration;

/// Program name the compiler expects as `argv[0]`.
pub const PROGRAM_NAME: &str = "pawncc";

const DEBUG_PREFIX: &str = "-d";
const SEMICOLONS_FLAG: &str = "-;+";
const PARENTHESES_FLAG: &str = "-(+";
const SAMP_COMPAT_FLAG: &str = "-Z+";
const INCLUDE_PREFIX: &str = "-i";
const WORKING_DIR_PREFIX: &str = "-D";

/// Build the option list for `config`, without program name or source file.
///
/// Order: debug level, semicolons, parentheses, compatibility, include
/// paths (in list order), custom flags (in string order).
pub fn build_options(config: &Configuration) -> Vec<String> {
    let debug_args = vec![format!("{DEBUG_PREFIX}{}", config.debug_level.value())];

    let style_args = [
        (config.mandatory_semicolons, SEMICOLONS_FLAG),
        (config.mandatory_parentheses, PARENTHESES_FLAG),
    ]
    .into_iter()
    .filter_map(|(enabled, flag)| enabled.then(|| flag.to_string()))
    .collect::<Vec<String>>();

    let compat_args = match config.samp_compatibility {
        true => vec![SAMP_COMPAT_FLAG.to_string()],
        false => vec![],
    };

    // paths are passed verbatim, no escaping
    let include_args = config
        .include_paths
        .iter()
        .filter(|path| !path.trim().is_empty())
        .map(|path| format!("{INCLUDE_PREFIX}{path}"))
        .collect::<Vec<String>>();

    let custom_args = custom_flag_tokens(&config.custom_flags);

    [debug_args, style_args, compat_args, include_args, custom_args].concat()
}

/// Split a free-text flag string on runs of whitespace.
pub fn custom_flag_tokens(flags: &str) -> Vec<String> {
    flags.split_whitespace().map(str::to_string).collect()
}

/// The full argument vector handed to the compiler: program name, the
/// source file's directory as working directory, options, then the source
/// file.
///
/// The compiler resolves relative includes and writes its output relative
/// to the `-D` directory. A `-D` among the custom flags comes later and wins.
pub fn argument_list(config: &Configuration, source_file: &Path) -> Vec<String> {
    [
        vec![PROGRAM_NAME.to_string(), working_dir_arg(source_file)],
        build_options(config),
        vec![source_file.to_string_lossy().to_string()],
    ]
    .concat()
}

fn working_dir_arg(source_file: &Path) -> String {
    let dir = match source_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    format!("{WORKING_DIR_PREFIX}{}", dir.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompilerVersion, DebugLevel};
    use proptest::prelude::*;

    #[test]
    fn default_config_emits_debug_and_style_flags() {
        let options = build_options(&Configuration::default());
        assert_eq!(options, vec!["-d3", "-;+", "-(+"]);
    }

    #[test]
    fn all_groups_in_fixed_order() {
        let config = Configuration::builder()
            .debug_level(DebugLevel::D1)
            .samp_compatibility(true)
            .include_path("/pawn/include")
            .include_path("/pawn/extra")
            .custom_flags("-O2 -w234")
            .build();

        assert_eq!(
            build_options(&config),
            vec!["-d1", "-;+", "-(+", "-Z+", "-i/pawn/include", "-i/pawn/extra", "-O2", "-w234"]
        );
    }

    #[test]
    fn blank_include_paths_are_skipped() {
        let config = Configuration::builder()
            .mandatory_semicolons(false)
            .mandatory_parentheses(false)
            .include_paths(vec!["".into(), "   ".into(), "\t".into(), "inc".into()])
            .build();

        assert_eq!(build_options(&config), vec!["-d3", "-iinc"]);
    }

    #[test]
    fn include_paths_are_not_escaped_or_deduplicated() {
        let config = Configuration::builder()
            .include_path("my includes")
            .include_path("my includes")
            .build();

        let options = build_options(&config);
        assert_eq!(&options[3..], ["-imy includes", "-imy includes"]);
    }

    #[test]
    fn custom_flags_collapse_whitespace_runs() {
        assert_eq!(custom_flag_tokens("-O2   -w234"), vec!["-O2", "-w234"]);
        assert_eq!(custom_flag_tokens("  \t\n "), Vec::<String>::new());
        assert_eq!(custom_flag_tokens(" -a\t-b\n-c "), vec!["-a", "-b", "-c"]);
    }

    #[test]
    fn argument_list_wraps_options() {
        let config = Configuration::builder()
            .compiler_version(CompilerVersion::V31011)
            .custom_flags("-O1")
            .build();
        let args = argument_list(&config, Path::new("/sdcard/gamemodes/main.pwn"));

        assert_eq!(args.first().map(String::as_str), Some(PROGRAM_NAME));
        assert_eq!(args.last().map(String::as_str), Some("/sdcard/gamemodes/main.pwn"));
        assert_eq!(args[1], "-D/sdcard/gamemodes");
        assert_eq!(args[args.len() - 2], "-O1");
    }

    #[test]
    fn working_dir_defaults_to_current_dir() {
        let args = argument_list(&Configuration::default(), Path::new("main.pwn"));
        assert_eq!(args, vec!["pawncc", "-D.", "-d3", "-;+", "-(+", "main.pwn"]);

        let nested = argument_list(&Configuration::default(), Path::new("gm/main.pwn"));
        assert_eq!(nested[1], "-Dgm");
    }

    fn group_rank(token: &str) -> u8 {
        match token {
            t if t.starts_with(DEBUG_PREFIX) => 0,
            SEMICOLONS_FLAG => 1,
            PARENTHESES_FLAG => 2,
            SAMP_COMPAT_FLAG => 3,
            t if t.starts_with(INCLUDE_PREFIX) => 4,
            _ => 5,
        }
    }

    proptest! {
        #[test]
        fn options_follow_group_order(
            level in 0i64..=3,
            semicolons in any::<bool>(),
            parentheses in any::<bool>(),
            samp in any::<bool>(),
            includes in prop::collection::vec("[ a-z/]{0,8}", 0..5),
            custom in prop::collection::vec("\\+[a-z0-9]{1,6}", 0..5),
        ) {
            let config = Configuration::builder()
                .debug_level(DebugLevel::from_value(level))
                .mandatory_semicolons(semicolons)
                .mandatory_parentheses(parentheses)
                .samp_compatibility(samp)
                .include_paths(includes.clone())
                .custom_flags(custom.join("  "))
                .build();
            let options = build_options(&config);

            let ranks = options.iter().map(|token| group_rank(token)).collect::<Vec<u8>>();
            prop_assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
            prop_assert_eq!(&options[0], &format!("-d{level}"));

            let expected_includes = includes
                .iter()
                .filter(|path| !path.trim().is_empty())
                .map(|path| format!("-i{path}"))
                .collect::<Vec<String>>();
            let actual_includes = options
                .iter()
                .filter(|token| group_rank(token) == 4)
                .cloned()
                .collect::<Vec<String>>();
            prop_assert_eq!(actual_includes, expected_includes);

            let actual_custom = options
                .iter()
                .filter(|token| group_rank(token) == 5)
                .cloned()
                .collect::<Vec<String>>();
            prop_assert_eq!(actual_custom, custom);
        }
    }
}
