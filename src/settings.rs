//! JSON settings file, the host's source of [`Configuration`] snapshots.
//!
//! Values are stored in their raw form and interpreted leniently: an unknown
//! debug level reads as `D1`, an unknown compiler version as the default
//! version, and include paths are kept as one `;`-separated string.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CompilerVersion, Configuration, DebugLevel};

pub const DEFAULT_SETTINGS_FILE: &str = "pawnmc.json";

const INCLUDE_PATH_SEPARATOR: &str = ";";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debug: i64,
    pub semicolons: bool,
    pub parentheses: bool,
    pub samp_compat: bool,
    pub custom_flags: String,
    pub include_paths: String,
    pub compiler_version: String,
    pub last_selected_file: Option<String>,
    pub auto_load_last_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let config = Configuration::default();
        Self {
            debug: i64::from(config.debug_level.value()),
            semicolons: config.mandatory_semicolons,
            parentheses: config.mandatory_parentheses,
            samp_compat: config.samp_compatibility,
            custom_flags: config.custom_flags,
            include_paths: String::new(),
            compiler_version: config.compiler_version.value().to_string(),
            last_selected_file: None,
            auto_load_last_file: true,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Could not parse settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn include_path_list(&self) -> Vec<String> {
        if self.include_paths.is_empty() {
            vec![]
        } else {
            self.include_paths
                .split(INCLUDE_PATH_SEPARATOR)
                .map(str::to_string)
                .collect()
        }
    }

    pub fn set_include_paths(&mut self, paths: &[String]) {
        self.include_paths = paths.join(INCLUDE_PATH_SEPARATOR);
    }

    pub fn configuration(&self) -> Configuration {
        Configuration::builder()
            .debug_level(DebugLevel::from_value(self.debug))
            .mandatory_semicolons(self.semicolons)
            .mandatory_parentheses(self.parentheses)
            .samp_compatibility(self.samp_compat)
            .include_paths(self.include_path_list())
            .custom_flags(self.custom_flags.clone())
            .compiler_version(CompilerVersion::from_value(&self.compiler_version))
            .build()
    }

    pub fn set_configuration(&mut self, config: &Configuration) {
        self.debug = i64::from(config.debug_level.value());
        self.semicolons = config.mandatory_semicolons;
        self.parentheses = config.mandatory_parentheses;
        self.samp_compat = config.samp_compatibility;
        self.set_include_paths(&config.include_paths);
        self.custom_flags = config.custom_flags.clone();
        self.compiler_version = config.compiler_version.value().to_string();
    }

    /// The file to compile when none is given, if auto-loading is enabled.
    pub fn auto_load_file(&self) -> Option<PathBuf> {
        match self.auto_load_last_file {
            true => self.last_selected_file.as_ref().map(PathBuf::from),
            false => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("pawnmc.json")).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.configuration(), Configuration::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pawnmc.json");
        fs::write(&path, r#"{ "samp_compat": true, "include_paths": "/a;/b;/a" }"#).unwrap();

        let config = Settings::load(&path).unwrap().configuration();
        assert!(config.samp_compatibility);
        assert!(config.mandatory_semicolons);
        assert_eq!(config.include_paths, vec!["/a", "/b", "/a"]);
    }

    #[test]
    fn unknown_values_fall_back() {
        let settings = Settings {
            debug: 9,
            compiler_version: "9.9.9".to_string(),
            ..Default::default()
        };
        let config = settings.configuration();

        assert_eq!(config.debug_level, DebugLevel::D1);
        assert_eq!(config.compiler_version, CompilerVersion::V3107);
    }

    #[test]
    fn save_then_load_keeps_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pawnmc.json");
        let config = Configuration::builder()
            .debug_level(DebugLevel::D0)
            .mandatory_parentheses(false)
            .include_path("/pawn/include")
            .include_path("/pawn/plugins")
            .custom_flags("-O2 -w234")
            .compiler_version(CompilerVersion::V31011)
            .build();

        let mut settings = Settings::default();
        settings.set_configuration(&config);
        settings.last_selected_file = Some("/sdcard/gm.pwn".to_string());
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.include_paths, "/pawn/include;/pawn/plugins");
        assert_eq!(loaded.configuration(), config);
        assert_eq!(loaded.auto_load_file(), Some(PathBuf::from("/sdcard/gm.pwn")));
    }

    #[test]
    fn auto_load_can_be_disabled() {
        let settings = Settings {
            last_selected_file: Some("gm.pwn".to_string()),
            auto_load_last_file: false,
            ..Default::default()
        };
        assert_eq!(settings.auto_load_file(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pawnmc.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("Could not parse settings file"));
    }
}
