//! Locating the report config and the preference file on disk.
//!
//! Each file is looked up independently. The first existing candidate wins:
//! CLI path, its own environment variable, `RSNAP_CONFIG_DIR`, the XDG config
//! directory, `/etc/report-snapshot`. Nothing found means built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming the report config file.
pub const ENV_REPORT_PATH: &str = "RSNAP_CONFIG";
/// Environment variable naming the preference file.
pub const ENV_PREFS_PATH: &str = "RSNAP_PREFS";
/// Environment variable naming a directory holding both files.
pub const ENV_CONFIG_DIR: &str = "RSNAP_CONFIG_DIR";

pub const REPORT_FILENAME: &str = "report.json";
pub const PREFS_FILENAME: &str = "preferences.json";

const APP_NAME: &str = "report-snapshot";

/// Where a configuration file came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    CliArgument,
    Environment,
    XdgConfig,
    SystemConfig,
    #[default]
    BuiltinDefault,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigSource::CliArgument => "CLI argument",
            ConfigSource::Environment => "environment variable",
            ConfigSource::XdgConfig => "XDG config",
            ConfigSource::SystemConfig => "system config",
            ConfigSource::BuiltinDefault => "builtin default",
        })
    }
}

/// Resolved paths with their provenance. `None` means use defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub report: Option<PathBuf>,
    pub preferences: Option<PathBuf>,
    pub report_source: ConfigSource,
    pub preferences_source: ConfigSource,
}

/// The two files the exporter reads.
#[derive(Debug, Clone, Copy)]
enum ConfigFile {
    Report,
    Preferences,
}

impl ConfigFile {
    fn env_var(self) -> &'static str {
        match self {
            ConfigFile::Report => ENV_REPORT_PATH,
            ConfigFile::Preferences => ENV_PREFS_PATH,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            ConfigFile::Report => REPORT_FILENAME,
            ConfigFile::Preferences => PREFS_FILENAME,
        }
    }

    /// Candidate locations in precedence order.
    fn candidates(self, cli_path: Option<&Path>) -> Vec<(ConfigSource, PathBuf)> {
        let env_path = |key: &str| std::env::var_os(key).map(PathBuf::from);

        let mut candidates = Vec::with_capacity(5);
        if let Some(path) = cli_path {
            candidates.push((ConfigSource::CliArgument, path.to_path_buf()));
        }
        if let Some(path) = env_path(self.env_var()) {
            candidates.push((ConfigSource::Environment, path));
        }
        if let Some(dir) = env_path(ENV_CONFIG_DIR) {
            candidates.push((ConfigSource::Environment, dir.join(self.file_name())));
        }
        if let Some(dir) = xdg_config_dir() {
            candidates.push((ConfigSource::XdgConfig, dir.join(self.file_name())));
        }
        candidates.push((ConfigSource::SystemConfig, system_config_dir().join(self.file_name())));
        candidates
    }

    fn resolve(self, cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
        if let Some(path) = cli_path.filter(|p| !p.exists()) {
            tracing::warn!(path = %path.display(), file = self.file_name(), "configured path does not exist, falling back");
        }
        self.candidates(cli_path)
            .into_iter()
            .find(|(_, path)| path.exists())
            .map_or((None, ConfigSource::BuiltinDefault), |(source, path)| {
                tracing::trace!(path = %path.display(), %source, "config file found");
                (Some(path), source)
            })
    }
}

/// Resolve both configuration files.
pub fn resolve_config(cli_report: Option<&Path>, cli_prefs: Option<&Path>) -> ConfigPaths {
    let (report, report_source) = ConfigFile::Report.resolve(cli_report);
    let (preferences, preferences_source) = ConfigFile::Preferences.resolve(cli_prefs);
    ConfigPaths {
        report,
        preferences,
        report_source,
        preferences_source,
    }
}

/// `~/.config/report-snapshot` (or the platform equivalent).
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

pub fn system_config_dir() -> PathBuf {
    Path::new("/etc").join(APP_NAME)
}
