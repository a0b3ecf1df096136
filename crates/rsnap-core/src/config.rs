//! Configuration loading for the CLI.
//!
//! Paths come from [`rsnap_config::resolve_config`]; this module reads and
//! validates what they point at.

use rsnap_config::{resolve_config, ConfigSource, JsonPreferences, PreferenceError};
use rsnap_report::{ExportError, ReportConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration in {path}: {message}")]
    ValidationError { path: PathBuf, message: String },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}

/// Explicit paths from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub report_path: Option<PathBuf>,
    pub prefs_path: Option<PathBuf>,
}

/// Loaded configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub report: ReportConfig,
    pub report_path: Option<PathBuf>,
    pub report_source: ConfigSource,
    pub preferences: JsonPreferences,
    pub preferences_path: Option<PathBuf>,
    pub preferences_source: ConfigSource,
}

/// Load report configuration and preferences.
///
/// Paths given explicitly must exist; discovered ones fall back to defaults.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    for path in [&options.report_path, &options.prefs_path].into_iter().flatten() {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
    }

    let paths = resolve_config(options.report_path.as_deref(), options.prefs_path.as_deref());

    let report = match &paths.report {
        Some(path) => load_report_config(path)?,
        None => ReportConfig::default(),
    };
    let preferences = match &paths.preferences {
        Some(path) => JsonPreferences::from_file(path)?,
        None => JsonPreferences::default(),
    };

    tracing::debug!(
        report_source = %paths.report_source,
        preferences_source = %paths.preferences_source,
        "configuration loaded"
    );

    Ok(ResolvedConfig {
        report,
        report_path: paths.report,
        report_source: paths.report_source,
        preferences,
        preferences_path: paths.preferences,
        preferences_source: paths.preferences_source,
    })
}

/// Read and validate a report configuration file.
pub fn load_report_config(path: &Path) -> Result<ReportConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ReportConfig::from_json(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate().map_err(|e| ConfigError::ValidationError {
        path: path.to_path_buf(),
        message: match e {
            ExportError::InvalidConfig(message) => message,
            other => other.to_string(),
        },
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsnap_config::PreferenceStore;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_paths() {
        let tmp = TempDir::new().unwrap();
        let report = tmp.path().join("report.json");
        let prefs = tmp.path().join("prefs.json");
        std::fs::write(&report, r#"{"minify": true}"#).unwrap();
        std::fs::write(&prefs, r#"{"reportStyle": "blue"}"#).unwrap();

        let resolved = load_config(&ConfigOptions {
            report_path: Some(report.clone()),
            prefs_path: Some(prefs),
        })
        .unwrap();
        assert!(resolved.report.minify);
        assert_eq!(resolved.report_path, Some(report));
        assert_eq!(resolved.report_source, ConfigSource::CliArgument);
        assert_eq!(resolved.preferences.report_style().as_deref(), Some("blue"));
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = load_config(&ConfigOptions {
            report_path: Some(PathBuf::from("/nonexistent/report.json")),
            prefs_path: None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_report_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.json");

        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(load_report_config(&path), Err(ConfigError::ParseError { .. })));

        std::fs::write(&path, r#"{"chart_class": "two words"}"#).unwrap();
        match load_report_config(&path) {
            Err(ConfigError::ValidationError { message, .. }) => {
                assert!(message.contains("chart_class"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
