//! Logging configuration for rsnap.
//!
//! Precedence, lowest first: built-in defaults, `RUST_LOG`, `RSNAP_LOG` /
//! `RSNAP_LOG_FORMAT`, then `-v`/`-q`/`--log-format` on the command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "RSNAP_LOG";

/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "RSNAP_LOG_FORMAT";

/// Shape of the lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event, carrying the export span.
    Jsonl,
}

impl LogFormat {
    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if ["human", "text", "pretty"].contains(&lower.as_str()) {
            Ok(LogFormat::Human)
        } else if ["jsonl", "json", "ndjson"].contains(&lower.as_str()) {
            Ok(LogFormat::Jsonl)
        } else {
            Err(format!("unknown log format '{s}' (expected human or jsonl)"))
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum severity that reaches the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// All levels, most verbose first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Off,
    ];

    /// Canonical name, also the `EnvFilter` directive spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Level for `-v` counts and `-q`. `None` when neither was given.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }

    /// Most verbose level named anywhere in a `RUST_LOG` value.
    ///
    /// `RUST_LOG` may hold per-target directives (`rsnap_report=debug,warn`);
    /// only the level words matter here.
    fn from_rust_log(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        Self::ALL[..5]
            .iter()
            .copied()
            .find(|level| value.contains(level.as_str()))
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "warning" => return Ok(LogLevel::Warn),
            "none" | "quiet" | "silent" => return Ok(LogLevel::Off),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| format!("unknown log level '{s}'"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Resolved logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human lines with a timestamp. JSON lines always carry one.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment and command-line overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Resolve with an explicit variable lookup.
    ///
    /// Unparseable environment values are ignored.
    pub fn from_lookup<F>(lookup: F, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_level = match lookup(ENV_LOG_LEVEL) {
            Some(value) => value.parse().ok(),
            None => lookup("RUST_LOG").and_then(|value| LogLevel::from_rust_log(&value)),
        };
        let env_format = lookup(ENV_LOG_FORMAT).and_then(|value| value.parse().ok());

        let defaults = Self::default();
        Self {
            level: cli_level.or(env_level).unwrap_or(defaults.level),
            format: cli_format.or(env_format).unwrap_or(defaults.format),
            ..defaults
        }
    }

    /// Set log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}
