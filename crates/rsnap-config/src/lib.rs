//! Report snapshot configuration.
//!
//! This crate provides:
//! - The recursive structural merge used for every layered style setting
//! - Read-only access to the viewer's persisted preferences
//! - Config resolution (CLI → env → XDG → defaults)

pub mod merge;
pub mod prefs;
pub mod resolve;

pub use merge::{merge, merge_all};
pub use prefs::{
    JsonPreferences, MemoryPreferences, PreferenceError, PreferenceStore, COMPACT_MODE_KEY,
    REPORT_STYLE_KEY,
};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
