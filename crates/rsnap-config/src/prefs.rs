//! Read-only access to the viewer's persisted preferences.
//!
//! The live viewer owns this store (its style picker and compact toggle write
//! to it). The export engine only reads two keys from it.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key holding the selected palette name.
pub const REPORT_STYLE_KEY: &str = "reportStyle";

/// Key holding the compact-mode flag (`"true"` / `"false"`).
pub const COMPACT_MODE_KEY: &str = "compactMode";

/// Errors loading a preference file.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in preference file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preference file {path} must contain a JSON object")]
    NotAnObject { path: PathBuf },
}

/// A read-only key-value store of string preferences.
pub trait PreferenceStore {
    /// Look up a raw value.
    fn get(&self, key: &str) -> Option<String>;

    /// Persisted palette choice, if any.
    fn report_style(&self) -> Option<String> {
        self.get(REPORT_STYLE_KEY)
    }

    /// Persisted compact-mode flag. Anything but `"true"` is off.
    fn compact_mode(&self) -> bool {
        self.get(COMPACT_MODE_KEY).as_deref() == Some("true")
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-memory preferences.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder form).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Preferences loaded from a flat JSON object, e.g. a local-storage dump.
///
/// String values are taken verbatim; booleans and numbers are stored in
/// their JSON text form. Nested values are ignored.
#[derive(Debug, Clone, Default)]
pub struct JsonPreferences {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl JsonPreferences {
    /// Load from a file.
    pub fn from_file(path: &Path) -> Result<Self, PreferenceError> {
        let content = std::fs::read_to_string(path).map_err(|source| PreferenceError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut prefs = Self::parse(&content, path)?;
        prefs.path = Some(path.to_path_buf());
        Ok(prefs)
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PreferenceError> {
        Self::parse(json, Path::new("<inline>"))
    }

    fn parse(json: &str, path: &Path) -> Result<Self, PreferenceError> {
        let value: Value =
            serde_json::from_str(json).map_err(|source| PreferenceError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        let Value::Object(map) = value else {
            return Err(PreferenceError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        let mut values = BTreeMap::new();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                _ => {
                    tracing::debug!(key = %key, "ignoring non-scalar preference");
                    continue;
                }
            };
            values.insert(key, text);
        }

        Ok(Self { path: None, values })
    }

    /// File this store was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for JsonPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_preferences() {
        let prefs = MemoryPreferences::new()
            .with(REPORT_STYLE_KEY, "dark")
            .with(COMPACT_MODE_KEY, "true");
        assert_eq!(prefs.report_style().as_deref(), Some("dark"));
        assert!(prefs.compact_mode());
    }

    #[test]
    fn test_compact_mode_requires_literal_true() {
        for raw in ["false", "TRUE", "1", "yes", ""] {
            let prefs = MemoryPreferences::new().with(COMPACT_MODE_KEY, raw);
            assert!(!prefs.compact_mode(), "{raw:?} must not enable compact mode");
        }
        assert!(!MemoryPreferences::new().compact_mode());
    }

    #[test]
    fn test_json_preferences_scalars() {
        let prefs = JsonPreferences::from_json(
            r#"{"reportStyle": "blue", "compactMode": true, "zoom": 2, "nested": {"a": 1}}"#,
        )
        .unwrap();
        assert_eq!(prefs.report_style().as_deref(), Some("blue"));
        assert!(prefs.compact_mode());
        assert_eq!(prefs.get("zoom").as_deref(), Some("2"));
        assert_eq!(prefs.get("nested"), None);
        assert_eq!(prefs.len(), 3);
    }

    #[test]
    fn test_json_preferences_rejects_non_object() {
        let err = JsonPreferences::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, PreferenceError::NotAnObject { .. }));
        let err = JsonPreferences::from_json("{not json").unwrap_err();
        assert!(matches!(err, PreferenceError::ParseError { .. }));
    }

    #[test]
    fn test_store_through_reference() {
        fn style_of(store: impl PreferenceStore) -> Option<String> {
            store.report_style()
        }
        let prefs = MemoryPreferences::new().with(REPORT_STYLE_KEY, "light");
        assert_eq!(style_of(&prefs).as_deref(), Some("light"));
    }
}
