//! Report export configuration types.

use crate::error::{ExportError, Result};
use rsnap_common::OVERVIEW_MODULE_ID;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Icon font stylesheet, the only external reference of an exported document.
pub const DEFAULT_ICON_FONT_URL: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.2/font/bootstrap-icons.min.css";

/// Class marking chart-bearing canvases in the live view.
pub const DEFAULT_CHART_CLASS: &str = "chart-canvas";

/// Complete export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Custom document title (replaces the localized main title).
    #[serde(default)]
    pub title: Option<String>,
    /// Icon font stylesheet URL.
    #[serde(default = "default_icon_font_url")]
    pub icon_font_url: String,
    /// Class of chart canvases to rasterize.
    #[serde(default = "default_chart_class")]
    pub chart_class: String,
    /// Id of the synthetic overview module.
    #[serde(default = "default_overview_module")]
    pub overview_module_id: String,
    /// Name shown in the footer copyright line.
    #[serde(default = "default_copyright_holder")]
    pub copyright_holder: String,
    /// Minify the assembled document.
    #[serde(default)]
    pub minify: bool,
    /// Layered on top of the selected palette: `{ "variables": {..}, "chart": {..} }`.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub theme_overrides: Value,
}

fn default_schema_version() -> String {
    rsnap_config::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_icon_font_url() -> String {
    DEFAULT_ICON_FONT_URL.to_string()
}

fn default_chart_class() -> String {
    DEFAULT_CHART_CLASS.to_string()
}

fn default_overview_module() -> String {
    OVERVIEW_MODULE_ID.to_string()
}

fn default_copyright_holder() -> String {
    "GoodwaysIT".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            title: None,
            icon_font_url: default_icon_font_url(),
            chart_class: default_chart_class(),
            overview_module_id: default_overview_module(),
            copyright_holder: default_copyright_holder(),
            minify: false,
            theme_overrides: Value::Null,
        }
    }
}

impl ReportConfig {
    /// Create a new export configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the icon font stylesheet URL.
    pub fn with_icon_font_url(mut self, url: impl Into<String>) -> Self {
        self.icon_font_url = url.into();
        self
    }

    /// Set the chart canvas class.
    pub fn with_chart_class(mut self, class: impl Into<String>) -> Self {
        self.chart_class = class.into();
        self
    }

    /// Enable minification.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Set theme overrides.
    pub fn with_theme_overrides(mut self, overrides: Value) -> Self {
        self.theme_overrides = overrides;
        self
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.chart_class.trim().is_empty() || self.chart_class.contains(char::is_whitespace) {
            return Err(ExportError::InvalidConfig(format!(
                "chart_class must be a single class name, got {:?}",
                self.chart_class
            )));
        }
        if self.overview_module_id.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "overview_module_id must not be empty".to_string(),
            ));
        }
        if self.icon_font_url.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "icon_font_url must not be empty".to_string(),
            ));
        }
        match &self.theme_overrides {
            Value::Null | Value::Object(_) => Ok(()),
            other => Err(ExportError::InvalidConfig(format!(
                "theme_overrides must be an object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load and validate configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.schema_version, "1.0.0");
        assert_eq!(config.chart_class, "chart-canvas");
        assert_eq!(config.overview_module_id, "all");
        assert!(!config.minify);
        assert!(config.title.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ReportConfig::new()
            .with_title("Nightly Inspection")
            .with_minify(true)
            .with_chart_class("metric-chart");

        assert_eq!(config.title.as_deref(), Some("Nightly Inspection"));
        assert!(config.minify);
        assert_eq!(config.chart_class, "metric-chart");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ReportConfig::from_json(r#"{"minify": true}"#).unwrap();
        assert!(config.minify);
        assert_eq!(config.icon_font_url, DEFAULT_ICON_FONT_URL);
    }

    #[test]
    fn test_validate_rejects_bad_overrides() {
        let config = ReportConfig::new().with_theme_overrides(json!(["dark"]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_validate_rejects_multi_class() {
        let config = ReportConfig::new().with_chart_class("a b");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ReportConfig::new()
            .with_theme_overrides(json!({"variables": {"--primary-blue": "#000"}}));
        let json = config.to_json().unwrap();
        let parsed = ReportConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
