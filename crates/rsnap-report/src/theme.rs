//! Palette table and layered theme resolution.
//!
//! A [`Theme`] is resolved once per export from three layers merged in order:
//! the `default` palette, the persisted palette, and configured overrides.
//! Chart option defaults are derived from the merged variables and can carry
//! their own override layer.

use indexmap::IndexMap;
use rsnap_config::{merge, merge_all, PreferenceStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::debug;

/// Background value that marks the dark palette for chart tooltips.
const DARK_BODY_BG: &str = "#202124";

/// Built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Palette {
    #[default]
    Default,
    Light,
    Blue,
    Dark,
    HighContrast,
}

impl Palette {
    /// Every palette, in picker order.
    pub const ALL: [Palette; 5] = [
        Palette::Default,
        Palette::Light,
        Palette::Blue,
        Palette::Dark,
        Palette::HighContrast,
    ];

    /// Persisted name of this palette.
    pub fn name(&self) -> &'static str {
        match self {
            Palette::Default => "default",
            Palette::Light => "light",
            Palette::Blue => "blue",
            Palette::Dark => "dark",
            Palette::HighContrast => "highContrast",
        }
    }

    /// Look up a persisted name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Style variables of this palette as a JSON object.
    pub fn variables(&self) -> Value {
        match self {
            Palette::Default => json!({
                "--primary-blue": "#1a73e8",
                "--secondary-blue": "#e8f0fe",
                "--text-primary": "#202124",
                "--text-secondary": "#5f6368",
                "--border-color": "#dadce0",
                "--card-shadow": "0 2px 6px rgba(60, 64, 67, 0.15)",
                "body-bg": "#f5f7fa",
                "sidebar-bg": "#ffffff",
                "table-header-bg": "#f5f7fa",
                "table-hover-bg": "#f1f3f4",
                "chart-bg": "#ffffff"
            }),
            Palette::Light => json!({
                "--primary-blue": "#2196f3",
                "--secondary-blue": "#f0f8ff",
                "--text-primary": "#37474f",
                "--text-secondary": "#607d8b",
                "--border-color": "#e0e0e0",
                "--card-shadow": "0 1px 3px rgba(0, 0, 0, 0.08)",
                "body-bg": "#ffffff",
                "sidebar-bg": "#fafafa",
                "table-header-bg": "#f5f5f5",
                "table-hover-bg": "#f9f9f9",
                "chart-bg": "#ffffff"
            }),
            Palette::Blue => json!({
                "--primary-blue": "#039be5",
                "--secondary-blue": "#e1f5fe",
                "--text-primary": "#01579b",
                "--text-secondary": "#0277bd",
                "--border-color": "#b3e5fc",
                "--card-shadow": "0 2px 6px rgba(3, 155, 229, 0.15)",
                "body-bg": "#e3f2fd",
                "sidebar-bg": "#ffffff",
                "table-header-bg": "#e1f5fe",
                "table-hover-bg": "#e3f2fd",
                "chart-bg": "#ffffff"
            }),
            Palette::Dark => json!({
                "--primary-blue": "#8ab4f8",
                "--secondary-blue": "#303841",
                "--text-primary": "#e8eaed",
                "--text-secondary": "#9aa0a6",
                "--border-color": "#5f6368",
                "--card-shadow": "0 2px 6px rgba(0, 0, 0, 0.3)",
                "body-bg": DARK_BODY_BG,
                "sidebar-bg": "#292a2d",
                "table-header-bg": "#292a2d",
                "table-hover-bg": "#3c4043",
                "chart-bg": "#292a2d"
            }),
            Palette::HighContrast => json!({
                "--primary-blue": "#0000ff",
                "--secondary-blue": "#e0e0e0",
                "--text-primary": "#000000",
                "--text-secondary": "#333333",
                "--border-color": "#000000",
                "--card-shadow": "none",
                "body-bg": "#ffffff",
                "sidebar-bg": "#f0f0f0",
                "table-header-bg": "#e0e0e0",
                "table-hover-bg": "#cccccc",
                "chart-bg": "#ffffff"
            }),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete style for one export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    /// Palette the theme was resolved from.
    pub palette: Palette,
    /// Style variables with literal values, in palette order.
    pub variables: IndexMap<String, String>,
    /// Baseline chart options colored from the palette.
    pub chart_defaults: Value,
    /// Compact layout flag.
    pub compact: bool,
}

impl Theme {
    /// Look up a style variable.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Look up a style variable, falling back to the default palette.
    pub fn var_or_default(&self, name: &str) -> String {
        self.var(name)
            .map(str::to_string)
            .or_else(|| {
                Palette::Default.variables()[name]
                    .as_str()
                    .map(str::to_string)
            })
            .unwrap_or_default()
    }

    /// Whether the resolved background is the dark one.
    pub fn is_dark(&self) -> bool {
        self.var("body-bg") == Some(DARK_BODY_BG)
    }

    /// Custom properties (`--*` variables) as declarations.
    pub fn custom_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .filter(|(k, _)| k.starts_with("--"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge chart-specific options over the theme's chart defaults.
    ///
    /// A null `specific` is treated as an empty object.
    pub fn chart_options(&self, specific: &Value) -> Value {
        if specific.is_null() {
            return self.chart_defaults.clone();
        }
        merge(&self.chart_defaults, specific)
    }

    /// Like [`Theme::chart_options`], with the legend shown only when the
    /// chart has more than one dataset.
    pub fn chart_options_for(&self, dataset_count: usize, specific: &Value) -> Value {
        let legend = json!({"plugins": {"legend": {"display": dataset_count > 1}}});
        let base = merge(&self.chart_defaults, &legend);
        if specific.is_null() {
            return base;
        }
        merge(&base, specific)
    }
}

/// Resolves the persisted palette choice and compact flag into a [`Theme`].
#[derive(Debug, Clone, Default)]
pub struct ThemeResolver {
    overrides: Value,
}

impl ThemeResolver {
    /// Create a resolver without overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer `{ "variables": {..}, "chart": {..} }` on top of every palette.
    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve a theme. Unknown or absent choices fall back to `default`.
    pub fn resolve(&self, persisted_choice: Option<&str>, compact: bool) -> Theme {
        let palette = match persisted_choice {
            Some(name) => Palette::from_name(name).unwrap_or_else(|| {
                debug!(choice = name, "unknown palette, using default");
                Palette::Default
            }),
            None => Palette::Default,
        };

        let empty = Value::Object(Map::new());
        let variable_overrides = self.overrides.get("variables").unwrap_or(&empty);
        let merged = merge_all([
            &Palette::Default.variables(),
            &palette.variables(),
            variable_overrides,
        ]);
        let variables = flatten_variables(&merged);

        let mut theme = Theme {
            palette,
            variables,
            chart_defaults: Value::Null,
            compact,
        };
        let chart_overrides = self.overrides.get("chart").unwrap_or(&empty);
        theme.chart_defaults = merge(&chart_defaults(&theme), chart_overrides);

        debug!(palette = %palette, compact, "theme resolved");
        theme
    }

    /// Resolve from a preference store.
    pub fn resolve_from<P: PreferenceStore>(&self, prefs: &P) -> Theme {
        let choice = prefs.report_style();
        self.resolve(choice.as_deref(), prefs.compact_mode())
    }
}

/// Keep string and number leaves; anything else is not a literal style value.
fn flatten_variables(merged: &Value) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    if let Value::Object(map) = merged {
        for (key, value) in map {
            match value {
                Value::String(s) => {
                    out.insert(key.clone(), s.clone());
                }
                Value::Number(n) => {
                    out.insert(key.clone(), n.to_string());
                }
                _ => debug!(key = %key, "dropping non-literal style variable"),
            }
        }
    }
    out
}

/// Baseline chart configuration colored from the theme.
fn chart_defaults(theme: &Theme) -> Value {
    let text = theme.var_or_default("--text-primary");
    let grid = theme.var_or_default("--border-color");
    let tooltip_bg = if theme.is_dark() { "#3c4043" } else { "#fff" };

    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "plugins": {
            "legend": {
                "position": "top",
                "labels": { "color": text }
            },
            "tooltip": {
                "mode": "index",
                "intersect": false,
                "backgroundColor": tooltip_bg,
                "titleColor": text,
                "bodyColor": text,
                "borderColor": grid,
                "borderWidth": 1
            },
            "title": {
                "display": false,
                "text": "",
                "color": text,
                "font": { "size": 14, "weight": "500" },
                "padding": { "top": 10, "bottom": 10 }
            }
        },
        "scales": {
            "x": {
                "type": "time",
                "time": {
                    "tooltipFormat": "yyyy-MM-dd HH:mm",
                    "displayFormats": {
                        "millisecond": "HH:mm:ss.SSS",
                        "second": "HH:mm:ss",
                        "minute": "HH:mm",
                        "hour": "HH:mm",
                        "day": "MM-dd",
                        "week": "MM-dd",
                        "month": "yyyy-MM",
                        "quarter": "yyyy QQ",
                        "year": "yyyy"
                    }
                },
                "title": { "display": true, "text": "时间", "color": text },
                "ticks": { "color": text },
                "grid": { "color": grid, "borderColor": grid }
            },
            "y": {
                "beginAtZero": true,
                "title": { "display": true, "text": "值", "color": text },
                "ticks": { "color": text },
                "grid": { "color": grid, "borderColor": grid }
            }
        }
    })
}
