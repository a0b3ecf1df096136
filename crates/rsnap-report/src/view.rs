//! Access to the live report view.
//!
//! The exporter reads navigation, regions and language from a [`LiveView`].
//! The only mutation it performs is toggling region visibility, and every
//! toggle goes through a [`VisibilityGuard`] that puts the original state back.

use crate::error::{ExportError, Result};
use crate::rasterize::ChartImage;
use indexmap::IndexMap;
use rsnap_common::Element;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::Path;
use tracing::trace;

/// Display state of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// The rendered, navigable report the export is taken from.
pub trait LiveView {
    /// Host language attribute (e.g. `en-US`), if any.
    fn lang(&self) -> Option<&str>;

    /// The sidebar element holding navigation and the database card.
    fn sidebar(&self) -> Option<&Element>;

    /// A content region by element id.
    fn region(&self, id: &str) -> Option<&Element>;

    /// Current visibility of a region.
    fn visibility(&self, id: &str) -> Option<Visibility>;

    /// Change the visibility of a region. Unknown ids are ignored.
    fn set_visibility(&mut self, id: &str, visibility: Visibility);
}

/// Forces a region visible for as long as it lives.
///
/// Dropping the guard restores the visibility observed at creation, including
/// on early return or unwinding.
pub struct VisibilityGuard<'a, V: LiveView + ?Sized> {
    view: &'a mut V,
    id: String,
    original: Visibility,
}

impl<'a, V: LiveView + ?Sized> VisibilityGuard<'a, V> {
    /// Show `id`, remembering its current state. Returns `None` for unknown regions.
    pub fn show(view: &'a mut V, id: &str) -> Option<Self> {
        let original = view.visibility(id)?;
        if original != Visibility::Visible {
            view.set_visibility(id, Visibility::Visible);
        }
        trace!(region = id, ?original, "region forced visible");
        Some(Self {
            view,
            id: id.to_string(),
            original,
        })
    }

    /// The region this guard holds open.
    pub fn region(&self) -> Option<&Element> {
        self.view.region(&self.id)
    }
}

impl<V: LiveView + ?Sized> Deref for VisibilityGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.view
    }
}

impl<V: LiveView + ?Sized> Drop for VisibilityGuard<'_, V> {
    fn drop(&mut self) {
        if self.view.visibility(&self.id) != Some(self.original) {
            self.view.set_visibility(&self.id, self.original);
        }
        trace!(region = %self.id, restored = ?self.original, "region visibility restored");
    }
}

/// One content region of a [`StaticView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// The region element; its `id` names it.
    pub element: Element,
    /// Whether the region is currently displayed.
    #[serde(default)]
    pub visible: bool,
}

/// A view captured as a JSON document.
///
/// ```json
/// { "lang": "en", "sidebar": {...}, "regions": [{"element": {...}, "visible": true}],
///   "charts": {"cpu-chart": {"mime": "image/png", "data": "iVBOR..."}} }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticView {
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub sidebar: Option<Element>,
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Pre-rendered chart images keyed by canvas id.
    #[serde(default)]
    pub charts: IndexMap<String, ChartImage>,
}

impl StaticView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language (builder form).
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Set the sidebar (builder form).
    pub fn with_sidebar(mut self, sidebar: Element) -> Self {
        self.sidebar = Some(sidebar);
        self
    }

    /// Add a region (builder form).
    pub fn with_region(mut self, element: Element, visible: bool) -> Self {
        self.regions.push(Region { element, visible });
        self
    }

    /// Add a pre-rendered chart image (builder form).
    pub fn with_chart(mut self, canvas_id: impl Into<String>, image: ChartImage) -> Self {
        self.charts.insert(canvas_id.into(), image);
        self
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let view: Self = serde_json::from_str(json)?;
        for region in &view.regions {
            if region.element.id().map_or(true, str::is_empty) {
                return Err(ExportError::InvalidView(format!(
                    "region <{}> has no id",
                    region.element.tag
                )));
            }
        }
        Ok(view)
    }

    /// Load from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn region_entry(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.element.id() == Some(id))
    }
}

impl LiveView for StaticView {
    fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    fn sidebar(&self) -> Option<&Element> {
        self.sidebar.as_ref()
    }

    fn region(&self, id: &str) -> Option<&Element> {
        self.region_entry(id).map(|r| &r.element)
    }

    fn visibility(&self, id: &str) -> Option<Visibility> {
        self.region_entry(id).map(|r| Visibility::from(r.visible))
    }

    fn set_visibility(&mut self, id: &str, visibility: Visibility) {
        if let Some(region) = self.regions.iter_mut().find(|r| r.element.id() == Some(id)) {
            region.visible = visibility == Visibility::Visible;
        }
    }
}
