//! Chart rasterization.
//!
//! Live charts are canvases drawn by a script runtime. A standalone document
//! cannot run that runtime, so every chart canvas is swapped for an `<img>`
//! carrying the chart as a base64 data URI, or for a text placeholder.

use crate::error::ChartError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use indexmap::IndexMap;
use rsnap_common::{Element, Node, Rewrite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{debug, warn};

/// Placeholder text when no live chart instance backs a canvas.
pub const CHART_UNAVAILABLE_TEXT: &str = "[Chart could not be exported as image]";

/// Placeholder text when conversion of a live chart failed.
pub const CHART_ERROR_TEXT: &str = "[Error exporting chart as image]";

/// Class carried by placeholder paragraphs.
pub const PLACEHOLDER_CLASS: &str = "chart-placeholder";

/// A static image of one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartImage {
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ChartImage {
    /// Build from raw bytes.
    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime: mime.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// `data:<mime>;base64,<data>` form for an `src` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }

    fn check(&self, id: &str) -> Result<(), ChartError> {
        if self.data.is_empty() {
            return Err(ChartError::EmptyImage(id.to_string()));
        }
        if !self.mime.starts_with("image/") {
            return Err(ChartError::InvalidPayload {
                id: id.to_string(),
                reason: format!("unsupported MIME type {:?}", self.mime),
            });
        }
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| ChartError::InvalidPayload {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Capability to look up live chart instances and export them as images.
pub trait ChartRuntime {
    /// Opaque reference to a live chart instance.
    type Handle;

    /// The live instance drawing into `canvas`, if any.
    fn instance_for(&self, canvas: &Element) -> Option<Self::Handle>;

    /// Export an instance as a static image.
    fn to_image(&self, handle: &Self::Handle) -> Result<ChartImage, ChartError>;
}

impl<R: ChartRuntime + ?Sized> ChartRuntime for &R {
    type Handle = R::Handle;

    fn instance_for(&self, canvas: &Element) -> Option<Self::Handle> {
        (**self).instance_for(canvas)
    }

    fn to_image(&self, handle: &Self::Handle) -> Result<ChartImage, ChartError> {
        (**self).to_image(handle)
    }
}

/// Runtime for hosts without any chart capability. Every chart degrades.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChartRuntime;

impl ChartRuntime for NoChartRuntime {
    type Handle = Infallible;

    fn instance_for(&self, _canvas: &Element) -> Option<Infallible> {
        None
    }

    fn to_image(&self, handle: &Infallible) -> Result<ChartImage, ChartError> {
        match *handle {}
    }
}

/// Pre-rendered chart images keyed by canvas id.
#[derive(Debug, Clone, Default)]
pub struct ChartImages {
    images: IndexMap<String, ChartImage>,
}

impl ChartImages {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image (builder form).
    pub fn with(mut self, canvas_id: impl Into<String>, image: ChartImage) -> Self {
        self.images.insert(canvas_id.into(), image);
        self
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl From<IndexMap<String, ChartImage>> for ChartImages {
    fn from(images: IndexMap<String, ChartImage>) -> Self {
        Self { images }
    }
}

impl ChartRuntime for ChartImages {
    type Handle = String;

    fn instance_for(&self, canvas: &Element) -> Option<String> {
        let id = canvas.id()?;
        self.images.contains_key(id).then(|| id.to_string())
    }

    fn to_image(&self, handle: &String) -> Result<ChartImage, ChartError> {
        let image = self
            .images
            .get(handle)
            .ok_or_else(|| ChartError::Runtime(format!("chart '{handle}' disappeared")))?;
        image.check(handle)?;
        Ok(image.clone())
    }
}

/// Counts from one rasterization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub embedded: usize,
    pub unavailable: usize,
    pub failed: usize,
}

impl RasterStats {
    /// Canvases seen in total.
    pub fn total(&self) -> usize {
        self.embedded + self.unavailable + self.failed
    }
}

/// Replaces chart canvases with static images.
#[derive(Debug, Clone)]
pub struct AssetRasterizer<R> {
    runtime: R,
    chart_class: String,
}

impl<R: ChartRuntime> AssetRasterizer<R> {
    /// Create a rasterizer for canvases carrying `chart_class`.
    pub fn new(runtime: R, chart_class: impl Into<String>) -> Self {
        Self {
            runtime,
            chart_class: chart_class.into(),
        }
    }

    /// Rasterize every canvas below `fragment`, returning a new tree.
    ///
    /// `section_id` only feeds the `alt` text of embedded images.
    pub fn rasterize(&self, fragment: &Element, section_id: &str) -> Element {
        self.rasterize_with_stats(fragment, section_id).0
    }

    /// Like [`AssetRasterizer::rasterize`], also reporting what happened.
    pub fn rasterize_with_stats(&self, fragment: &Element, section_id: &str) -> (Element, RasterStats) {
        let mut stats = RasterStats::default();
        let out = fragment.rewrite(&mut |el| {
            if el.tag != "canvas" {
                return Rewrite::Keep;
            }
            Rewrite::Replace(self.replace_canvas(el, section_id, &mut stats))
        });
        if stats.total() > 0 {
            debug!(
                section = section_id,
                embedded = stats.embedded,
                unavailable = stats.unavailable,
                failed = stats.failed,
                "charts rasterized"
            );
        }
        (out, stats)
    }

    fn replace_canvas(&self, canvas: &Element, section_id: &str, stats: &mut RasterStats) -> Node {
        let canvas_id = canvas.id().unwrap_or("<anonymous>");
        if !canvas.has_class(&self.chart_class) {
            debug!(canvas = canvas_id, "canvas without chart class, not exportable");
            stats.unavailable += 1;
            return placeholder(CHART_UNAVAILABLE_TEXT);
        }

        let Some(handle) = self.runtime.instance_for(canvas) else {
            debug!(canvas = canvas_id, section = section_id, "no live chart instance");
            stats.unavailable += 1;
            return placeholder(CHART_UNAVAILABLE_TEXT);
        };

        match self.runtime.to_image(&handle) {
            Ok(image) => {
                stats.embedded += 1;
                Element::new("img")
                    .with_attr("src", image.data_uri())
                    .with_attr("style", "max-width: 100%; height: auto;")
                    .with_attr("alt", format!("Chart for {section_id}"))
                    .into()
            }
            Err(e) => {
                warn!(canvas = canvas_id, section = section_id, error = %e, "chart export failed");
                stats.failed += 1;
                placeholder(CHART_ERROR_TEXT)
            }
        }
    }
}

fn placeholder(text: &str) -> Node {
    Element::new("p")
        .with_attr("class", PLACEHOLDER_CLASS)
        .with_text(text)
        .into()
}
