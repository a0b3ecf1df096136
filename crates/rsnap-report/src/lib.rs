//! Snapshot export engine for database inspection reports.
//!
//! Captures the current state of a live, interactive report view and
//! produces one standalone HTML document that renders the same content
//! without the host application.
//!
//! # Pipeline
//!
//! - Name: database identity from the sidebar card, plus a timestamp
//! - Theme: persisted palette and compact flag, layered over the defaults
//! - Collect: one fragment per navigation module, hidden regions shown
//!   only for the duration of the capture
//! - Rasterize: live chart canvases become embedded `data:` images
//! - Rewrite: overview jump links retargeted to in-document navigation
//! - Assemble and deliver: one self-contained document, written atomically
//!
//! Failures local to a module or chart degrade to a visible placeholder in
//! the document. Only assembly and delivery errors abort an export.
//!
//! # Example
//!
//! ```no_run
//! use rsnap_report::{Exporter, FileDelivery, ReportConfig, StaticView};
//! use rsnap_config::MemoryPreferences;
//! use std::path::Path;
//!
//! let mut view = StaticView::from_file(Path::new("view.json")).unwrap();
//! let runtime = rsnap_report::ChartImages::from(view.charts.clone());
//! let exporter = Exporter::new(ReportConfig::default(), runtime, FileDelivery::new("out")).unwrap();
//! let outcome = exporter
//!     .export_report(&mut view, &MemoryPreferences::new(), chrono::Local::now().fixed_offset())
//!     .unwrap();
//! println!("{}", outcome.path.display());
//! ```

pub mod assembler;
pub mod collect;
pub mod config;
pub mod delivery;
pub mod error;
pub mod exporter;
pub mod i18n;
pub mod links;
pub mod namer;
pub mod rasterize;
pub mod snapshot;
pub mod styles;
pub mod theme;
pub mod view;

pub use assembler::{nav_script, DocumentAssembler};
pub use collect::{discover_modules, ContentCollector, DbInfo};
pub use config::ReportConfig;
pub use delivery::{Delivery, FileDelivery, MemoryDelivery};
pub use error::{ChartError, ExportError, Result};
pub use exporter::Exporter;
pub use i18n::{Locale, Text};
pub use links::{rewrite_overview_links, LinkStats};
pub use namer::{extract_identity, DbIdentity};
pub use rasterize::{AssetRasterizer, ChartImage, ChartImages, ChartRuntime, NoChartRuntime};
pub use snapshot::{ExportArtifact, ExportOutcome, ReportSnapshot};
pub use theme::{Palette, Theme, ThemeResolver};
pub use view::{LiveView, StaticView, Visibility, VisibilityGuard};
