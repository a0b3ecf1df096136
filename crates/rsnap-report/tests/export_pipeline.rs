//! End-to-end export tests.
//!
//! Validates:
//! - Views, preferences and configuration load from disk
//! - Documents land in the target directory without overwriting
//! - Region visibility is restored after collection, even with missing content
//! - Overlapping exports on one exporter are rejected

use chrono::{DateTime, FixedOffset};
use rsnap_common::Element;
use rsnap_config::{JsonPreferences, MemoryPreferences, COMPACT_MODE_KEY, REPORT_STYLE_KEY};
use rsnap_report::{
    ChartImages, ExportError, Exporter, FileDelivery, LiveView, MemoryDelivery, NoChartRuntime,
    ReportConfig, StaticView, Visibility,
};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

const VIEW_JSON: &str = r#"{
  "lang": "en",
  "sidebar": {
    "tag": "nav",
    "attrs": {"class": "sidebar"},
    "children": [
      {"tag": "div", "attrs": {"class": "db-info-container"}, "children": [
        {"tag": "div", "attrs": {"class": "fw-medium"}, "children": ["Sales DB"]},
        {"tag": "div", "attrs": {"class": "small"}, "children": [
          {"tag": "i", "attrs": {"class": "bi bi-hdd-network"}},
          " 10.0.0.1:1521 "
        ]}
      ]},
      {"tag": "a", "attrs": {"class": "nav-link", "data-section-id": "all"},
       "children": [{"tag": "i", "attrs": {"class": "bi bi-grid"}}, "Overview"]},
      {"tag": "a", "attrs": {"class": "nav-link", "data-section-id": "storage"},
       "children": [{"tag": "i", "attrs": {"class": "bi bi-hdd"}}, "Storage"]},
      {"tag": "a", "attrs": {"class": "nav-link", "data-section-id": "sessions"},
       "children": ["Sessions"]}
    ]
  },
  "regions": [
    {"element": {"tag": "div", "attrs": {"id": "section-all"},
                 "children": [{"tag": "p", "children": ["Instance is healthy"]}]},
     "visible": true},
    {"element": {"tag": "div", "attrs": {"id": "section-storage"},
                 "children": [
                   {"tag": "h2", "children": ["Tablespaces"]},
                   {"tag": "canvas", "attrs": {"id": "ts-usage", "class": "chart-canvas"}}
                 ]},
     "visible": false}
  ],
  "charts": {
    "ts-usage": {"mime": "image/png", "data": "iVBORw0KGgo="}
  }
}"#;

fn at() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-01-01T12:00:00+08:00").unwrap()
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn visibilities(view: &StaticView) -> Vec<(String, Option<Visibility>)> {
    view.regions
        .iter()
        .filter_map(|r| r.element.id().map(str::to_string))
        .map(|id| {
            let v = view.visibility(&id);
            (id, v)
        })
        .collect()
}

// ============================================================================
// File Pipeline Tests
// ============================================================================

#[test]
fn test_export_from_files_to_directory() {
    let tmp = TempDir::new().unwrap();
    let view_path = write(&tmp, "view.json", VIEW_JSON);
    let mut view = StaticView::from_file(&view_path).unwrap();
    let runtime = ChartImages::from(view.charts.clone());

    let out = tmp.path().join("exports");
    let exporter = Exporter::new(ReportConfig::default(), runtime, FileDelivery::new(&out)).unwrap();
    let outcome = exporter
        .export_report(&mut view, &MemoryPreferences::new(), at())
        .unwrap();

    assert_eq!(outcome.file_name, "Sales_10.0.0.1_1521_20250101_1200.html");
    assert_eq!(outcome.path, out.join(&outcome.file_name));
    assert_eq!(outcome.missing_modules, ["sessions"]);
    assert_eq!(outcome.modules, 3);

    let html = fs::read_to_string(&outcome.path).unwrap();
    assert_eq!(html.len(), outcome.bytes);
    assert!(html.contains("Instance is healthy"));
    assert!(html.contains(r#"<img src="data:image/png;base64,iVBORw0KGgo=""#));
    assert!(html.contains(r#"id="section-sessions""#));
    assert!(!html.contains("<canvas"));
}

#[test]
fn test_repeat_export_does_not_overwrite() {
    let tmp = TempDir::new().unwrap();
    let mut view = StaticView::from_json(VIEW_JSON).unwrap();
    let exporter =
        Exporter::new(ReportConfig::default(), NoChartRuntime, FileDelivery::new(tmp.path())).unwrap();
    let prefs = MemoryPreferences::new();

    let first = exporter.export_report(&mut view, &prefs, at()).unwrap();
    let second = exporter.export_report(&mut view, &prefs, at()).unwrap();

    assert_eq!(first.file_name, second.file_name);
    assert_ne!(first.path, second.path);
    assert_eq!(
        second.path.file_name().unwrap(),
        "Sales_10.0.0.1_1521_20250101_1200 (1).html"
    );
    assert!(first.path.exists());
    assert!(second.path.exists());
}

#[test]
fn test_preferences_and_config_from_files() {
    let tmp = TempDir::new().unwrap();
    let prefs_path = write(
        &tmp,
        "preferences.json",
        &format!(r#"{{"{REPORT_STYLE_KEY}": "dark", "{COMPACT_MODE_KEY}": true}}"#),
    );
    let config_path = write(
        &tmp,
        "report.json",
        r##"{"title": "Nightly check", "theme_overrides": {"variables": {"--border-color": "#123456"}}}"##,
    );

    let prefs = JsonPreferences::from_file(&prefs_path).unwrap();
    let config = ReportConfig::from_file(&config_path).unwrap();
    let exporter = Exporter::new(config, NoChartRuntime, MemoryDelivery::new()).unwrap();
    let mut view = StaticView::from_json(VIEW_JSON).unwrap();
    exporter.export_report(&mut view, &prefs, at()).unwrap();

    let html = exporter.delivery().last().unwrap().document;
    assert!(html.contains("<title>Nightly check</title>"));
    assert!(html.contains(r#"<body class="compact-mode">"#));
    assert!(html.contains("--primary-color:#8ab4f8;"));
    assert!(html.contains("--border-color:#123456;"));
}

#[test]
fn test_unwritable_target_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let blocker = write(&tmp, "not-a-dir", "");
    let exporter =
        Exporter::new(ReportConfig::default(), NoChartRuntime, FileDelivery::new(&blocker)).unwrap();
    let mut view = StaticView::from_json(VIEW_JSON).unwrap();

    let err = exporter
        .export_report(&mut view, &MemoryPreferences::new(), at())
        .unwrap_err();
    assert!(matches!(err, ExportError::DeliveryError { .. }), "got {err:?}");
    assert!(!exporter.is_running());
}

// ============================================================================
// Visibility Restoration Tests
// ============================================================================

#[test]
fn test_visibility_restored_after_export() {
    let mut view = StaticView::from_json(VIEW_JSON).unwrap();
    let before = visibilities(&view);

    let exporter = Exporter::new(ReportConfig::default(), NoChartRuntime, MemoryDelivery::new()).unwrap();
    exporter
        .export_report(&mut view, &MemoryPreferences::new(), at())
        .unwrap();

    assert_eq!(visibilities(&view), before);
    assert_eq!(view.visibility("section-storage"), Some(Visibility::Hidden));
}

#[test]
fn test_visibility_restored_with_failed_charts() {
    let mut view = StaticView::from_json(VIEW_JSON).unwrap();
    for region in &mut view.regions {
        region.visible = !region.visible;
    }
    let before = visibilities(&view);
    let runtime = ChartImages::new().with(
        "ts-usage",
        rsnap_report::ChartImage {
            mime: "text/plain".into(),
            data: "aGVsbG8=".into(),
        },
    );

    let exporter = Exporter::new(ReportConfig::default(), runtime, MemoryDelivery::new()).unwrap();
    exporter
        .export_report(&mut view, &MemoryPreferences::new(), at())
        .unwrap();

    assert_eq!(visibilities(&view), before);
    let html = exporter.delivery().last().unwrap().document;
    assert!(html.contains("[Error exporting chart as image]"));
}

// ============================================================================
// In-flight Guard Tests
// ============================================================================

/// Blocks the first sidebar read until released.
struct Gate {
    armed: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

struct BlockingView {
    inner: StaticView,
    gate: Arc<Gate>,
}

impl LiveView for BlockingView {
    fn lang(&self) -> Option<&str> {
        self.inner.lang()
    }

    fn sidebar(&self) -> Option<&Element> {
        if self.gate.armed.swap(false, Ordering::SeqCst) {
            self.gate.entered.wait();
            self.gate.release.wait();
        }
        self.inner.sidebar()
    }

    fn region(&self, id: &str) -> Option<&Element> {
        self.inner.region(id)
    }

    fn visibility(&self, id: &str) -> Option<Visibility> {
        self.inner.visibility(id)
    }

    fn set_visibility(&mut self, id: &str, visibility: Visibility) {
        self.inner.set_visibility(id, visibility);
    }
}

#[test]
fn test_overlapping_export_rejected() {
    let exporter = Exporter::new(ReportConfig::default(), NoChartRuntime, MemoryDelivery::new()).unwrap();
    let gate = Arc::new(Gate {
        armed: AtomicBool::new(true),
        entered: Barrier::new(2),
        release: Barrier::new(2),
    });
    let mut blocking = BlockingView {
        inner: StaticView::from_json(VIEW_JSON).unwrap(),
        gate: Arc::clone(&gate),
    };
    let prefs = MemoryPreferences::new();

    std::thread::scope(|s| {
        let first = s.spawn(|| exporter.export_report(&mut blocking, &prefs, at()));

        gate.entered.wait();
        assert!(exporter.is_running());
        let mut other = StaticView::from_json(VIEW_JSON).unwrap();
        let second = exporter.export_report(&mut other, &prefs, at());
        assert!(matches!(second, Err(ExportError::AlreadyRunning)));
        gate.release.wait();

        assert!(first.join().unwrap().is_ok());
    });

    assert!(!exporter.is_running());
    assert_eq!(exporter.delivery().artifacts().len(), 1);

    let mut again = StaticView::from_json(VIEW_JSON).unwrap();
    assert!(exporter
        .export_report(&mut again, &prefs, at())
        .is_ok());
}
