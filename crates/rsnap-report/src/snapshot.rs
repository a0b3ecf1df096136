//! Export aggregate and its output.

use crate::namer::DbIdentity;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use rsnap_common::{Module, SectionFragment};
use serde::Serialize;
use std::path::PathBuf;

/// Everything captured from the view for one export.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    /// Modules in navigation order.
    pub modules: Vec<Module>,
    /// Outer markup of the database card, or a warning in its place.
    pub db_info_markup: String,
    /// Database identity read from the card.
    pub identity: DbIdentity,
    /// Collected fragments: overview first, then module order.
    pub fragments: IndexMap<String, SectionFragment>,
    /// When the export was taken.
    pub generated_at: DateTime<FixedOffset>,
}

impl ReportSnapshot {
    /// Fragment for a module, if it was collected.
    pub fn fragment(&self, module_id: &str) -> Option<&SectionFragment> {
        self.fragments.get(module_id)
    }

    /// Modules listed in navigation but without a fragment.
    pub fn missing_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules
            .iter()
            .filter(|m| !self.fragments.contains_key(&m.id))
    }

    /// Module shown when the document opens: the overview if listed, else the first.
    pub fn initial_module(&self, overview_module_id: &str) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.id == overview_module_id)
            .or_else(|| self.modules.first())
    }
}

/// A finished document ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub document: String,
}

impl ExportArtifact {
    /// Document size in bytes.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// Summary of a completed export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    /// Correlates the export's log lines.
    pub export_id: String,
    /// Where the delivery put the artifact.
    pub path: PathBuf,
    /// Name the artifact was generated with.
    pub file_name: String,
    /// Document size in bytes.
    pub bytes: usize,
    /// Number of sections in the document.
    pub modules: usize,
    /// Modules rendered as a warning block instead of content.
    pub missing_modules: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ids: &[&str], collected: &[&str]) -> ReportSnapshot {
        ReportSnapshot {
            modules: ids.iter().map(|id| Module::new(*id, *id, "x")).collect(),
            db_info_markup: String::new(),
            identity: DbIdentity::default(),
            fragments: collected
                .iter()
                .map(|id| (id.to_string(), SectionFragment::new(*id, "<p></p>")))
                .collect(),
            generated_at: chrono::Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_initial_module_prefers_overview() {
        let s = snapshot(&["a", "all", "b"], &[]);
        assert_eq!(s.initial_module("all").map(|m| m.id.as_str()), Some("all"));
        let s = snapshot(&["a", "b"], &[]);
        assert_eq!(s.initial_module("all").map(|m| m.id.as_str()), Some("a"));
        let s = snapshot(&[], &[]);
        assert!(s.initial_module("all").is_none());
    }

    #[test]
    fn test_missing_modules() {
        let s = snapshot(&["a", "b", "c"], &["b"]);
        let missing: Vec<&str> = s.missing_modules().map(|m| m.id.as_str()).collect();
        assert_eq!(missing, ["a", "c"]);
        assert!(s.fragment("b").is_some());
    }
}
