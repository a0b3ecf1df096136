//! Report modules and their captured fragments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the synthetic overview module.
pub const OVERVIEW_MODULE_ID: &str = "all";

/// Icon used when a navigation entry carries none.
pub const DEFAULT_MODULE_ICON: &str = "file-earmark-text";

/// Prefix shared by live regions, exported sections and sidebar targets.
pub const SECTION_PREFIX: &str = "section-";

/// Element id of the section holding a module's content.
pub fn section_id(module_id: &str) -> String {
    format!("{}{}", SECTION_PREFIX, module_id)
}

/// One navigable unit of report content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Stable identifier (unique within a report).
    pub id: String,
    /// Display label.
    pub name: String,
    /// Icon key (suffix of a `bi-*` icon class).
    pub icon: String,
}

impl Module {
    /// Create a module.
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        }
    }

    /// Element id of this module's section.
    pub fn section_id(&self) -> String {
        section_id(&self.id)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Serialized, rasterized content captured for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFragment {
    /// Module this fragment belongs to.
    pub module_id: String,
    /// Inner markup of the module's section.
    pub markup: String,
}

impl SectionFragment {
    /// Create a fragment.
    pub fn new(module_id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            markup: markup.into(),
        }
    }
}
