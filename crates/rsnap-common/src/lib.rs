//! Report snapshot shared types.
//!
//! This crate provides the values every other crate passes around:
//! - The markup value tree used for live regions and exported fragments
//! - Modules and section fragments
//! - Export identifiers for log correlation

pub mod id;
pub mod markup;
pub mod module;

pub use id::ExportId;
pub use markup::{html_escape, Element, Node, Rewrite};
pub use module::{
    section_id, Module, SectionFragment, DEFAULT_MODULE_ICON, OVERVIEW_MODULE_ID, SECTION_PREFIX,
};

/// Name written into the generator meta tag of exported documents.
pub const GENERATOR_NAME: &str = "report-snapshot";
