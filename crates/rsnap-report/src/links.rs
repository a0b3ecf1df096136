//! Overview jump links.
//!
//! Cards on the overview call the live view's `showSection(id, navLink)`
//! handler, which does not exist in an exported document. Links matching that
//! call shape are pointed at the exported navigation function instead.

use rsnap_common::{section_id, Element, Rewrite};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Class of the overview cards whose links are rewritten.
pub const MAIN_INFO_CARD_CLASS: &str = "main-info-card";

/// Name of the navigation function in exported documents.
pub const EXPORTED_NAV_FN: &str = "showExportedSection";

const SHOW_SECTION_PATTERN: &str = r#"showSection\s*\(\s*['"]([^'"]+)['"]\s*,\s*document\.querySelector\(['"]\.nav-link\[data-section-id=['"]([^'"]+)['"]\]['"]\)\s*\)"#;

fn show_section_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SHOW_SECTION_PATTERN).ok()).as_ref()
}

/// Targets parsed from a live `showSection` handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTarget {
    /// Module to show.
    pub module_id: String,
    /// Module whose nav link the handler activates.
    pub nav_module_id: String,
}

/// Parse an `onclick` value of the form
/// `showSection('id', document.querySelector('.nav-link[data-section-id="id"]'))`.
pub fn parse_show_section(onclick: &str) -> Option<JumpTarget> {
    let caps = show_section_regex()?.captures(onclick)?;
    Some(JumpTarget {
        module_id: caps.get(1)?.as_str().to_string(),
        nav_module_id: caps.get(2)?.as_str().to_string(),
    })
}

/// `onclick` value calling the exported navigation function.
pub fn exported_onclick(module_id: &str) -> String {
    format!("{EXPORTED_NAV_FN}('{module_id}'); return false;")
}

/// Outcome of one rewrite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub rewritten: usize,
    pub skipped: usize,
}

/// Rewrite jump links inside overview cards, returning a new tree.
///
/// Links outside a `main-info-card` are never touched. Links whose handler
/// does not match are left as they are.
pub fn rewrite_overview_links(fragment: &Element) -> (Element, LinkStats) {
    let mut stats = LinkStats::default();
    let out = fragment.rewrite(&mut |el| {
        if el.has_class(MAIN_INFO_CARD_CLASS) {
            Rewrite::Replace(rewrite_card(el, &mut stats).into())
        } else {
            Rewrite::Keep
        }
    });
    (out, stats)
}

fn rewrite_card(card: &Element, stats: &mut LinkStats) -> Element {
    card.rewrite(&mut |el| {
        if el.tag != "a" {
            return Rewrite::Keep;
        }
        let Some(onclick) = el.attr("onclick").filter(|v| v.contains("showSection")) else {
            return Rewrite::Keep;
        };
        match parse_show_section(onclick).filter(|t| is_safe_module_id(&t.module_id)) {
            Some(target) => {
                stats.rewritten += 1;
                let mut link = el.clone();
                link.set_attr("onclick", exported_onclick(&target.module_id));
                link.set_attr("href", format!("#{}", section_id(&target.module_id)));
                Rewrite::Replace(link.into())
            }
            None => {
                stats.skipped += 1;
                debug!(onclick, "overview link not rewritten");
                Rewrite::Keep
            }
        }
    })
}

/// Ids are spliced into a single-quoted script string.
fn is_safe_module_id(id: &str) -> bool {
    !id.chars().any(|c| c == '\\' || c.is_control())
}
