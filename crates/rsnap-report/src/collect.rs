//! Module discovery and content collection.

use crate::i18n::{Locale, Text};
use crate::links::rewrite_overview_links;
use crate::namer::DB_INFO_CONTAINER_CLASS;
use crate::rasterize::{AssetRasterizer, ChartRuntime};
use crate::view::{LiveView, VisibilityGuard};
use indexmap::IndexMap;
use rsnap_common::{
    section_id, Element, Module, Rewrite, SectionFragment, DEFAULT_MODULE_ICON,
    OVERVIEW_MODULE_ID,
};
use tracing::{debug, warn};

/// Class of navigation entries in the sidebar.
pub const NAV_LINK_CLASS: &str = "nav-link";

/// Attribute naming the module a navigation entry shows.
pub const SECTION_ID_ATTR: &str = "data-section-id";

/// Scan the sidebar for navigable modules, in document order.
///
/// Entries without a non-empty `data-section-id` are ignored, and repeated
/// ids keep their first entry.
pub fn discover_modules<V: LiveView + ?Sized>(view: &V) -> Vec<Module> {
    let Some(sidebar) = view.sidebar() else {
        warn!("view has no sidebar, no modules to export");
        return Vec::new();
    };

    let mut modules: Vec<Module> = Vec::new();
    let links = sidebar.find_all(|e| {
        e.has_class(NAV_LINK_CLASS) && e.attr(SECTION_ID_ATTR).is_some_and(|id| !id.is_empty())
    });
    for link in links {
        let Some(id) = link.attr(SECTION_ID_ATTR) else {
            continue;
        };
        if modules.iter().any(|m| m.id == id) {
            warn!(module = id, "duplicate navigation entry ignored");
            continue;
        }
        modules.push(Module::new(id, link.text_content().trim(), icon_of(link)));
    }
    debug!(count = modules.len(), "modules discovered");
    modules
}

/// Suffix of the first `bi-*` class on the first `.bi` icon of a link.
fn icon_of(link: &Element) -> String {
    link.find(|e| e.has_class("bi"))
        .and_then(|icon| {
            icon.classes()
                .find_map(|c| c.strip_prefix("bi-"))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_MODULE_ICON.to_string())
}

/// The database identity card, or why it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbInfo {
    Found(Element),
    SidebarMissing,
    ContainerMissing,
}

impl DbInfo {
    /// Locate the card inside the view's sidebar.
    pub fn from_view<V: LiveView + ?Sized>(view: &V) -> Self {
        let Some(sidebar) = view.sidebar() else {
            warn!("sidebar not found, database info unavailable");
            return DbInfo::SidebarMissing;
        };
        match sidebar.find(|e| e.has_class(DB_INFO_CONTAINER_CLASS)) {
            Some(card) => DbInfo::Found(card.clone()),
            None => {
                warn!("database info container not found in sidebar");
                DbInfo::ContainerMissing
            }
        }
    }

    /// The card element, when found.
    pub fn element(&self) -> Option<&Element> {
        match self {
            DbInfo::Found(el) => Some(el),
            _ => None,
        }
    }

    /// Outer markup of the card, or a localized warning.
    pub fn to_markup(&self, locale: Locale) -> String {
        match self {
            DbInfo::Found(el) => el.to_html(),
            DbInfo::SidebarMissing => warning(locale.text(Text::SidebarNotFound), "red"),
            DbInfo::ContainerMissing => {
                warning(locale.text(Text::DbInfoContainerNotFound), "red")
            }
        }
    }
}

/// Inline warning paragraph.
pub(crate) fn warning(text: &str, color: &str) -> String {
    Element::new("p")
        .with_attr("style", format!("color:{color}; font-weight:bold;"))
        .with_text(text)
        .to_html()
}

/// Extracts one serialized fragment per module.
#[derive(Debug, Clone)]
pub struct ContentCollector<R> {
    rasterizer: AssetRasterizer<R>,
    overview_module_id: String,
}

impl<R: ChartRuntime> ContentCollector<R> {
    /// Create a collector.
    pub fn new(rasterizer: AssetRasterizer<R>) -> Self {
        Self {
            rasterizer,
            overview_module_id: OVERVIEW_MODULE_ID.to_string(),
        }
    }

    /// Use a different id for the overview module.
    pub fn with_overview_module(mut self, id: impl Into<String>) -> Self {
        self.overview_module_id = id.into();
        self
    }

    /// Collect fragments for `modules`.
    ///
    /// The overview comes first when listed, the rest follow module order.
    /// Modules whose region is missing get no fragment. Every region is
    /// back in its original visibility when this returns.
    pub fn collect<V: LiveView + ?Sized>(
        &self,
        view: &mut V,
        modules: &[Module],
    ) -> IndexMap<String, SectionFragment> {
        let mut fragments = IndexMap::with_capacity(modules.len());
        let ordered = modules
            .iter()
            .filter(|m| m.id == self.overview_module_id)
            .chain(modules.iter().filter(|m| m.id != self.overview_module_id));

        for module in ordered {
            match self.collect_one(view, module) {
                Some(fragment) => {
                    fragments.insert(module.id.clone(), fragment);
                }
                None => warn!(module = %module.id, "region not found, module skipped"),
            }
        }
        fragments
    }

    /// Collect a single module's fragment.
    pub fn collect_one<V: LiveView + ?Sized>(
        &self,
        view: &mut V,
        module: &Module,
    ) -> Option<SectionFragment> {
        let region_id = section_id(&module.id);
        let guard = VisibilityGuard::show(view, &region_id)?;
        let region = guard.region()?;

        let stripped = strip_scripts(region);
        let mut content = self.rasterizer.rasterize(&stripped, &region_id);
        if module.id == self.overview_module_id {
            let (rewritten, stats) = rewrite_overview_links(&content);
            debug!(rewritten = stats.rewritten, skipped = stats.skipped, "overview links");
            content = rewritten;
        }
        drop(guard);

        let markup = content.inner_html();
        debug!(module = %module.id, bytes = markup.len(), "module collected");
        Some(SectionFragment::new(module.id.clone(), markup))
    }
}

/// Copy of `region` without any `<script>` element.
fn strip_scripts(region: &Element) -> Element {
    region.rewrite(&mut |el| {
        if el.tag == "script" {
            Rewrite::Remove
        } else {
            Rewrite::Keep
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterize::NoChartRuntime;
    use crate::view::{StaticView, Visibility};

    fn nav_link(id: &str, label: &str, icon: Option<&str>) -> Element {
        let mut a = Element::new("a")
            .with_attr("class", "nav-link")
            .with_attr("data-section-id", id);
        if let Some(icon) = icon {
            a = a.with_child(Element::new("i").with_attr("class", format!("bi bi-{icon} me-2")));
        }
        a.with_text(format!("\n   {label}\n "))
    }

    fn sidebar() -> Element {
        Element::new("nav")
            .with_attr("class", "sidebar")
            .with_child(
                Element::new("div")
                    .with_attr("class", "db-info-container")
                    .with_child(Element::new("div").with_attr("class", "fw-medium").with_text("ORCL")),
            )
            .with_child(
                Element::new("ul")
                    .with_child(nav_link("all", "Overview", Some("grid")))
                    .with_child(nav_link("storage", "Storage", Some("hdd")))
                    .with_child(nav_link("security", "Security", None))
                    .with_child(Element::new("a").with_attr("class", "nav-link").with_text("Help")),
            )
    }

    fn region(id: &str) -> Element {
        Element::new("div")
            .with_attr("id", section_id(id))
            .with_attr("class", "report-section")
            .with_child(Element::new("h2").with_text(id))
            .with_child(Element::new("script").with_text("initCharts()"))
            .with_child(
                Element::new("canvas")
                    .with_attr("id", format!("{id}-chart"))
                    .with_attr("class", "chart-canvas"),
            )
    }

    fn collector() -> ContentCollector<NoChartRuntime> {
        ContentCollector::new(AssetRasterizer::new(NoChartRuntime, "chart-canvas"))
    }

    #[test]
    fn test_discover_modules() {
        let view = StaticView::new().with_sidebar(sidebar());
        let modules = discover_modules(&view);
        let ids: Vec<&str> = modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["all", "storage", "security"]);
        assert_eq!(modules[1].name, "Storage");
        assert_eq!(modules[1].icon, "hdd");
        assert_eq!(modules[2].icon, DEFAULT_MODULE_ICON);
    }

    #[test]
    fn test_discover_without_sidebar() {
        assert!(discover_modules(&StaticView::new()).is_empty());
    }

    #[test]
    fn test_discover_dedupes() {
        let sb = Element::new("nav")
            .with_child(nav_link("a", "First", None))
            .with_child(nav_link("a", "Second", None));
        let modules = discover_modules(&StaticView::new().with_sidebar(sb));
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "First");
    }

    #[test]
    fn test_db_info_states() {
        let found = DbInfo::from_view(&StaticView::new().with_sidebar(sidebar()));
        assert!(found.to_markup(Locale::En).starts_with(r#"<div class="db-info-container">"#));

        let missing = DbInfo::from_view(&StaticView::new());
        assert_eq!(missing, DbInfo::SidebarMissing);
        assert!(missing.to_markup(Locale::En).contains("color:red"));

        let no_card = DbInfo::from_view(&StaticView::new().with_sidebar(Element::new("nav")));
        assert_eq!(no_card, DbInfo::ContainerMissing);
        assert!(no_card.to_markup(Locale::Zh).contains("数据库信息容器"));
    }

    #[test]
    fn test_collect_orders_overview_first() {
        let mut view = StaticView::new()
            .with_region(region("storage"), false)
            .with_region(region("all"), true);
        let modules = vec![
            Module::new("storage", "Storage", "hdd"),
            Module::new("all", "Overview", "grid"),
        ];
        let fragments = collector().collect(&mut view, &modules);
        let keys: Vec<&str> = fragments.keys().map(String::as_str).collect();
        assert_eq!(keys, ["all", "storage"]);
    }

    #[test]
    fn test_collect_strips_scripts_and_canvases() {
        let mut view = StaticView::new().with_region(region("storage"), false);
        let modules = vec![Module::new("storage", "Storage", "hdd")];
        let fragments = collector().collect(&mut view, &modules);
        let markup = &fragments["storage"].markup;
        assert!(!markup.contains("<script"));
        assert!(!markup.contains("<canvas"));
        assert!(markup.contains("<h2>storage</h2>"));
        assert!(!markup.contains("report-section"), "inner markup only");
    }

    #[test]
    fn test_collect_restores_visibility_and_skips_missing() {
        let mut view = StaticView::new()
            .with_region(region("storage"), false)
            .with_region(region("all"), true);
        let modules = vec![
            Module::new("all", "Overview", "grid"),
            Module::new("ghost", "Ghost", "x"),
            Module::new("storage", "Storage", "hdd"),
        ];
        let fragments = collector().collect(&mut view, &modules);
        assert_eq!(fragments.len(), 2);
        assert!(!fragments.contains_key("ghost"));
        assert_eq!(view.visibility("section-storage"), Some(Visibility::Hidden));
        assert_eq!(view.visibility("section-all"), Some(Visibility::Visible));
    }

    #[test]
    fn test_custom_overview_module() {
        let mut view = StaticView::new()
            .with_region(region("a"), false)
            .with_region(region("home"), false);
        let modules = vec![Module::new("a", "A", "x"), Module::new("home", "Home", "y")];
        let fragments = collector()
            .with_overview_module("home")
            .collect(&mut view, &modules);
        assert_eq!(fragments.keys().next().map(String::as_str), Some("home"));
    }
}
