//! Standalone document assembly.

use crate::collect::warning;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::i18n::{Locale, Text};
use crate::links::{exported_onclick, EXPORTED_NAV_FN};
use crate::snapshot::ReportSnapshot;
use crate::styles::{themed_css, COMPACT_CSS, EXPORT_LAYOUT_CSS, STRUCTURAL_CSS};
use crate::theme::Theme;
use chrono::Datelike;
use rsnap_common::{html_escape, section_id, Element, Module, GENERATOR_NAME};
use tracing::{debug, info};

/// Class of each exported content section.
pub const SECTION_CLASS: &str = "export-report-section";

/// Class marking the shown section and its navigation link.
pub const ACTIVE_CLASS: &str = "active";

/// Combines a snapshot, a theme and localized strings into one HTML document.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    config: ReportConfig,
}

impl DocumentAssembler {
    /// Create an assembler with configuration.
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Assemble the document.
    pub fn assemble(&self, snapshot: &ReportSnapshot, theme: &Theme, locale: Locale) -> Result<String> {
        let html = self.generate_html(snapshot, theme, locale)?;

        let output = if self.config.minify {
            // Inline handlers call the navigation function by name, so scripts stay as written.
            let cfg = minify_html::Cfg {
                minify_js: false,
                minify_css: true,
                do_not_minify_doctype: true,
                keep_closing_tags: true,
                keep_html_and_head_opening_tags: true,
                ..Default::default()
            };
            String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
        } else {
            html
        };

        info!(
            bytes = output.len(),
            modules = snapshot.modules.len(),
            minified = self.config.minify,
            "Document assembled"
        );
        Ok(output)
    }

    fn title(&self, locale: Locale) -> String {
        self.config
            .title
            .clone()
            .unwrap_or_else(|| locale.text(Text::MainTitle).to_string())
    }

    fn generate_html(&self, snapshot: &ReportSnapshot, theme: &Theme, locale: Locale) -> Result<String> {
        let overview_id = &self.config.overview_module_id;
        let initial = snapshot
            .initial_module(overview_id)
            .map(|m| m.id.clone())
            .unwrap_or_default();
        let generated = snapshot.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let title = self.title(locale);

        let compact_css = if theme.compact { COMPACT_CSS } else { "" };
        let body_class = if theme.compact { r#" class="compact-mode""# } else { "" };

        Ok(format!(
            r##"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="{generator} {version}">
    <meta name="robots" content="noindex, nofollow">
    <title>{title}</title>
    <link rel="stylesheet" href="{icon_font}">
    <style>
{structural_css}
{themed_css}
{compact_css}
{layout_css}
    </style>
</head>
<body{body_class}>
    <div class="container-fluid">
        <div class="row">
            {sidebar}
            <main class="col-md-9 ms-sm-auto col-lg-10 px-md-4 py-3">
                <div class="content-header d-flex justify-content-between align-items-center mb-4">
                    <div class="d-flex align-items-center">
                        <h1><i class="bi bi-clipboard-data me-2" style="color: var(--primary-color)"></i>{title}</h1>
                    </div>
                    <div class="timestamp text-muted">{generation_time} {generated}</div>
                </div>
{sections}
                <footer class="col-12 text-center text-muted small mt-5 py-3 border-top">
                    <p class="mb-0">{copyright}</p>
                </footer>
            </main>
        </div>
    </div>
    <script>
{nav_script}
    </script>
</body>
</html>"##,
            lang = locale.tag(),
            generator = GENERATOR_NAME,
            version = env!("CARGO_PKG_VERSION"),
            title = html_escape(&title),
            icon_font = html_escape(&self.config.icon_font_url),
            structural_css = STRUCTURAL_CSS,
            themed_css = themed_css(theme),
            compact_css = compact_css,
            layout_css = EXPORT_LAYOUT_CSS,
            body_class = body_class,
            sidebar = self.generate_sidebar(snapshot, locale, &initial, &generated),
            generation_time = html_escape(locale.text(Text::GenerationTime)),
            generated = generated,
            sections = self.generate_sections(snapshot, locale, &initial),
            copyright = html_escape(
                &locale.copyright(snapshot.generated_at.year(), &self.config.copyright_holder)
            ),
            nav_script = nav_script(&initial)?,
        ))
    }

    fn generate_sidebar(
        &self,
        snapshot: &ReportSnapshot,
        locale: Locale,
        initial: &str,
        generated: &str,
    ) -> String {
        let db_info = if snapshot.db_info_markup.trim().is_empty() {
            warning(locale.text(Text::DbInfoNotProvided), "orange")
        } else {
            snapshot.db_info_markup.clone()
        };

        let links: Vec<String> = snapshot
            .modules
            .iter()
            .map(|m| {
                Element::new("li")
                    .with_attr("class", "nav-item")
                    .with_child(nav_link(m, m.id == initial))
                    .to_html()
            })
            .collect();

        format!(
            r#"<nav class="col-md-3 col-lg-2 sidebar">
                <div class="d-flex align-items-center p-3 mb-3 border-bottom">
                    <i class="bi bi-database-check me-2 text-primary fs-4"></i>
                    <span class="fs-5 fw-bold">{sidebar_title}</span>
                </div>
                <div class="px-3 py-3">
                    <h6 class="sidebar-heading text-uppercase mb-2">{db_heading}</h6>
                    {db_info}
                </div>
                <div class="px-3">
                    <div class="d-flex align-items-center my-3">
                        <i class="bi bi-layers me-2 text-secondary"></i>
                        <h6 class="sidebar-heading mb-0 text-uppercase">{modules_heading}</h6>
                    </div>
                    <ul class="nav flex-column mb-4">
                        {links}
                    </ul>
                </div>
                <div class="mt-auto px-3 py-3 border-top">
                    <p class="small text-muted mb-0">{generated_at_label} {generated}</p>
                </div>
            </nav>"#,
            sidebar_title = html_escape(locale.text(Text::SidebarTitle)),
            db_heading = html_escape(locale.text(Text::DbInfoHeading)),
            db_info = db_info,
            modules_heading = html_escape(locale.text(Text::ModulesHeading)),
            links = links.join("\n                        "),
            generated_at_label = html_escape(locale.text(Text::ReportGeneratedAt)),
            generated = generated,
        )
    }

    /// One section per module: overview first, then navigation order.
    fn generate_sections(&self, snapshot: &ReportSnapshot, locale: Locale, initial: &str) -> String {
        let overview_id = &self.config.overview_module_id;
        let ordered = snapshot
            .modules
            .iter()
            .filter(|m| &m.id == overview_id)
            .chain(snapshot.modules.iter().filter(|m| &m.id != overview_id));

        let mut sections = Vec::with_capacity(snapshot.modules.len());
        for module in ordered {
            let class = if module.id == initial {
                format!("{SECTION_CLASS} {ACTIVE_CLASS}")
            } else {
                SECTION_CLASS.to_string()
            };
            let body = match snapshot.fragment(&module.id) {
                Some(fragment) => fragment.markup.clone(),
                None => {
                    debug!(module = %module.id, "rendering warning block for missing module");
                    missing_module_block(module, locale)
                }
            };
            sections.push(format!(
                "                <div class=\"{class}\" id=\"{id}\">\n{body}\n                </div>",
                id = html_escape(&section_id(&module.id)),
            ));
        }
        sections.join("\n")
    }
}

fn nav_link(module: &Module, active: bool) -> Element {
    let mut link = Element::new("a")
        .with_attr("class", "nav-link")
        .with_attr("href", format!("#{}", section_id(&module.id)))
        .with_attr("data-section-id", module.id.as_str())
        .with_attr("onclick", nav_onclick(&module.id))
        .with_child(Element::new("i").with_attr("class", format!("bi bi-{} me-2", module.icon)))
        .with_text(module.name.as_str());
    if active {
        link.add_class(ACTIVE_CLASS);
    }
    link
}

/// Literal ids read best in handlers; anything that could break out of a
/// single-quoted string goes through the data attribute instead.
fn nav_onclick(module_id: &str) -> String {
    let plain = module_id
        .chars()
        .all(|c| !matches!(c, '\'' | '"' | '\\' | '<' | '>') && !c.is_control());
    if plain {
        exported_onclick(module_id)
    } else {
        format!("{EXPORTED_NAV_FN}(this.getAttribute('data-section-id')); return false;")
    }
}

fn missing_module_block(module: &Module, locale: Locale) -> String {
    Element::new("div")
        .with_attr("class", "export-warning")
        .with_child(Element::new("h2").with_text(module.name.as_str()))
        .with_child(Element::new("p").with_text(locale.text(Text::ModuleContentMissing)))
        .to_html()
}

/// The embedded navigation script.
///
/// Both toggles use set semantics (`classList.toggle(cls, cond)`), so showing
/// the same module twice leaves the page as showing it once. Unknown ids are
/// ignored to keep exactly one module shown.
pub fn nav_script(initial_module: &str) -> Result<String> {
    let initial = serde_json::to_string(initial_module)?.replace("</", "<\\/");
    Ok(format!(
        r#"        function {nav_fn}(moduleId) {{
            if (!document.getElementById('section-' + moduleId)) {{
                return;
            }}
            document.querySelectorAll('.{section_class}').forEach(function (section) {{
                section.classList.toggle('{active}', section.id === 'section-' + moduleId);
            }});
            document.querySelectorAll('.sidebar .nav-link').forEach(function (link) {{
                link.classList.toggle('{active}', link.getAttribute('data-section-id') === moduleId);
            }});
        }}
        document.addEventListener('DOMContentLoaded', function () {{
            {nav_fn}({initial});
        }});"#,
        nav_fn = EXPORTED_NAV_FN,
        section_class = SECTION_CLASS,
        active = ACTIVE_CLASS,
        initial = initial,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::DbIdentity;
    use crate::theme::ThemeResolver;
    use indexmap::IndexMap;
    use rsnap_common::SectionFragment;

    fn snapshot(modules: &[(&str, &str)], collected: &[&str]) -> ReportSnapshot {
        let fragments: IndexMap<String, SectionFragment> = collected
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    SectionFragment::new(*id, format!("<p>content of {id}</p>")),
                )
            })
            .collect();
        ReportSnapshot {
            modules: modules
                .iter()
                .map(|(id, name)| Module::new(*id, *name, "hdd"))
                .collect(),
            db_info_markup: r#"<div class="db-info-container">ORCL</div>"#.to_string(),
            identity: DbIdentity::default(),
            fragments,
            generated_at: chrono::DateTime::parse_from_rfc3339("2025-01-01T12:00:00+08:00")
                .unwrap(),
        }
    }

    fn assemble(s: &ReportSnapshot, compact: bool, locale: Locale) -> String {
        let theme = ThemeResolver::new().resolve(None, compact);
        DocumentAssembler::default().assemble(s, &theme, locale).unwrap()
    }

    #[test]
    fn test_document_shell() {
        let s = snapshot(&[("all", "Overview")], &["all"]);
        let html = assemble(&s, false, Locale::En);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("Oracle Database Inspection Report"));
        assert!(html.contains("© 2025 GoodwaysIT. All rights reserved."));
        assert!(html.contains("2025-01-01 12:00:00"));
        assert!(html.contains(r#"<meta name="robots" content="noindex, nofollow">"#));
    }

    #[test]
    fn test_missing_module_gets_warning_block() {
        let s = snapshot(&[("all", "Overview"), ("perf", "Performance")], &["all"]);
        let html = assemble(&s, false, Locale::En);
        assert!(html.contains(r#"id="section-perf""#));
        assert!(html.contains("Content for this module could not be captured."));
    }

    #[test]
    fn test_empty_db_info_warns() {
        let mut s = snapshot(&[("all", "Overview")], &["all"]);
        s.db_info_markup.clear();
        let html = assemble(&s, false, Locale::Zh);
        assert!(html.contains("color:orange"));
        assert!(html.contains("数据库信息未在收集阶段正确提供。"));
    }

    #[test]
    fn test_compact_block_only_when_compact() {
        let s = snapshot(&[("all", "Overview")], &["all"]);
        assert!(assemble(&s, true, Locale::En).contains(r#"<body class="compact-mode">"#));
        assert!(assemble(&s, true, Locale::En).contains(".container-fluid{padding:.5rem!important}"));
        assert!(!assemble(&s, false, Locale::En).contains("compact-mode"));
    }

    #[test]
    fn test_title_override() {
        let s = snapshot(&[("all", "Overview")], &["all"]);
        let theme = ThemeResolver::new().resolve(None, false);
        let html = DocumentAssembler::new(ReportConfig::new().with_title("Q1 <audit>"))
            .assemble(&s, &theme, Locale::En)
            .unwrap();
        assert!(html.contains("<title>Q1 &lt;audit&gt;</title>"));
    }

    #[test]
    fn test_nav_onclick_forms() {
        assert_eq!(nav_onclick("storage"), "showExportedSection('storage'); return false;");
        assert!(nav_onclick("it's").contains("this.getAttribute('data-section-id')"));
    }

    #[test]
    fn test_nav_script_escapes_initial() {
        let script = nav_script("</script><b>").unwrap();
        assert!(!script.contains("</script>"));
        assert!(script.contains("classList.toggle('active', section.id === 'section-' + moduleId)"));
    }

    #[test]
    fn test_minify_shrinks_output() {
        let s = snapshot(&[("all", "Overview"), ("perf", "Performance")], &["all", "perf"]);
        let theme = ThemeResolver::new().resolve(None, false);
        let plain = DocumentAssembler::default().assemble(&s, &theme, Locale::En).unwrap();
        let small = DocumentAssembler::new(ReportConfig::new().with_minify(true))
            .assemble(&s, &theme, Locale::En)
            .unwrap();
        assert!(small.len() < plain.len());
        assert!(small.contains("showExportedSection"));
    }
}
