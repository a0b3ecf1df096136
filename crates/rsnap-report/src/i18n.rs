//! Localized strings of exported documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported document locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Zh,
}

/// Keys of the string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Text {
    SidebarTitle,
    DbInfoHeading,
    ModulesHeading,
    ReportGeneratedAt,
    GenerationTime,
    MainTitle,
    SidebarNotFound,
    DbInfoContainerNotFound,
    DbInfoNotProvided,
    ModuleContentMissing,
}

impl Locale {
    /// Pick a locale from a host language tag by its primary subtag.
    ///
    /// `en`, `en-US` and `EN_gb` select English; anything else, including no
    /// tag at all, selects Chinese.
    pub fn from_lang(lang: Option<&str>) -> Self {
        let primary = lang
            .and_then(|l| l.trim().split(['-', '_']).next())
            .unwrap_or("");
        if primary.eq_ignore_ascii_case("en") {
            Locale::En
        } else {
            Locale::Zh
        }
    }

    /// Value for the document's `lang` attribute.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    /// Look up a string.
    pub fn text(&self, key: Text) -> &'static str {
        match self {
            Locale::En => match key {
                Text::SidebarTitle => "Oracle Inspection Report",
                Text::DbInfoHeading => "Database Information",
                Text::ModulesHeading => "Inspection Modules",
                Text::ReportGeneratedAt => "Report Generated:",
                Text::GenerationTime => "Generated:",
                Text::MainTitle => "Oracle Database Inspection Report",
                Text::SidebarNotFound => "Sidebar element (.sidebar) not found on page.",
                Text::DbInfoContainerNotFound => {
                    "Database info container (.db-info-container) not found within sidebar (.sidebar)."
                }
                Text::DbInfoNotProvided => {
                    "Database information was not correctly provided during collection."
                }
                Text::ModuleContentMissing => "Content for this module could not be captured.",
            },
            Locale::Zh => match key {
                Text::SidebarTitle => "Oracle 数据库巡检报告",
                Text::DbInfoHeading => "数据库信息",
                Text::ModulesHeading => "巡检模块",
                Text::ReportGeneratedAt => "报告生成于:",
                Text::GenerationTime => "生成时间:",
                Text::MainTitle => "Oracle 数据库巡检报告",
                Text::SidebarNotFound => "侧边栏元素 (.sidebar) 未在页面上找到。",
                Text::DbInfoContainerNotFound => {
                    "数据库信息容器 (.db-info-container) 未在侧边栏 (.sidebar) 内找到。"
                }
                Text::DbInfoNotProvided => "数据库信息未在收集阶段正确提供。",
                Text::ModuleContentMissing => "未能捕获该模块的内容。",
            },
        }
    }

    /// Footer copyright line.
    pub fn copyright(&self, year: i32, holder: &str) -> String {
        match self {
            Locale::En => format!("© {year} {holder}. All rights reserved."),
            Locale::Zh => format!("© {year} {holder}. 保留所有权利。"),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lang_primary_subtag() {
        assert_eq!(Locale::from_lang(Some("en")), Locale::En);
        assert_eq!(Locale::from_lang(Some("en-US")), Locale::En);
        assert_eq!(Locale::from_lang(Some("EN_gb")), Locale::En);
        assert_eq!(Locale::from_lang(Some("zh-CN")), Locale::Zh);
    }

    #[test]
    fn test_from_lang_fallback() {
        assert_eq!(Locale::from_lang(None), Locale::Zh);
        assert_eq!(Locale::from_lang(Some("")), Locale::Zh);
        assert_eq!(Locale::from_lang(Some("fr")), Locale::Zh);
        assert_eq!(Locale::from_lang(Some("eng")), Locale::Zh);
    }

    #[test]
    fn test_copyright() {
        assert_eq!(
            Locale::En.copyright(2025, "GoodwaysIT"),
            "© 2025 GoodwaysIT. All rights reserved."
        );
        assert!(Locale::Zh.copyright(2025, "GoodwaysIT").ends_with("保留所有权利。"));
    }

    #[test]
    fn test_every_key_localized() {
        let keys = [
            Text::SidebarTitle,
            Text::DbInfoHeading,
            Text::ModulesHeading,
            Text::ReportGeneratedAt,
            Text::GenerationTime,
            Text::MainTitle,
            Text::SidebarNotFound,
            Text::DbInfoContainerNotFound,
            Text::DbInfoNotProvided,
            Text::ModuleContentMissing,
        ];
        for key in keys {
            assert!(!Locale::En.text(key).is_empty());
            assert_ne!(Locale::En.text(key), Locale::Zh.text(key), "{key:?}");
        }
    }
}
