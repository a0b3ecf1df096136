//! Stylesheets inlined into exported documents.
//!
//! Exported documents cannot load the viewer's stylesheets, so the subset of
//! grid, card, table, badge and utility rules that report content relies on
//! is carried inline. Only the themed block depends on the resolved palette.

use crate::theme::Theme;
use std::fmt::Write as _;

/// Core grid, card, table, badge and utility rules.
pub const STRUCTURAL_CSS: &str = r#"
:root{--bs-blue:#0d6efd;--bs-red:#dc3545;--bs-orange:#fd7e14;--bs-yellow:#ffc107;--bs-green:#198754;--bs-cyan:#0dcaf0;--bs-white:#fff;--bs-gray:#6c757d;--bs-primary:#0d6efd;--bs-secondary:#6c757d;--bs-success:#198754;--bs-info:#0dcaf0;--bs-warning:#ffc107;--bs-danger:#dc3545;--bs-light:#f8f9fa;--bs-dark:#212529;--bs-font-sans-serif:system-ui,-apple-system,"Segoe UI",Roboto,"Helvetica Neue",Arial,"Noto Sans","Liberation Sans",sans-serif;--bs-font-monospace:SFMono-Regular,Menlo,Monaco,Consolas,"Liberation Mono","Courier New",monospace;--bs-body-font-family:var(--bs-font-sans-serif);--bs-body-font-size:1rem;--bs-body-font-weight:400;--bs-body-line-height:1.5;--bs-body-color:#212529;--bs-body-bg:#fff}
*,::after,::before{box-sizing:border-box}
body{margin:0;font-family:var(--bs-body-font-family);font-size:var(--bs-body-font-size);font-weight:var(--bs-body-font-weight);line-height:var(--bs-body-line-height);color:var(--bs-body-color);background-color:var(--bs-body-bg);-webkit-text-size-adjust:100%}
h1,h2,h3,h4,h5,h6{margin-top:0;margin-bottom:.5rem;font-weight:500;line-height:1.2}h1{font-size:calc(1.375rem + 1.5vw)}@media (min-width:1200px){h1{font-size:2.5rem}}h2{font-size:calc(1.325rem + .9vw)}@media (min-width:1200px){h2{font-size:2rem}}h3{font-size:calc(1.3rem + .6vw)}h4{font-size:calc(1.275rem + .3vw)}h5{font-size:1.25rem}h6{font-size:1rem}p{margin-top:0;margin-bottom:1rem}
.row{--bs-gutter-x:1.5rem;--bs-gutter-y:0;display:flex;flex-wrap:wrap;margin-top:calc(var(--bs-gutter-y) * -1);margin-right:calc(var(--bs-gutter-x) * -.5);margin-left:calc(var(--bs-gutter-x) * -.5)}.row>*{flex-shrink:0;width:100%;max-width:100%;padding-right:calc(var(--bs-gutter-x) * .5);padding-left:calc(var(--bs-gutter-x) * .5);margin-top:var(--bs-gutter-y)}
.card{position:relative;display:flex;flex-direction:column;min-width:0;word-wrap:break-word;background-color:#fff;background-clip:border-box;border:1px solid rgba(0,0,0,.125);border-radius:.25rem}.card-body{flex:1 1 auto;padding:1rem 1rem}.card-title{margin-bottom:.5rem}.card-header{padding:.5rem 1rem;margin-bottom:0;background-color:rgba(0,0,0,.03);border-bottom:1px solid rgba(0,0,0,.125)}
.table{width:100%;margin-bottom:1rem;color:#212529;vertical-align:top;border-color:#dee2e6}.table>:not(caption)>*>*{padding:.5rem .5rem;border-bottom-width:1px}.table>tbody{vertical-align:inherit}.table>thead{vertical-align:bottom}
.badge{display:inline-block;padding:.35em .65em;font-size:.75em;font-weight:700;line-height:1;color:#fff;text-align:center;white-space:nowrap;vertical-align:baseline;border-radius:.25rem}.badge:empty{display:none}.bg-primary{background-color:#0d6efd!important}.bg-secondary{background-color:#6c757d!important}.bg-success{background-color:#198754!important}.bg-danger{background-color:#dc3545!important}.bg-warning{background-color:#ffc107!important}.bg-info{background-color:#0dcaf0!important}
.text-primary{color:#0d6efd!important}.text-secondary{color:#6c757d!important}.text-success{color:#198754!important}.text-danger{color:#dc3545!important}.text-warning{color:#ffc107!important}.text-info{color:#0dcaf0!important}.text-muted{color:#6c757d!important}.text-center{text-align:center!important}.text-uppercase{text-transform:uppercase!important}.fw-bold{font-weight:700!important}.fw-medium{font-weight:500!important}.fs-4{font-size:1.5rem!important}.fs-5{font-size:1.25rem!important}.fs-6{font-size:1rem!important}.small{font-size:.875em}
.d-flex{display:flex!important}.align-items-center{align-items:center!important}.justify-content-between{justify-content:space-between!important}.mb-0{margin-bottom:0!important}.mb-2{margin-bottom:.5rem!important}.mb-3{margin-bottom:1rem!important}.mb-4{margin-bottom:1.5rem!important}.me-2{margin-right:.5rem!important}.mt-3{margin-top:1rem!important}.mt-4{margin-top:1.5rem!important}.mt-5{margin-top:3rem!important}.mt-auto{margin-top:auto!important}.my-3{margin-top:1rem!important;margin-bottom:1rem!important}.p-3{padding:1rem!important}.px-3{padding-right:1rem!important;padding-left:1rem!important}.py-3{padding-top:1rem!important;padding-bottom:1rem!important}.pt-3{padding-top:1rem!important}.border-top{border-top:1px solid #dee2e6!important}.border-bottom{border-bottom:1px solid #dee2e6!important}
"#;

/// Additive rules applied when compact mode is on.
pub const COMPACT_CSS: &str = r#"
.card-body{padding:.75rem!important}
.container-fluid{padding:.5rem!important}
.table td,.table th{padding:.4rem!important}
.mb-3{margin-bottom:.5rem!important}
.mb-4{margin-bottom:1rem!important}
.mt-3,.mt-4{margin-top:.5rem!important}
.pt-3,.py-3,.p-3{padding-top:.5rem!important}
.pb-3,.py-3,.p-3{padding-bottom:.5rem!important}
"#;

/// Layout of the exported page: sidebar, main column, section switching.
pub const EXPORT_LAYOUT_CSS: &str = r#"
.container-fluid{width:100%;padding-right:15px;padding-left:15px;margin-right:auto;margin-left:auto}
.col-md-3{position:relative;width:25%;padding-right:15px;padding-left:15px}
.col-lg-2{position:relative;width:16.666667%;padding-right:15px;padding-left:15px}
.col-md-9{position:relative;width:75%;padding-right:15px;padding-left:15px}
.col-lg-10{position:relative;width:83.333333%;padding-right:15px;padding-left:15px}
.ms-sm-auto{margin-left:auto!important}
.sidebar{position:fixed;top:0;bottom:0;left:0;z-index:100;padding:0;box-shadow:inset -1px 0 0 rgba(0,0,0,.1);overflow-y:auto;background-color:var(--sidebar-bg)}
.sidebar .nav-link{font-weight:500;color:var(--text-color);padding:.5rem 1rem;border-left:3px solid transparent;text-decoration:none;display:block}
.sidebar .nav-link:hover{color:var(--primary-color);background-color:rgba(0,0,0,.05)}
.sidebar .nav-link.active{color:var(--primary-color);background-color:rgba(var(--primary-color-rgb),.1);border-left-color:var(--primary-color)}
.sidebar .nav-link .bi{margin-right:4px;color:#999}
.sidebar .nav-link.active .bi{color:var(--primary-color)}
@media (max-width:767.98px){.sidebar{position:static;height:auto}}
.nav{display:flex;flex-wrap:wrap;padding-left:0;margin-bottom:0;list-style:none}
.nav-item{width:100%}
.flex-column{flex-direction:column!important}
.bi{display:inline-block;vertical-align:-.125em}
.export-report-section{display:none}
.export-report-section.active{display:block}
.export-report-section .row{display:flex;flex-wrap:wrap;margin-right:-15px;margin-left:-15px}
.export-report-section .row>[class*="col-"]{padding-right:15px;padding-left:15px;margin-bottom:1rem}
.export-report-section .row>.col-lg-4{flex:0 0 33.333333%;max-width:33.333333%}
@media (max-width:991.98px) and (min-width:768px){.export-report-section .row>.col-md-6{flex:0 0 50%;max-width:50%}}
@media (max-width:767.98px){.export-report-section .row>[class*="col-"]{flex:0 0 100%;max-width:100%}}
.export-report-section .card.main-info-card{position:relative}
.export-report-section .main-info-card .stretched-link::after{position:absolute;top:0;right:0;bottom:0;left:0;z-index:1;content:"";background-color:rgba(0,0,0,0)}
.export-report-section table{width:100%;margin-bottom:1rem;color:var(--text-color);border-collapse:collapse;border:1px solid var(--border-color)}
.export-report-section table th,.export-report-section table td{padding:.75rem;vertical-align:top;border-top:1px solid var(--border-color);border-right:1px solid var(--border-color)}
.export-report-section table th:first-child,.export-report-section table td:first-child{border-left:1px solid var(--border-color)}
.export-report-section table thead th{vertical-align:bottom;border-bottom:2px solid var(--border-color);background-color:var(--header-bg);font-weight:bold;text-align:left}
.export-report-section table tbody tr:nth-of-type(odd){background-color:rgba(0,0,0,.03)}
.export-report-section table tbody tr:hover{background-color:var(--table-hover-bg)}
.export-report-section .chart-placeholder{color:var(--text-secondary);font-style:italic}
.export-warning{color:#b00020;font-weight:bold}
@media print{.sidebar{display:none}.col-md-9,.col-lg-10{width:100%}.export-report-section{display:block!important;break-inside:avoid}}
"#;

/// Palette-dependent rules with every variable resolved to its literal value.
pub fn themed_css(theme: &Theme) -> String {
    let primary = theme.var_or_default("--primary-blue");
    let mut css = String::from(":root{");
    for (name, value) in theme.custom_properties() {
        let _ = write!(css, "{name}:{value};");
    }
    let aliases = [
        ("--primary-color", primary.clone()),
        ("--primary-color-rgb", hex_to_rgb_triplet(&primary).unwrap_or_else(|| "26, 115, 232".to_string())),
        ("--bg-color", theme.var_or_default("body-bg")),
        ("--card-bg", theme.var_or_default("chart-bg")),
        ("--text-color", theme.var_or_default("--text-primary")),
        ("--header-bg", theme.var_or_default("table-header-bg")),
        ("--sidebar-bg", theme.var_or_default("sidebar-bg")),
        ("--table-hover-bg", theme.var_or_default("table-hover-bg")),
    ];
    for (name, value) in aliases {
        let _ = write!(css, "{name}:{value};");
    }
    css.push_str("}\n");

    css.push_str(
        "body{background-color:var(--bg-color);color:var(--text-color);font-family:'Segoe UI',system-ui,-apple-system,sans-serif;font-size:14px;line-height:1.5}\n\
         .content-header h1{color:var(--primary-color);font-size:24px}\n\
         .content-header .timestamp{color:var(--text-secondary);font-size:14px}\n\
         .sidebar-heading{color:var(--text-secondary);font-size:.75rem}\n\
         .card{background-color:var(--card-bg);border:1px solid var(--border-color);border-radius:4px;margin-bottom:15px;box-shadow:var(--card-shadow)}\n\
         .card-header{padding:.75rem 1.25rem;background-color:var(--header-bg);border-bottom:1px solid var(--border-color)}\n\
         .card-body{padding:1.25rem}\n\
         .table{color:var(--text-color);border-collapse:collapse}\n\
         .table th,.table td{padding:.75rem;vertical-align:top;border-top:1px solid var(--border-color)}\n\
         .table thead th{vertical-align:bottom;border-bottom:2px solid var(--border-color);background-color:var(--header-bg)}\n\
         .border-top,.border-bottom{border-color:var(--border-color)!important}\n",
    );
    css
}

/// `#rrggbb` to `r, g, b`. Other notations are not converted.
pub fn hex_to_rgb_triplet(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(format!("{}, {}, {}", channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeResolver;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb_triplet("#1a73e8").as_deref(), Some("26, 115, 232"));
        assert_eq!(hex_to_rgb_triplet("#FFFFFF").as_deref(), Some("255, 255, 255"));
        assert_eq!(hex_to_rgb_triplet("#fff"), None);
        assert_eq!(hex_to_rgb_triplet("blue"), None);
        assert_eq!(hex_to_rgb_triplet("#zz0000"), None);
    }

    #[test]
    fn test_themed_css_resolves_values() {
        let theme = ThemeResolver::new().resolve(Some("dark"), false);
        let css = themed_css(&theme);
        assert!(css.contains("--primary-blue:#8ab4f8;"));
        assert!(css.contains("--primary-color:#8ab4f8;"));
        assert!(css.contains("--primary-color-rgb:138, 180, 248;"));
        assert!(css.contains("--bg-color:#202124;"));
        assert!(css.contains("--sidebar-bg:#292a2d;"));
    }

    #[test]
    fn test_static_blocks_balanced() {
        for block in [STRUCTURAL_CSS, COMPACT_CSS, EXPORT_LAYOUT_CSS] {
            assert_eq!(block.matches('{').count(), block.matches('}').count());
        }
    }
}
