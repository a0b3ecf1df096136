//! Artifact file naming.
//!
//! Names follow `<db_name>_<db_connection>_<YYYYMMDD_HHMM>.html`. Both identity
//! fields come from page content, so the result is sanitized for every common
//! filesystem.

use chrono::{DateTime, TimeZone};
use rsnap_common::{Element, Node};
use serde::Serialize;
use std::fmt::Display;

/// Database name used when the identity card has none.
pub const DEFAULT_DB_NAME: &str = "数据库巡检";

/// Connection used when the identity card has none.
pub const DEFAULT_DB_CONNECTION: &str = "localhost";

/// Class of the database identity card in the sidebar.
pub const DB_INFO_CONTAINER_CLASS: &str = "db-info-container";

/// Longest file name, in bytes, that common filesystems accept.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Characters no common filesystem accepts in a name.
const RESERVED: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Database identity shown on the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbIdentity {
    pub db_name: String,
    pub connection: String,
}

impl Default for DbIdentity {
    fn default() -> Self {
        Self {
            db_name: DEFAULT_DB_NAME.to_string(),
            connection: DEFAULT_DB_CONNECTION.to_string(),
        }
    }
}

impl DbIdentity {
    /// File name for an export taken at `at`.
    pub fn file_name<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        name(&self.db_name, &self.connection, &timestamp(at))
    }
}

/// Read the database identity from the identity card.
///
/// The name is the first whitespace token of the first `.fw-medium` element.
/// The connection is the text of the first `.small` element that is the
/// second child of its parent, with icon (`<i>`) elements skipped.
pub fn extract_identity(db_info: Option<&Element>) -> DbIdentity {
    let mut identity = DbIdentity::default();
    let Some(card) = db_info else {
        return identity;
    };

    if let Some(name) = card
        .find(|e| e.has_class("fw-medium"))
        .and_then(|e| e.text_content().split_whitespace().next().map(str::to_string))
    {
        identity.db_name = name;
    }

    if let Some(conn) = find_second_child_small(card)
        .map(text_without_icons)
        .filter(|t| !t.is_empty())
    {
        identity.connection = conn;
    }

    identity
}

fn find_second_child_small(el: &Element) -> Option<&Element> {
    for (idx, child) in el.child_elements().enumerate() {
        if idx == 1 && child.has_class("small") {
            return Some(child);
        }
        if let Some(found) = find_second_child_small(child) {
            return Some(found);
        }
    }
    None
}

fn text_without_icons(el: &Element) -> String {
    fn walk(el: &Element, out: &mut String) {
        for child in &el.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) if e.tag == "i" => {}
                Node::Element(e) => walk(e, out),
            }
        }
    }
    let mut raw = String::new();
    walk(el, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `YYYYMMDD_HHMM` in the timestamp's own time zone.
pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%Y%m%d_%H%M").to_string()
}

/// Build and sanitize a file name.
///
/// Names longer than [`MAX_FILE_NAME_BYTES`] lose the end of the identity
/// part; the timestamp and extension are always kept.
pub fn name(db_name: &str, db_connection: &str, timestamp: &str) -> String {
    let identity = sanitize(&format!("{db_name}_{db_connection}"));
    let tail = sanitize(&format!("_{timestamp}.html"));
    let room = MAX_FILE_NAME_BYTES.saturating_sub(tail.len());
    format!("{}{tail}", truncate_bytes(&identity, room))
}

/// Longest prefix of `s` within `max` bytes, cut on a char boundary.
pub fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Replace reserved characters with `_` and collapse whitespace runs to one `_`.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if RESERVED.contains(&c) || c.is_control() {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}
