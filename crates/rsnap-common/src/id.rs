//! Export identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier correlating the log lines of one export run.
///
/// Format: `rsnap-YYYYMMDD-HHMMSS-XXXX`
/// Example: `rsnap-20250101-120000-a7xq`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportId(pub String);

impl ExportId {
    /// Generate a new export ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        ExportId(format!(
            "rsnap-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            generate_base32_suffix()
        ))
    }

    /// Parse an existing export ID string.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("rsnap-")?;
        let mut parts = rest.split('-');
        let date = parts.next()?;
        let time = parts.next()?;
        let suffix = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if time.len() != 6 || !time.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if suffix.len() != 4 || !suffix.chars().all(|c| matches!(c, 'a'..='z' | '2'..='7')) {
            return None;
        }
        Some(ExportId(s.to_string()))
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn generate_base32_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let mut value = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32);
    value &= 0x000F_FFFF;
    let alphabet = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut out = String::with_capacity(4);
    for shift in [15_u32, 10, 5, 0] {
        let idx = ((value >> shift) & 0x1F) as usize;
        out.push(alphabet[idx] as char);
    }
    out
}
