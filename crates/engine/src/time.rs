//! Timestamp handling for the bulk report's mixed date formats.

use chrono::NaiveDateTime;

/// Formats seen in the wild, most common first. The feed itself emits
/// `09-09-2025 10:51:17 AM`; older exports and manual re-saves produce
/// the rest.
const FORMATS: [&str; 8] = [
    "%d-%m-%Y %I:%M:%S %p",
    "%m-%d-%Y %I:%M:%S %p",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%d-%m-%Y %I:%M %p",
];

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Ledger date string: `dd/mm/yyyy HH:MM`. Unparseable input passes
/// through unchanged rather than being replaced by a guess.
pub fn format_ledger_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Bucket key at second granularity for duplicate-timestamp detection.
/// Falls back to the trimmed raw string so unparseable timestamps still
/// bucket with their exact twins.
pub fn second_key(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.trim().to_string(),
    }
}
