//! Settlement/start timestamp normalization for platform exports.
//!
//! Exports write month abbreviations in Portuguese (`05-mai-23 14:30`). They
//! are rewritten to lower-case English abbreviations before parsing against
//! the fixed `day-Mon-yy HH:MM` pattern.

use chrono::NaiveDateTime;

pub const DATE_FORMAT: &str = "%d-%b-%y %H:%M";

const MONTH_ABBREVIATIONS: [(&str, &str); 12] = [
    ("jan", "jan"),
    ("fev", "feb"),
    ("mar", "mar"),
    ("abr", "apr"),
    ("mai", "may"),
    ("jun", "jun"),
    ("jul", "jul"),
    ("ago", "aug"),
    ("set", "sep"),
    ("out", "oct"),
    ("nov", "nov"),
    ("dez", "dec"),
];

/// Lower-cases `raw` and rewrites every Portuguese month abbreviation to its
/// English counterpart. Already-canonical input comes back unchanged.
pub fn normalize_months(raw: &str) -> String {
    let mut out = raw.to_lowercase();
    for (source, canonical) in MONTH_ABBREVIATIONS {
        if source != canonical && out.contains(source) {
            out = out.replace(source, canonical);
        }
    }
    out
}

/// Normalizes and parses an export timestamp. `None` means the value is
/// missing or does not match [`DATE_FORMAT`].
pub fn parse_export_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let normalized = normalize_months(raw);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, DATE_FORMAT).ok()
}
