use regex::Regex;
use std::sync::OnceLock;

/// Split a comma-separated recipient setting into trimmed, non-empty entries.
///
/// Duplicates are kept; each one gets its own send.
pub fn parse(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|num| !num.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a recipient looks like an E.164 number (`+` and 8-15 digits)
pub fn looks_like_e164(recipient: &str) -> bool {
    static E164: OnceLock<Regex> = OnceLock::new();
    E164.get_or_init(|| Regex::new(r"^\+[1-9]\d{7,14}$").expect("valid E.164 pattern"))
        .is_match(recipient)
}
