use std::collections::HashSet;

use chrono::Utc;
use deunicode::deunicode_with_tofu;
use serde_json::Value;

/// Lower-case, hyphen separated, ASCII alphanumeric only.
pub fn generate_slug(text: &str) -> String {
    let slug = deunicode_with_tofu(text, "-")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>();

    slug.split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// Appends `-2`, `-3`, ... to `base` until `taken` says no.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Timestamp-based id (epoch millis), bumped past `existing` so ids created in
/// the same millisecond stay unique.
pub fn next_timestamp_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let now = Utc::now().timestamp_millis();
    let max_existing = existing
        .into_iter()
        .filter_map(|id| id.parse::<i64>().ok())
        .max()
        .unwrap_or(i64::MIN);
    now.max(max_existing.saturating_add(1)).to_string()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Reads a list column. Rows written by older admin forms hold a plain
/// newline-separated string instead of a JSON array.
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => split_lines(raw),
    }
}

pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ids present in `existing` but absent from `submitted`.
pub fn removed_ids(existing: &[i64], submitted: &[i64]) -> Vec<i64> {
    let keep: HashSet<i64> = submitted.iter().copied().collect();
    existing
        .iter()
        .copied()
        .filter(|id| !keep.contains(id))
        .collect()
}

/// Transliterated, lower-cased text with punctuation collapsed to spaces.
pub fn normalize_text(text: &str) -> String {
    deunicode_with_tofu(text, " ")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn matches_category(category: Option<&str>, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => true,
        Some(f) => category.is_some_and(|c| c.trim().eq_ignore_ascii_case(f)),
    }
}
