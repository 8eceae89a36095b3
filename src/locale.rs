//! Bilingual field resolution.
//!
//! Content is stored with an Indonesian base field (`title`) and an optional
//! English twin (`titleEn`). Public responses carry only the base key, holding
//! whichever value applies to the requested locale.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

const EN_SUFFIX: &str = "En";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Id,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Id => "id",
            Locale::En => "en",
        }
    }

    /// Locale from a URL path segment; unknown prefixes are treated as a missing page.
    pub fn from_segment(segment: &str) -> Result<Self, ApiError> {
        segment
            .parse()
            .map_err(|_| ApiError::not_found(format!("Halaman /{segment} tidak ditemukan")))
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Locale::Id),
            "en" => Ok(Locale::En),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the English text when asked for `en` and it is not blank.
pub fn pick<'a>(locale: Locale, base: &'a str, en: Option<&'a str>) -> &'a str {
    match (locale, en) {
        (Locale::En, Some(en)) if !en.trim().is_empty() => en,
        _ => base,
    }
}

/// Resolves every `xEn` / `x` pair inside `value` (recursively) for `locale`
/// and strips the `xEn` keys.
pub fn resolve(value: Value, locale: Locale) -> Value {
    match value {
        Value::Object(mut map) => {
            let en_keys: Vec<String> = map
                .keys()
                .filter(|k| k.len() > EN_SUFFIX.len() && k.ends_with(EN_SUFFIX))
                .filter(|k| map.contains_key(&k[..k.len() - EN_SUFFIX.len()]))
                .cloned()
                .collect();

            for en_key in en_keys {
                let base_key = &en_key[..en_key.len() - EN_SUFFIX.len()];
                let en_value = map.remove(&en_key).unwrap_or(Value::Null);
                if locale == Locale::En && has_content(&en_value) {
                    map.insert(base_key.to_string(), en_value);
                }
            }

            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, resolve(v, locale)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| resolve(v, locale)).collect()),
        other => other,
    }
}

/// Serializes `item` and resolves it for `locale`.
pub fn localize<T: Serialize>(item: &T, locale: Locale) -> Result<Value, ApiError> {
    Ok(resolve(serde_json::to_value(item)?, locale))
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
