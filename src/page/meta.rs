//! Meta-tag map with forgiving lookups
//!
//! Pages declare metadata under inconsistent keys (`property` vs `name`,
//! Open Graph prefixes, arbitrary casing), so lookups probe a fixed set of
//! variants and return the first hit.

use scraper::{Html, Selector};
use std::collections::HashMap;

/// Key-value map of a document's meta tags
#[derive(Debug, Default)]
pub struct MetaMap {
    data: HashMap<String, String>,
}

impl MetaMap {
    /// Collects every `<meta>` tag carrying both a key attribute
    /// (`property`, `name`, or `key`) and a value attribute (`content` or
    /// `value`)
    pub fn from_document(document: &Html) -> Self {
        let mut data = HashMap::new();
        if let Ok(selector) = Selector::parse("meta") {
            for element in document.select(&selector) {
                let tag = element.value();
                let key = tag
                    .attr("property")
                    .or_else(|| tag.attr("name"))
                    .or_else(|| tag.attr("key"));
                let value = tag.attr("content").or_else(|| tag.attr("value"));
                if let (Some(key), Some(value)) = (key, value) {
                    if !key.is_empty() && !value.is_empty() {
                        data.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }
        Self { data }
    }

    /// Looks up a key, probing the key itself, its Title/UPPER/Capitalized
    /// case variants, and the `og:`-prefixed form of each
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_with_prefix(key)
            .or_else(|| self.get_with_prefix(&title_case(key)))
            .or_else(|| self.get_with_prefix(&key.to_uppercase()))
            .or_else(|| self.get_with_prefix(&capitalize(key)))
    }

    fn get_with_prefix(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .or_else(|| self.data.get(&format!("og:{}", key)))
            .map(String::as_str)
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Uppercases every letter that follows a non-letter, lowercasing the rest
/// ("date_published" -> "Date_Published")
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

/// Uppercases the first character, lowercasing the rest
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
