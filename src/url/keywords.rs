//! Keyword normalization and slugification
//!
//! `keywordify` turns free text into a deduplicated, stop-word-filtered set
//! of lowercase tokens; `slugify` builds the URL-shaped variants used for
//! canonical-link matching.

/// Separators a keyword string is split on, recursively, until none remain
const SEPARATORS: &[char] = &[' ', ',', '&', '\n', '\r', '_', '-'];

/// Common words that carry no keyword value
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "her", "his", "i", "in", "is", "it", "its", "not", "of", "on", "or", "our", "she", "that",
    "the", "their", "they", "this", "to", "was", "we", "were", "will", "with", "you", "your",
];

/// Normalizes free text into a deduplicated keyword token set.
///
/// Lowercases, splits on the separator set, strips surrounding punctuation
/// from each token, and discards empty tokens and stop-words. Order of first
/// occurrence is preserved so the result is deterministic.
///
/// # Examples
///
/// ```
/// use gleaner::url::keywordify;
///
/// assert_eq!(
///     keywordify("Breaking-News, Election_2024"),
///     vec!["breaking", "news", "election", "2024"]
/// );
/// ```
pub fn keywordify(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in text.to_lowercase().split(SEPARATORS) {
        let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() || STOP_WORDS.contains(&token) {
            continue;
        }
        if !out.iter().any(|t| t == token) {
            out.push(token.to_string());
        }
    }
    out
}

/// Keywordifies each value and merges the results into one deduplicated set
pub fn keywordify_all<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        for token in keywordify(value.as_ref()) {
            if !out.contains(&token) {
                out.push(token);
            }
        }
    }
    out
}

/// Turns a title into a URL-shaped slug with the given word separator.
///
/// Lowercases, strips sentence punctuation, joins words with `sep`, and
/// percent-encodes anything left that is not URL-safe. Titles are slugified
/// three ways (`-`, `_`, space) when probing article candidate links.
pub fn slugify(text: &str, sep: char) -> String {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?' | ':' | ';' | '\'' | '"'))
        .collect();

    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join(&sep.to_string());
    urlencoding::encode(&joined).into_owned()
}
