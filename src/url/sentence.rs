//! Sentence and whitespace heuristics
//!
//! `find_sentence` pulls the first delimiter-bounded span out of free text.
//! It is the title fallback for article containers that have no heading
//! element, so it has to produce something usable from messy body text.

/// Returns the first sentence-like span of `value`, truncated to `max_len`.
///
/// Delimiters are tried in fixed priority: `.`, then `\n` (where a short
/// `(parenthetical)` first line is skipped in favor of the following line),
/// then `\r`, `?`, `!`. A span must be longer than one character to count.
/// When no delimiter yields a span the whole input is used.
pub fn find_sentence(value: &str, min_len: usize, max_len: usize) -> String {
    let span = find_span(value, min_len).trim();
    truncate_chars(span, max_len)
}

fn find_span(value: &str, min_len: usize) -> &str {
    if let Some(idx) = value.find('.') {
        let span = &value[..idx];
        if span.chars().count() > 1 {
            return span;
        }
    }

    if let Some(idx) = value.find('\n') {
        let mut span = &value[..idx];
        // A short leading "(parenthetical)" line is not a title; try the
        // line after it instead.
        if span.starts_with('(') && span.contains(')') && span.chars().count() < min_len * 2 {
            span = value[idx + 1..].split('\n').next().unwrap_or("");
        }
        if span.chars().count() > 1 {
            return span;
        }
    }

    for delim in ['\r', '?', '!'] {
        if let Some(idx) = value.find(delim) {
            let span = &value[..idx];
            if span.chars().count() > 1 {
                return span;
            }
        }
    }

    value
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

/// Collapses runs of spaces and strips tabs, trimming the ends.
///
/// Newlines are kept: article bodies are paragraph texts joined by `\n` and
/// the paragraph boundaries stay meaningful.
pub fn collapse_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = false;
    for c in value.trim().chars() {
        match c {
            '\t' => continue,
            ' ' => {
                if !last_was_space {
                    out.push(' ');
                }
                last_was_space = true;
            }
            _ => {
                out.push(c);
                last_was_space = false;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_period_wins() {
        assert_eq!(
            find_sentence("Local elections begin. Turnout is high.", 3, 256),
            "Local elections begin"
        );
    }

    #[test]
    fn test_newline_fallback() {
        assert_eq!(find_sentence("First line\nSecond line", 3, 256), "First line");
    }

    #[test]
    fn test_parenthetical_prefix_skipped() {
        assert_eq!(
            find_sentence("(AP)\nMarkets rallied on Monday\nmore text", 3, 256),
            "Markets rallied on Monday"
        );
    }

    #[test]
    fn test_question_mark_delimiter() {
        assert_eq!(find_sentence("Why now? Because", 3, 256), "Why now");
    }

    #[test]
    fn test_truncated_to_max_len() {
        let long = "a".repeat(300);
        assert_eq!(find_sentence(&long, 3, 10).chars().count(), 10);
    }

    #[test]
    fn test_no_delimiter_returns_whole_input() {
        assert_eq!(find_sentence("just a fragment", 3, 256), "just a fragment");
    }

    #[test]
    fn test_single_char_span_ignored() {
        // "A" alone is too short for the period delimiter; the newline span
        // "A." is the first one long enough
        assert_eq!(find_sentence("A.\nreal title here", 3, 256), "A.");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a   b\tc  "), "a b c");
        assert_eq!(collapse_whitespace("line one\nline  two"), "line one\nline two");
    }
}
