use uuid::Uuid;

/// Derives a deterministic, namespaced UUID from a seed string.
///
/// Same seed, same UUID — always, including across process restarts. This is
/// the idempotency key for article records: re-extracting an article with an
/// identical title/url/keyword identity upserts onto the same row.
///
/// # Examples
///
/// ```
/// use gleaner::url::stable_uid;
///
/// let a = stable_uid("Market Update-https://example.com/");
/// let b = stable_uid("Market Update-https://example.com/");
/// assert_eq!(a, b);
/// ```
pub fn stable_uid(seed: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, seed.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(stable_uid("abc"), stable_uid("abc"));
    }

    #[test]
    fn test_distinct_seeds_distinct_uids() {
        assert_ne!(stable_uid("abc"), stable_uid("abd"));
    }

    #[test]
    fn test_known_value_is_stable_across_versions() {
        // UUID v5 in the DNS namespace is fully specified; pin one value so a
        // library change that silently breaks determinism fails loudly.
        assert_eq!(
            stable_uid("example.com").to_string(),
            "cfbff0d1-9375-5685-968c-48ce8b15ae17"
        );
    }
}
