use url::Url;

/// Extensions treated as downloadable files worth recording
pub const FILE_EXTENSIONS: &[&str] = &[
    ".zip", ".rar", ".tar.gz", ".gz", ".pdf", ".docx", ".json", ".xls", ".csv", ".db", ".sqlite",
    ".sql", ".txt", ".ttf", ".otf", ".wav", ".mp3", ".flac", ".ogg", ".mp4", ".flv",
];

/// Extensions excluded from article candidate links
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webm"];

/// Extracts the network location (host, plus port when present) from a URL.
///
/// Fails closed: malformed input is returned unchanged rather than erroring,
/// since callers must never crash on attacker-controlled URLs.
///
/// # Examples
///
/// ```
/// use gleaner::url::domain_of;
///
/// assert_eq!(domain_of("https://example.com/path"), "example.com");
/// assert_eq!(domain_of("https://example.com:8080/"), "example.com:8080");
/// assert_eq!(domain_of("not a url"), "not a url");
/// ```
pub fn domain_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            },
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Extracts the last path segment of a URL, ignoring query and fragment.
///
/// Returns None when the URL has no path or the path ends in a slash.
pub fn filename_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let name = path.rsplit('/').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Extracts the extension (with leading dot) from a URL's filename.
///
/// `.tar.gz` is kept whole; otherwise the suffix after the last dot.
pub fn extension_of(url: &str) -> Option<String> {
    let name = filename_of(url)?;
    let lower = name.to_lowercase();
    if lower.ends_with(".tar.gz") {
        return Some(".tar.gz".to_string());
    }
    let idx = name.rfind('.')?;
    if idx == 0 || idx == name.len() - 1 {
        return None;
    }
    Some(name[idx..].to_string())
}

/// Strips the query string and a trailing `#` from a URL.
///
/// Used by the skip policy to guard against query-parameter variants of an
/// already-visited canonical path.
pub fn remove_query(url: &str) -> String {
    let url = url.strip_suffix('#').unwrap_or(url);
    match url.find('?') {
        Some(idx) => url[..idx].to_string(),
        None => url.to_string(),
    }
}

/// Returns true when the extension is in the downloadable allow-list
pub fn is_file_extension(ext: &str) -> bool {
    let low = ext.to_lowercase();
    FILE_EXTENSIONS.contains(&low.as_str())
}

/// Returns true when the URL points at a downloadable file
pub fn is_file_url(url: &str) -> bool {
    match extension_of(url) {
        Some(ext) => is_file_extension(&ext),
        None => false,
    }
}

/// Infers a language from the URL's top-level domain.
///
/// Last-resort fallback when neither the document nor its meta tags declare
/// a language.
pub fn language_of(url: &str) -> Option<String> {
    let domain = domain_of(url);
    let tld = domain.split(':').next()?.rsplit('.').next()?;
    let lang = match tld {
        "de" | "at" => "de",
        "fr" => "fr",
        "es" | "mx" | "ar" => "es",
        "it" => "it",
        "nl" => "nl",
        "pl" => "pl",
        "ru" => "ru",
        "jp" => "ja",
        "cn" => "zh",
        "kr" => "ko",
        "pt" | "br" => "pt",
        "se" => "sv",
        "no" => "no",
        "dk" => "da",
        "fi" => "fi",
        "cz" => "cs",
        "gr" => "el",
        "tr" => "tr",
        "ua" => "uk",
        "uk" | "us" | "au" | "ca" | "ie" | "nz" => "en",
        _ => return None,
    };
    Some(lang.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_of_simple() {
        assert_eq!(domain_of("https://example.com/path"), "example.com");
    }

    #[test]
    fn test_domain_of_subdomain() {
        assert_eq!(domain_of("https://news.example.com/a/b"), "news.example.com");
    }

    #[test]
    fn test_domain_of_with_port() {
        assert_eq!(domain_of("http://127.0.0.1:8080/x"), "127.0.0.1:8080");
    }

    #[test]
    fn test_domain_of_malformed_returns_input() {
        assert_eq!(domain_of("::::"), "::::");
        assert_eq!(domain_of(""), "");
    }

    #[test]
    fn test_filename_of() {
        assert_eq!(
            filename_of("https://example.com/files/report.pdf"),
            Some("report.pdf".to_string())
        );
        assert_eq!(filename_of("https://example.com/dir/"), None);
    }

    #[test]
    fn test_filename_ignores_query() {
        assert_eq!(
            filename_of("https://example.com/a.zip?download=1"),
            Some("a.zip".to_string())
        );
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(
            extension_of("https://example.com/report.PDF"),
            Some(".PDF".to_string())
        );
        assert_eq!(
            extension_of("https://example.com/archive.tar.gz"),
            Some(".tar.gz".to_string())
        );
        assert_eq!(extension_of("https://example.com/readme"), None);
    }

    #[test]
    fn test_remove_query() {
        assert_eq!(
            remove_query("https://example.com/page?a=1&b=2"),
            "https://example.com/page"
        );
        assert_eq!(
            remove_query("https://example.com/page#"),
            "https://example.com/page"
        );
        assert_eq!(
            remove_query("https://example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_is_file_url() {
        assert!(is_file_url("https://example.com/data.csv"));
        assert!(is_file_url("https://example.com/song.MP3"));
        assert!(!is_file_url("https://example.com/page.html"));
        assert!(!is_file_url("https://example.com/"));
    }

    #[test]
    fn test_language_of() {
        assert_eq!(language_of("https://example.de/"), Some("de".to_string()));
        assert_eq!(language_of("https://example.co.jp/"), Some("ja".to_string()));
        assert_eq!(language_of("https://example.com/"), None);
    }
}
