//! Article extraction
//!
//! Articles are the blocks matched by a fixed set of container selectors.
//! Each candidate must establish a title and a non-trivial body or it is
//! dropped; survivors get a canonical link chosen among their outbound
//! links, a deterministic UID, and a best-effort publication date.

use crate::page::date::parse_date;
use crate::page::media::{extract_images, merge_keywords, resolve};
use crate::page::{ExtractContext, ExtractedArticle};
use crate::storage::ArticleRecord;
use crate::url::{
    collapse_whitespace, domain_of, extension_of, find_sentence, keywordify, slugify, stable_uid,
    IMAGE_EXTENSIONS,
};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

const ARTICLE_SELECTORS: &str = "article,div.post,.news-article,.article";
const TITLE_SELECTORS: &str = "h1,h2,h3,h4,.subject,.title";

/// Meta keys probed for a publication date, in priority order
const META_DATE_KEYS: &[&str] = &[
    "date",
    "time",
    "date_published",
    "time_published",
    "date-published",
    "time-published",
    "date_modified",
    "time_modified",
    "date-modified",
    "time-modified",
    "timestamp",
];

/// Extracts every article block in the document
///
/// A candidate that fails required-field validation is dropped without
/// affecting its siblings.
pub(crate) fn extract_articles(
    document: &Html,
    ctx: &ExtractContext,
    fallback_title: Option<&str>,
    keywords: &[String],
) -> Vec<ExtractedArticle> {
    let selector = match Selector::parse(ARTICLE_SELECTORS) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| extract_article(element, ctx, fallback_title, keywords))
        .collect()
}

fn extract_article(
    element: ElementRef,
    ctx: &ExtractContext,
    fallback_title: Option<&str>,
    keywords: &[String],
) -> Option<ExtractedArticle> {
    let text = extract_body(element);
    if text.chars().count() <= 1 {
        return None;
    }

    let title = extract_title(element)
        .or_else(|| Some(find_sentence(&text, 3, 256)).filter(|title| !title.is_empty()))
        .or_else(|| fallback_title.map(str::to_string))
        .filter(|title| !title.is_empty())?;
    let title = collapse_whitespace(&title);

    let article_keywords = merge_keywords(keywords, keywordify(&title));
    let images = extract_images(element, ctx, Some(&title), &article_keywords);
    let links = extract_links(element, ctx);

    let page_url = ctx.base.as_str();
    let link = select_canonical(&title, &links, page_url);
    let uid = article_uid(&title, page_url, &article_keywords);
    let source_date = resolve_source_date(element, ctx);

    let record = ArticleRecord {
        uid,
        url: page_url.to_string(),
        name: title,
        text,
        link,
        links,
        keywords: article_keywords,
        language: ctx.language.map(str::to_string),
        domain: domain_of(page_url),
        source_date,
        images: images.iter().map(|image| image.url.clone()).collect(),
    };
    Some(ExtractedArticle { record, images })
}

/// Heading-like child's text, trimmed; empty or absent -> None
fn extract_title(element: ElementRef) -> Option<String> {
    let selector = Selector::parse(TITLE_SELECTORS).ok()?;
    element
        .select(&selector)
        .next()
        .map(|heading| heading.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Concatenated paragraph text (list items when no paragraphs exist), with
/// redundant whitespace collapsed
fn extract_body(element: ElementRef) -> String {
    let paragraphs = collect_text(element, "p");
    let parts = if paragraphs.is_empty() {
        collect_text(element, "li")
    } else {
        paragraphs
    };
    collapse_whitespace(&parts.join("\n"))
}

fn collect_text(element: ElementRef, selectors: &str) -> Vec<String> {
    let selector = match Selector::parse(selectors) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    element
        .select(&selector)
        .map(|child| child.text().collect::<String>().trim().to_string())
        .collect()
}

/// Deduplicated outbound links inside the element, excluding image URLs
fn extract_links(element: ElementRef, ctx: &ExtractContext) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let mut links: Vec<String> = Vec::new();
    for anchor in element.select(&selector) {
        if let Some(href) = anchor.value().attr("href") {
            if let Some(joined) = resolve(ctx.base, href) {
                if !links.contains(&joined) {
                    links.push(joined);
                }
            }
        }
    }
    links.retain(|link| match extension_of(link) {
        Some(ext) => !IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    });
    links
}

/// Chooses the canonical link among an article's candidate links.
///
/// A sole candidate wins outright. Otherwise the first candidate containing
/// any slugified form of the title (separators `-`, `_`, space) wins, then
/// the longest candidate string, then the page URL itself when there are no
/// candidates.
pub(crate) fn select_canonical(title: &str, links: &[String], page_url: &str) -> String {
    if links.len() == 1 {
        return links[0].clone();
    }
    if links.is_empty() {
        return page_url.to_string();
    }

    let slugs = [slugify(title, '-'), slugify(title, '_'), slugify(title, ' ')];
    if let Some(matched) = links.iter().find(|link| {
        slugs
            .iter()
            .any(|slug| !slug.is_empty() && link.contains(slug.as_str()))
    }) {
        return matched.clone();
    }

    longest(links).cloned().unwrap_or_else(|| page_url.to_string())
}

/// Longest string, first wins ties
fn longest(links: &[String]) -> Option<&String> {
    links.iter().fold(None, |best: Option<&String>, link| match best {
        Some(current) if current.len() >= link.len() => Some(current),
        _ => Some(link),
    })
}

/// Derives the article's deterministic UID from its deduplicated title,
/// page URL, and keywords
pub(crate) fn article_uid(title: &str, page_url: &str, keywords: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(2 + keywords.len());
    for part in [title, page_url]
        .into_iter()
        .chain(keywords.iter().map(String::as_str))
    {
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    stable_uid(&parts.concat()).to_string()
}

/// Resolves the publication date: an embedded `<time>` element's parseable
/// machine attribute or visible text wins, else the first parseable meta
/// date value, else now
fn resolve_source_date(element: ElementRef, ctx: &ExtractContext) -> DateTime<Utc> {
    let mut candidate = META_DATE_KEYS
        .iter()
        .find_map(|key| ctx.meta.get(key))
        .map(str::to_string);

    if let Ok(selector) = Selector::parse("time") {
        if let Some(time_element) = element.select(&selector).next() {
            let attr_value = time_element
                .value()
                .attr("datetime")
                .or_else(|| time_element.value().attr("unixtime"));
            if let Some(value) = attr_value.filter(|value| parse_date(value).is_some()) {
                candidate = Some(value.to_string());
            } else {
                let text = time_element.text().collect::<String>();
                if parse_date(&text).is_some() {
                    candidate = Some(text);
                }
            }
        }
    }

    match candidate {
        Some(value) => parse_date(&value).unwrap_or_else(|| {
            tracing::warn!(url = %ctx.base, date = %value, "Failed to parse date");
            Utc::now()
        }),
        None => Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MetaMap;
    use url::Url;

    fn extract(html: &str, meta: MetaMap) -> Vec<ExtractedArticle> {
        let document = Html::parse_document(html);
        let base = Url::parse("https://example.com/").unwrap();
        let ctx = ExtractContext {
            base: &base,
            meta: &meta,
            page_title: Some("Page Title"),
            language: Some("en"),
        };
        extract_articles(&document, &ctx, Some("Page Title"), &[])
    }

    #[test]
    fn test_extract_basic_article() {
        let html = r#"<body><article>
            <h1>Local Elections Begin</h1>
            <p>Polls opened this morning.</p>
            <p>Turnout is expected high.</p>
        </article></body>"#;
        let articles = extract(html, MetaMap::default());

        assert_eq!(articles.len(), 1);
        let record = &articles[0].record;
        assert_eq!(record.name, "Local Elections Begin");
        assert_eq!(record.text, "Polls opened this morning.\nTurnout is expected high.");
        // No in-article links: canonical falls back to the page URL
        assert_eq!(record.link, "https://example.com/");
        assert!(record.keywords.contains(&"elections".to_string()));
    }

    #[test]
    fn test_article_without_body_dropped() {
        let html = r#"<body><article><h1>Title Only</h1></article></body>"#;
        assert!(extract(html, MetaMap::default()).is_empty());

        let html = r#"<body><article><h1>Title</h1><p>x</p></article></body>"#;
        assert!(extract(html, MetaMap::default()).is_empty());
    }

    #[test]
    fn test_title_falls_back_to_sentence() {
        let html = r#"<body><div class="post">
            <p>Markets rallied on Monday. More details followed later in the day.</p>
        </div></body>"#;
        let articles = extract(html, MetaMap::default());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].record.name, "Markets rallied on Monday");
    }

    #[test]
    fn test_body_falls_back_to_list_items() {
        let html = r#"<body><article>
            <h2>Headlines</h2>
            <ul><li>First item</li><li>Second item</li></ul>
        </article></body>"#;
        let articles = extract(html, MetaMap::default());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].record.text, "First item\nSecond item");
    }

    #[test]
    fn test_links_exclude_images() {
        let html = r##"<body><article>
            <h1>Gallery Update</h1>
            <p>Some photographs from the event.</p>
            <a href="/galleries/full">Full gallery</a>
            <a href="/photos/one.jpg">Photo</a>
        </article></body>"##;
        let articles = extract(html, MetaMap::default());
        assert_eq!(
            articles[0].record.links,
            vec!["https://example.com/galleries/full".to_string()]
        );
        // The sole surviving candidate becomes canonical
        assert_eq!(articles[0].record.link, "https://example.com/galleries/full");
    }

    #[test]
    fn test_article_scoped_images() {
        let html = r#"<body>
            <img src="/outside.webp" alt="Outside">
            <article>
                <h1>Inside Story</h1>
                <p>A story with one image.</p>
                <img src="/inside.webp" alt="Inside">
            </article>
        </body>"#;
        let articles = extract(html, MetaMap::default());
        let urls: Vec<&str> = articles[0].images.iter().map(|i| i.url.as_str()).collect();
        assert!(urls.contains(&"https://example.com/inside.webp"));
        assert!(!urls.contains(&"https://example.com/outside.webp"));
    }

    #[test]
    fn test_canonical_single_candidate() {
        let links = vec!["https://example.com/anything".to_string()];
        assert_eq!(
            select_canonical("Unrelated Title", &links, "https://example.com/"),
            "https://example.com/anything"
        );
    }

    #[test]
    fn test_canonical_slug_match() {
        let links = vec![
            "https://example.com/about".to_string(),
            "https://example.com/news/market-update-2024".to_string(),
        ];
        assert_eq!(
            select_canonical("Market Update", &links, "https://example.com/"),
            "https://example.com/news/market-update-2024"
        );
    }

    #[test]
    fn test_canonical_longest_fallback() {
        let links = vec![
            "https://example.com/a".to_string(),
            "https://example.com/some/longer/path".to_string(),
        ];
        assert_eq!(
            select_canonical("No Slug Here", &links, "https://example.com/"),
            "https://example.com/some/longer/path"
        );
    }

    #[test]
    fn test_canonical_no_candidates() {
        assert_eq!(
            select_canonical("Title", &[], "https://example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_uid_deterministic() {
        let keywords = vec!["alpha".to_string(), "beta".to_string()];
        let a = article_uid("Title", "https://example.com/", &keywords);
        let b = article_uid("Title", "https://example.com/", &keywords);
        assert_eq!(a, b);

        let c = article_uid("Other Title", "https://example.com/", &keywords);
        assert_ne!(a, c);
    }

    #[test]
    fn test_date_from_time_element() {
        let html = r#"<body><article>
            <h1>Dated Story</h1>
            <p>Something happened on a known day.</p>
            <time datetime="2024-03-15T10:30:00Z">March 15</time>
        </article></body>"#;
        let articles = extract(html, MetaMap::default());
        assert_eq!(
            articles[0].record.source_date.to_rfc3339(),
            "2024-03-15T10:30:00+00:00"
        );
    }

    #[test]
    fn test_date_from_time_element_text() {
        let html = r#"<body><article>
            <h1>Dated Story</h1>
            <p>Something happened on a known day.</p>
            <time datetime="invalid">2024-03-15</time>
        </article></body>"#;
        let articles = extract(html, MetaMap::default());
        assert_eq!(
            articles[0].record.source_date.to_rfc3339(),
            "2024-03-15T00:00:00+00:00"
        );
    }

    #[test]
    fn test_date_from_meta() {
        let html = r#"<body><article>
            <h1>Dated Story</h1>
            <p>Something happened on a known day.</p>
        </article></body>"#;
        let meta = MetaMap::from_pairs(&[("date_published", "2024-01-02T00:00:00Z")]);
        let articles = extract(html, meta);
        assert_eq!(
            articles[0].record.source_date.to_rfc3339(),
            "2024-01-02T00:00:00+00:00"
        );
    }

    #[test]
    fn test_unparseable_date_defaults_to_now() {
        let html = r#"<body><article>
            <h1>Dated Story</h1>
            <p>Something happened recently.</p>
        </article></body>"#;
        let meta = MetaMap::from_pairs(&[("date", "sometime last week")]);
        let before = Utc::now();
        let articles = extract(html, meta);
        assert!(articles[0].record.source_date >= before);
    }
}
