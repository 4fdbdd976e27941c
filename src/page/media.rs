//! File and image extraction
//!
//! Files are anchors/sources whose resolved URL carries a downloadable
//! extension from the fixed allow-list. Images come from `<img>` tags and
//! icon links, plus at most one synthesized from the Open Graph image meta
//! field. Both inherit the calling context's keywords and language.

use crate::page::ExtractContext;
use crate::storage::{FileRecord, ImageRecord};
use crate::url::{collapse_whitespace, domain_of, extension_of, filename_of, is_file_extension, keywordify};
use scraper::{ElementRef, Selector};
use url::Url;

/// Source attributes probed on file-like elements, in priority order
const SOURCE_ATTRS: &[&str] = &["src", "data-src", "href", "data-href", "source", "content", "value"];

/// Name attributes probed on image elements, in priority order
const NAME_ATTRS: &[&str] = &["title", "data-title", "alt", "data-alt"];

pub(crate) fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(|url| url.to_string())
}

/// Unions two keyword lists, preserving first-seen order
pub(crate) fn merge_keywords(base: &[String], extra: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(base.len() + extra.len());
    for keyword in base.iter().cloned().chain(extra) {
        if !merged.contains(&keyword) {
            merged.push(keyword);
        }
    }
    merged
}

fn first_attr(element: ElementRef, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .find_map(|attr| element.value().attr(attr))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Extracts downloadable file references from every anchor/source element
/// under `scope`
pub(crate) fn extract_files(
    scope: ElementRef,
    ctx: &ExtractContext,
    keywords: &[String],
) -> Vec<FileRecord> {
    let selector = match Selector::parse("a,source") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    scope
        .select(&selector)
        .filter_map(|element| {
            let src = first_attr(element, SOURCE_ATTRS)?;
            let joined = resolve(ctx.base, &src)?;
            let extension = extension_of(&joined)?;
            if !is_file_extension(&extension) {
                return None;
            }
            Some(FileRecord {
                domain: domain_of(&joined),
                name: filename_of(&joined),
                url: joined,
                extension,
                keywords: keywords.to_vec(),
                language: ctx.language.map(str::to_string),
            })
        })
        .collect()
}

/// Extracts image references from every `<img>`/icon element under `scope`,
/// appending at most one image synthesized from the Open Graph image meta
/// field
///
/// An image with no usable name (attributes, then `fallback_title`) is
/// dropped. Image keywords are the context keywords unioned with keywords
/// derived from the image's own name.
pub(crate) fn extract_images(
    scope: ElementRef,
    ctx: &ExtractContext,
    fallback_title: Option<&str>,
    keywords: &[String],
) -> Vec<ImageRecord> {
    let selector = match Selector::parse(r#"img[src],link[rel="icon"]"#) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut images: Vec<ImageRecord> = scope
        .select(&selector)
        .filter_map(|element| {
            let src = first_attr(element, &["src", "href"])?;
            let name = first_attr(element, NAME_ATTRS)
                .or_else(|| fallback_title.map(str::to_string))?;
            let joined = resolve(ctx.base, &src)?;
            Some(build_image(joined, &name, keywords, ctx))
        })
        .collect();

    if let Some(image) = image_from_meta(ctx, fallback_title, keywords) {
        images.push(image);
    }
    images
}

/// Synthesizes an image record from the `og:image` meta field, named by the
/// best available meta/page/fallback title; skipped when no name exists
fn image_from_meta(
    ctx: &ExtractContext,
    fallback_title: Option<&str>,
    keywords: &[String],
) -> Option<ImageRecord> {
    let src = ctx.meta.get("og:image")?;
    let joined = resolve(ctx.base, src)?;
    let name = ctx
        .meta
        .get("image:name")
        .or_else(|| ctx.meta.get("image:title"))
        .or_else(|| ctx.meta.get("image:alt"))
        .or(ctx.page_title)
        .or(fallback_title)
        .map(str::trim)
        .filter(|name| !name.is_empty())?;
    Some(build_image(joined, name, keywords, ctx))
}

fn build_image(url: String, name: &str, keywords: &[String], ctx: &ExtractContext) -> ImageRecord {
    let name = collapse_whitespace(name);
    ImageRecord {
        domain: domain_of(&url),
        keywords: merge_keywords(keywords, keywordify(&name)),
        url,
        name,
        language: ctx.language.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MetaMap;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://example.com/news/").unwrap()
    }

    fn ctx<'a>(base: &'a Url, meta: &'a MetaMap) -> ExtractContext<'a> {
        ExtractContext {
            base,
            meta,
            page_title: Some("Page Title"),
            language: Some("en"),
        }
    }

    #[test]
    fn test_extract_files_by_extension() {
        let html = r#"<body>
            <a href="/reports/q3.pdf">Report</a>
            <a href="/about">About</a>
            <source data-src="media/clip.mp4">
        </body>"#;
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::default();
        let keywords = vec!["finance".to_string()];

        let files = extract_files(document.root_element(), &ctx(&base, &meta), &keywords);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].url, "https://example.com/reports/q3.pdf");
        assert_eq!(files[0].extension, ".pdf");
        assert_eq!(files[0].name.as_deref(), Some("q3.pdf"));
        assert_eq!(files[0].keywords, keywords);
        assert_eq!(files[1].url, "https://example.com/news/media/clip.mp4");
    }

    #[test]
    fn test_extract_files_attr_priority() {
        // src outranks href even when both are present
        let html = r#"<body><a src="/a.zip" href="/b.zip">x</a></body>"#;
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::default();

        let files = extract_files(document.root_element(), &ctx(&base, &meta), &[]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].url, "https://example.com/a.zip");
    }

    #[test]
    fn test_extract_images_with_names() {
        let html = r#"<body>
            <img src="/a.webp" alt="First image">
            <img src="/b.webp">
            <link rel="icon" href="/favicon.webp" title="Icon">
        </body>"#;
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::default();

        let images = extract_images(document.root_element(), &ctx(&base, &meta), None, &[]);

        // The nameless <img> is dropped (no fallback title given)
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "https://example.com/a.webp");
        assert_eq!(images[0].name, "First image");
        assert_eq!(images[1].name, "Icon");
    }

    #[test]
    fn test_extract_images_fallback_name() {
        let html = r#"<body><img src="/a.webp"></body>"#;
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::default();

        let images = extract_images(
            document.root_element(),
            &ctx(&base, &meta),
            Some("Fallback Name"),
            &[],
        );
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "Fallback Name");
    }

    #[test]
    fn test_image_keywords_union_name_keywords() {
        let html = r#"<body><img src="/a.webp" alt="Election Results"></body>"#;
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::default();
        let keywords = vec!["election".to_string(), "local".to_string()];

        let images = extract_images(document.root_element(), &ctx(&base, &meta), None, &keywords);
        assert_eq!(
            images[0].keywords,
            vec!["election".to_string(), "local".to_string(), "results".to_string()]
        );
    }

    #[test]
    fn test_og_image_synthesis() {
        let html = "<body></body>";
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::from_pairs(&[
            ("og:image", "/cover.webp"),
            ("og:image:title", "Cover Shot"),
        ]);

        let images = extract_images(document.root_element(), &ctx(&base, &meta), None, &[]);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://example.com/cover.webp");
        assert_eq!(images[0].name, "Cover Shot");
    }

    #[test]
    fn test_og_image_without_name_skipped() {
        let html = "<body></body>";
        let document = Html::parse_document(html);
        let base = base();
        let meta = MetaMap::from_pairs(&[("og:image", "/cover.webp")]);
        let ctx = ExtractContext {
            base: &base,
            meta: &meta,
            page_title: None,
            language: None,
        };

        let images = extract_images(document.root_element(), &ctx, None, &[]);
        assert!(images.is_empty());
    }

    #[test]
    fn test_merge_keywords_preserves_order() {
        let base = vec!["a".to_string(), "b".to_string()];
        let merged = merge_keywords(&base, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(merged, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
