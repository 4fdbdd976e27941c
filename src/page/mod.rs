//! Extraction pipeline turning a fetched document into typed records
//!
//! A `Page` is built in fixed stage order (meta map, title, language,
//! keywords, files, images, articles) because later stages consume earlier
//! results. It is ephemeral: it exists for one crawl step, after which its
//! records are upserted and the page is dropped.

mod article;
mod date;
mod media;
mod meta;

pub use date::parse_date;
pub use meta::MetaMap;

use crate::storage::{ArticleRecord, FileRecord, ImageRecord, WebsiteRecord};
use crate::url::{domain_of, keywordify_all, language_of};
use scraper::{Html, Selector};
use url::Url;

/// Shared inputs for the extraction stages
pub(crate) struct ExtractContext<'a> {
    pub base: &'a Url,
    pub meta: &'a MetaMap,
    pub page_title: Option<&'a str>,
    pub language: Option<&'a str>,
}

/// An article record together with the image records found in its own
/// subtree
#[derive(Debug, Clone)]
pub struct ExtractedArticle {
    pub record: ArticleRecord,
    pub images: Vec<ImageRecord>,
}

/// Everything extracted from one fetched document
#[derive(Debug)]
pub struct Page {
    pub url: String,
    pub domain: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub keywords: Vec<String>,
    pub files: Vec<FileRecord>,
    /// Page-level images (article-scoped images live on the articles)
    pub images: Vec<ImageRecord>,
    pub articles: Vec<ExtractedArticle>,
    /// Every outbound link on the page, for frontier admission
    pub links: Vec<String>,
}

impl Page {
    /// Runs the full extraction pipeline over fetched markup.
    ///
    /// Never fails: malformed markup or an unparseable base URL yields a
    /// page with empty collections, not an error.
    pub fn parse(url: &str, html: &str) -> Self {
        let document = Html::parse_document(html);
        let meta = MetaMap::from_document(&document);
        let title = extract_page_title(&document);
        let language = extract_language(&document, &meta, url);
        let keywords = extract_keywords(&meta, title.as_deref());

        let base = match Url::parse(url) {
            Ok(base) => base,
            Err(_) => {
                return Self {
                    url: url.to_string(),
                    domain: domain_of(url),
                    title,
                    language,
                    keywords,
                    files: Vec::new(),
                    images: Vec::new(),
                    articles: Vec::new(),
                    links: Vec::new(),
                }
            }
        };

        let ctx = ExtractContext {
            base: &base,
            meta: &meta,
            page_title: title.as_deref(),
            language: language.as_deref(),
        };
        let files = media::extract_files(document.root_element(), &ctx, &keywords);
        let images = media::extract_images(document.root_element(), &ctx, title.as_deref(), &keywords);
        let articles = article::extract_articles(&document, &ctx, title.as_deref(), &keywords);
        let links = extract_outbound_links(&document, &base);

        Self {
            url: base.as_str().to_string(),
            domain: domain_of(base.as_str()),
            title,
            language,
            keywords,
            files,
            images,
            articles,
            links,
        }
    }

    /// Builds the website record for this fetch, referencing the extracted
    /// records by their natural keys
    pub fn website_record(&self) -> WebsiteRecord {
        WebsiteRecord {
            url: self.url.clone(),
            name: self.title.clone(),
            domain: self.domain.clone(),
            language: self.language.clone(),
            keywords: self.keywords.clone(),
            articles: self.articles.iter().map(|a| a.record.uid.clone()).collect(),
            images: self.images.iter().map(|i| i.url.clone()).collect(),
            files: self.files.iter().map(|f| f.url.clone()).collect(),
        }
    }
}

fn extract_page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Declared root language attribute, else a meta locale value, else the
/// URL's top-level domain
fn extract_language(document: &Html, meta: &MetaMap, url: &str) -> Option<String> {
    if let Ok(selector) = Selector::parse("html") {
        if let Some(lang) = document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("lang"))
            .filter(|lang| !lang.is_empty())
        {
            return Some(lang.to_string());
        }
    }
    meta.get("locale")
        .or_else(|| meta.get("lang"))
        .or_else(|| meta.get("language"))
        .map(str::to_string)
        .or_else(|| language_of(url))
}

/// Meta keywords/tags split on commas, unioned with the title's own tokens,
/// all normalized
fn extract_keywords(meta: &MetaMap, title: Option<&str>) -> Vec<String> {
    let mut parts: Vec<String> = meta
        .get("keywords")
        .or_else(|| meta.get("tags"))
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    if let Some(title) = title {
        parts.push(title.to_string());
    }
    keywordify_all(parts)
}

fn extract_outbound_links(document: &Html, base: &Url) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let mut links = Vec::new();
    for anchor in document.select(&selector) {
        if let Some(href) = anchor.value().attr("href") {
            if let Some(joined) = media::resolve(base, href) {
                if !links.contains(&joined) {
                    links.push(joined);
                }
            }
        }
    }
    links
}
