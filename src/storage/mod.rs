//! Storage module for persisting extracted records
//!
//! Four record types with natural unique keys (Website by URL, Article by
//! derived UID, Image and File by absolute resource URL), persisted through
//! idempotent find-or-create-then-overwrite upserts. Ownership is by
//! reference: join tables hold the natural keys, so re-extraction converges
//! records with the same identity onto the same stored entity.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};

/// A record type with a natural unique key used for upserts
pub trait UniqueKey {
    /// The value of the record's unique key field
    fn unique_key(&self) -> &str;
}

/// One distinct URL's extracted content; upserted on every (re)fetch with
/// last-write-wins semantics
#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteRecord {
    /// Unique key
    pub url: String,
    pub name: Option<String>,
    pub domain: String,
    pub language: Option<String>,
    pub keywords: Vec<String>,
    /// UIDs of the articles discovered on this fetch
    pub articles: Vec<String>,
    /// URLs of the images discovered on this fetch
    pub images: Vec<String>,
    /// URLs of the files discovered on this fetch
    pub files: Vec<String>,
}

impl UniqueKey for WebsiteRecord {
    fn unique_key(&self) -> &str {
        &self.url
    }
}

/// An article block extracted from a page, keyed by a UID derived
/// deterministically from its title, source URL, and keyword set
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// Unique key
    pub uid: String,
    pub url: String,
    pub name: String,
    pub text: String,
    /// The canonical link chosen among the in-article candidates
    pub link: String,
    /// Every outbound link found inside the article element
    pub links: Vec<String>,
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub domain: String,
    pub source_date: DateTime<Utc>,
    /// URLs of images found within the article's own subtree
    pub images: Vec<String>,
}

impl UniqueKey for ArticleRecord {
    fn unique_key(&self) -> &str {
        &self.uid
    }
}

/// An image reference, keyed by its absolute URL
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Unique key
    pub url: String,
    pub name: String,
    pub domain: String,
    pub keywords: Vec<String>,
    pub language: Option<String>,
}

impl UniqueKey for ImageRecord {
    fn unique_key(&self) -> &str {
        &self.url
    }
}

/// A downloadable file reference, keyed by its absolute URL
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Unique key
    pub url: String,
    pub name: Option<String>,
    pub domain: String,
    pub extension: String,
    pub keywords: Vec<String>,
    pub language: Option<String>,
}

impl UniqueKey for FileRecord {
    fn unique_key(&self) -> &str {
        &self.url
    }
}

/// A stored embedding point for a website
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    /// Deterministic point UUID derived from the embedded text
    pub uid: String,
    pub url: String,
    pub name: Option<String>,
    pub domain: String,
    pub vector: Vec<f32>,
}

impl UniqueKey for VectorRecord {
    fn unique_key(&self) -> &str {
        &self.uid
    }
}
