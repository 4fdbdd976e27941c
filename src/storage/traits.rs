//! Storage trait and error types

use crate::storage::{ArticleRecord, FileRecord, ImageRecord, VectorRecord, WebsiteRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every upsert is an independent, idempotent, last-write-wins operation
/// keyed by the record's natural unique key; no cross-record atomicity is
/// provided or required.
pub trait Storage {
    // ===== Run Management =====

    /// Records the start of a crawl run; returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Upserts =====

    /// Upserts a website by URL, replacing its ownership references
    fn upsert_website(&mut self, record: &WebsiteRecord) -> StorageResult<()>;

    /// Upserts an article by UID, replacing its image references
    fn upsert_article(&mut self, record: &ArticleRecord) -> StorageResult<()>;

    /// Upserts an image by URL
    fn upsert_image(&mut self, record: &ImageRecord) -> StorageResult<()>;

    /// Upserts a file by URL
    fn upsert_file(&mut self, record: &FileRecord) -> StorageResult<()>;

    /// Upserts an embedding point by UID
    fn upsert_vector(&mut self, record: &VectorRecord) -> StorageResult<()>;

    // ===== Lookups =====

    /// Gets a website by its URL
    fn get_website(&self, url: &str) -> StorageResult<Option<WebsiteRecord>>;

    /// Gets an article by its UID
    fn get_article(&self, uid: &str) -> StorageResult<Option<ArticleRecord>>;

    /// Gets an image by its URL
    fn get_image(&self, url: &str) -> StorageResult<Option<ImageRecord>>;

    /// Gets a file by its URL
    fn get_file(&self, url: &str) -> StorageResult<Option<FileRecord>>;

    /// Finds articles whose title or body contains the given text
    fn search_articles(&self, text: &str) -> StorageResult<Vec<ArticleRecord>>;

    /// Finds articles carrying the given normalized keyword
    fn find_articles_by_keyword(&self, keyword: &str) -> StorageResult<Vec<ArticleRecord>>;

    /// Finds articles in the given language
    fn find_articles_by_language(&self, language: &str) -> StorageResult<Vec<ArticleRecord>>;

    /// Finds articles published at or after the given instant
    fn find_articles_since(&self, since: DateTime<Utc>) -> StorageResult<Vec<ArticleRecord>>;

    /// Finds websites carrying the given normalized keyword
    fn find_websites_by_keyword(&self, keyword: &str) -> StorageResult<Vec<WebsiteRecord>>;

    /// Finds websites in the given language
    fn find_websites_by_language(&self, language: &str) -> StorageResult<Vec<WebsiteRecord>>;

    /// Returns up to `n` random stored website URLs, used to re-seed crawls
    fn sample_websites(&self, n: usize) -> StorageResult<Vec<String>>;

    // ===== Counts =====

    fn count_websites(&self) -> StorageResult<u64>;
    fn count_articles(&self) -> StorageResult<u64>;
    fn count_images(&self) -> StorageResult<u64>;
    fn count_files(&self) -> StorageResult<u64>;
}
