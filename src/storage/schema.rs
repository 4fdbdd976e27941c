//! SQLite schema definition
//!
//! Keyword sets are stored as JSON arrays of normalized tokens; keyword
//! lookups match the quoted token as a substring of the JSON text, which the
//! keyword indexes cover. Dates are RFC 3339 strings.

use rusqlite::Connection;

/// Creates all tables and indexes if they do not exist
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT,
            config_hash TEXT NOT NULL,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS websites (
            url TEXT PRIMARY KEY,
            name TEXT,
            domain TEXT NOT NULL,
            language TEXT,
            keywords TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_websites_domain ON websites(domain);
        CREATE INDEX IF NOT EXISTS idx_websites_language ON websites(language);
        CREATE INDEX IF NOT EXISTS idx_websites_name ON websites(name);
        CREATE INDEX IF NOT EXISTS idx_websites_keywords ON websites(keywords);

        CREATE TABLE IF NOT EXISTS articles (
            uid TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            name TEXT NOT NULL,
            text TEXT NOT NULL,
            link TEXT NOT NULL,
            links TEXT NOT NULL DEFAULT '[]',
            keywords TEXT NOT NULL DEFAULT '[]',
            language TEXT,
            domain TEXT NOT NULL,
            source_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_articles_url ON articles(url);
        CREATE INDEX IF NOT EXISTS idx_articles_name ON articles(name);
        CREATE INDEX IF NOT EXISTS idx_articles_language ON articles(language);
        CREATE INDEX IF NOT EXISTS idx_articles_source_date ON articles(source_date);
        CREATE INDEX IF NOT EXISTS idx_articles_keywords ON articles(keywords);

        CREATE TABLE IF NOT EXISTS images (
            url TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            domain TEXT NOT NULL,
            keywords TEXT NOT NULL DEFAULT '[]',
            language TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_images_domain ON images(domain);
        CREATE INDEX IF NOT EXISTS idx_images_language ON images(language);
        CREATE INDEX IF NOT EXISTS idx_images_keywords ON images(keywords);

        CREATE TABLE IF NOT EXISTS files (
            url TEXT PRIMARY KEY,
            name TEXT,
            domain TEXT NOT NULL,
            extension TEXT NOT NULL,
            keywords TEXT NOT NULL DEFAULT '[]',
            language TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_files_domain ON files(domain);
        CREATE INDEX IF NOT EXISTS idx_files_extension ON files(extension);
        CREATE INDEX IF NOT EXISTS idx_files_keywords ON files(keywords);

        CREATE TABLE IF NOT EXISTS website_articles (
            website_url TEXT NOT NULL,
            article_uid TEXT NOT NULL,
            UNIQUE(website_url, article_uid)
        );
        CREATE TABLE IF NOT EXISTS website_images (
            website_url TEXT NOT NULL,
            image_url TEXT NOT NULL,
            UNIQUE(website_url, image_url)
        );
        CREATE TABLE IF NOT EXISTS website_files (
            website_url TEXT NOT NULL,
            file_url TEXT NOT NULL,
            UNIQUE(website_url, file_url)
        );
        CREATE TABLE IF NOT EXISTS article_images (
            article_uid TEXT NOT NULL,
            image_url TEXT NOT NULL,
            UNIQUE(article_uid, image_url)
        );

        CREATE TABLE IF NOT EXISTS website_vectors (
            uid TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            name TEXT,
            domain TEXT NOT NULL,
            vector TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )
}
