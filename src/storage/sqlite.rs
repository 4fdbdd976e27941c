//! SQLite storage implementation

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{ArticleRecord, FileRecord, ImageRecord, VectorRecord, WebsiteRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn website_from_row(&self, row: &Row) -> rusqlite::Result<WebsiteRecord> {
        Ok(WebsiteRecord {
            url: row.get(0)?,
            name: row.get(1)?,
            domain: row.get(2)?,
            language: row.get(3)?,
            keywords: decode_list(&row.get::<_, String>(4)?),
            articles: Vec::new(),
            images: Vec::new(),
            files: Vec::new(),
        })
    }

    fn load_website_refs(&self, record: &mut WebsiteRecord) -> StorageResult<()> {
        record.articles = self.ref_column(
            "SELECT article_uid FROM website_articles WHERE website_url = ?1",
            &record.url,
        )?;
        record.images = self.ref_column(
            "SELECT image_url FROM website_images WHERE website_url = ?1",
            &record.url,
        )?;
        record.files = self.ref_column(
            "SELECT file_url FROM website_files WHERE website_url = ?1",
            &record.url,
        )?;
        Ok(())
    }

    fn ref_column(&self, sql: &str, key: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn website_rows(&self, sql: &str, args: &[&dyn ToSql]) -> StorageResult<Vec<WebsiteRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| self.website_from_row(row))?;
        let mut records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        for record in &mut records {
            self.load_website_refs(record)?;
        }
        Ok(records)
    }

    fn article_rows(&self, sql: &str, args: &[&dyn ToSql]) -> StorageResult<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, article_from_row)?;
        let mut records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        for record in &mut records {
            record.images = self.ref_column(
                "SELECT image_url FROM article_images WHERE article_uid = ?1",
                &record.uid,
            )?;
        }
        Ok(records)
    }

    fn replace_refs(&self, delete_sql: &str, insert_sql: &str, key: &str, refs: &[String]) -> StorageResult<()> {
        self.conn.execute(delete_sql, params![key])?;
        for value in refs {
            self.conn.execute(insert_sql, params![key, value])?;
        }
        Ok(())
    }

    fn count(&self, table: &str) -> StorageResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

const ARTICLE_COLUMNS: &str =
    "uid, url, name, text, link, links, keywords, language, domain, source_date";

fn article_from_row(row: &Row) -> rusqlite::Result<ArticleRecord> {
    let source_date: String = row.get(9)?;
    Ok(ArticleRecord {
        uid: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        text: row.get(3)?,
        link: row.get(4)?,
        links: decode_list(&row.get::<_, String>(5)?),
        keywords: decode_list(&row.get::<_, String>(6)?),
        language: row.get(7)?,
        domain: row.get(8)?,
        source_date: DateTime::parse_from_rfc3339(&source_date)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        images: Vec::new(),
    })
}

fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Quoted-token LIKE pattern matching one keyword inside a JSON array column
fn keyword_pattern(keyword: &str) -> String {
    format!("%\"{}\"%", keyword.to_lowercase())
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, 'running')",
            params![now(), config_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = 'completed', finished_at = ?1 WHERE id = ?2",
            params![now(), run_id],
        )?;
        Ok(())
    }

    // ===== Upserts =====

    fn upsert_website(&mut self, record: &WebsiteRecord) -> StorageResult<()> {
        let ts = now();
        self.conn.execute(
            "INSERT INTO websites (url, name, domain, language, keywords, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(url) DO UPDATE SET
                 name = excluded.name,
                 domain = excluded.domain,
                 language = excluded.language,
                 keywords = excluded.keywords,
                 updated_at = excluded.updated_at",
            params![
                record.url,
                record.name,
                record.domain,
                record.language,
                encode_list(&record.keywords),
                ts,
            ],
        )?;

        self.replace_refs(
            "DELETE FROM website_articles WHERE website_url = ?1",
            "INSERT OR IGNORE INTO website_articles (website_url, article_uid) VALUES (?1, ?2)",
            &record.url,
            &record.articles,
        )?;
        self.replace_refs(
            "DELETE FROM website_images WHERE website_url = ?1",
            "INSERT OR IGNORE INTO website_images (website_url, image_url) VALUES (?1, ?2)",
            &record.url,
            &record.images,
        )?;
        self.replace_refs(
            "DELETE FROM website_files WHERE website_url = ?1",
            "INSERT OR IGNORE INTO website_files (website_url, file_url) VALUES (?1, ?2)",
            &record.url,
            &record.files,
        )?;
        Ok(())
    }

    fn upsert_article(&mut self, record: &ArticleRecord) -> StorageResult<()> {
        let ts = now();
        self.conn.execute(
            "INSERT INTO articles
                 (uid, url, name, text, link, links, keywords, language, domain, source_date,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             ON CONFLICT(uid) DO UPDATE SET
                 url = excluded.url,
                 name = excluded.name,
                 text = excluded.text,
                 link = excluded.link,
                 links = excluded.links,
                 keywords = excluded.keywords,
                 language = excluded.language,
                 domain = excluded.domain,
                 source_date = excluded.source_date,
                 updated_at = excluded.updated_at",
            params![
                record.uid,
                record.url,
                record.name,
                record.text,
                record.link,
                encode_list(&record.links),
                encode_list(&record.keywords),
                record.language,
                record.domain,
                record.source_date.to_rfc3339(),
                ts,
            ],
        )?;

        self.replace_refs(
            "DELETE FROM article_images WHERE article_uid = ?1",
            "INSERT OR IGNORE INTO article_images (article_uid, image_url) VALUES (?1, ?2)",
            &record.uid,
            &record.images,
        )?;
        Ok(())
    }

    fn upsert_image(&mut self, record: &ImageRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO images (url, name, domain, keywords, language, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(url) DO UPDATE SET
                 name = excluded.name,
                 domain = excluded.domain,
                 keywords = excluded.keywords,
                 language = excluded.language,
                 updated_at = excluded.updated_at",
            params![
                record.url,
                record.name,
                record.domain,
                encode_list(&record.keywords),
                record.language,
                now(),
            ],
        )?;
        Ok(())
    }

    fn upsert_file(&mut self, record: &FileRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO files (url, name, domain, extension, keywords, language, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(url) DO UPDATE SET
                 name = excluded.name,
                 domain = excluded.domain,
                 extension = excluded.extension,
                 keywords = excluded.keywords,
                 language = excluded.language,
                 updated_at = excluded.updated_at",
            params![
                record.url,
                record.name,
                record.domain,
                record.extension,
                encode_list(&record.keywords),
                record.language,
                now(),
            ],
        )?;
        Ok(())
    }

    fn upsert_vector(&mut self, record: &VectorRecord) -> StorageResult<()> {
        let vector = serde_json::to_string(&record.vector)?;
        self.conn.execute(
            "INSERT INTO website_vectors (uid, url, name, domain, vector, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(uid) DO UPDATE SET
                 url = excluded.url,
                 name = excluded.name,
                 domain = excluded.domain,
                 vector = excluded.vector,
                 updated_at = excluded.updated_at",
            params![record.uid, record.url, record.name, record.domain, vector, now()],
        )?;
        Ok(())
    }

    // ===== Lookups =====

    fn get_website(&self, url: &str) -> StorageResult<Option<WebsiteRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url, name, domain, language, keywords FROM websites WHERE url = ?1",
                params![url],
                |row| self.website_from_row(row),
            )
            .optional()?;

        match record {
            Some(mut record) => {
                self.load_website_refs(&mut record)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn get_article(&self, uid: &str) -> StorageResult<Option<ArticleRecord>> {
        let sql = format!("SELECT {} FROM articles WHERE uid = ?1", ARTICLE_COLUMNS);
        let mut records = self.article_rows(&sql, params![uid])?;
        Ok(records.pop())
    }

    fn get_image(&self, url: &str) -> StorageResult<Option<ImageRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url, name, domain, keywords, language FROM images WHERE url = ?1",
                params![url],
                |row| {
                    Ok(ImageRecord {
                        url: row.get(0)?,
                        name: row.get(1)?,
                        domain: row.get(2)?,
                        keywords: decode_list(&row.get::<_, String>(3)?),
                        language: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn get_file(&self, url: &str) -> StorageResult<Option<FileRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url, name, domain, extension, keywords, language FROM files WHERE url = ?1",
                params![url],
                |row| {
                    Ok(FileRecord {
                        url: row.get(0)?,
                        name: row.get(1)?,
                        domain: row.get(2)?,
                        extension: row.get(3)?,
                        keywords: decode_list(&row.get::<_, String>(4)?),
                        language: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn search_articles(&self, text: &str) -> StorageResult<Vec<ArticleRecord>> {
        let sql = format!(
            "SELECT {} FROM articles WHERE name LIKE ?1 OR text LIKE ?1",
            ARTICLE_COLUMNS
        );
        let pattern = format!("%{}%", text);
        self.article_rows(&sql, params![pattern])
    }

    fn find_articles_by_keyword(&self, keyword: &str) -> StorageResult<Vec<ArticleRecord>> {
        let sql = format!("SELECT {} FROM articles WHERE keywords LIKE ?1", ARTICLE_COLUMNS);
        let pattern = keyword_pattern(keyword);
        self.article_rows(&sql, params![pattern])
    }

    fn find_articles_by_language(&self, language: &str) -> StorageResult<Vec<ArticleRecord>> {
        let sql = format!("SELECT {} FROM articles WHERE language = ?1", ARTICLE_COLUMNS);
        self.article_rows(&sql, params![language])
    }

    fn find_articles_since(&self, since: DateTime<Utc>) -> StorageResult<Vec<ArticleRecord>> {
        let sql = format!("SELECT {} FROM articles WHERE source_date >= ?1", ARTICLE_COLUMNS);
        let cutoff = since.to_rfc3339();
        self.article_rows(&sql, params![cutoff])
    }

    fn find_websites_by_keyword(&self, keyword: &str) -> StorageResult<Vec<WebsiteRecord>> {
        let pattern = keyword_pattern(keyword);
        self.website_rows(
            "SELECT url, name, domain, language, keywords FROM websites WHERE keywords LIKE ?1",
            params![pattern],
        )
    }

    fn find_websites_by_language(&self, language: &str) -> StorageResult<Vec<WebsiteRecord>> {
        self.website_rows(
            "SELECT url, name, domain, language, keywords FROM websites WHERE language = ?1",
            params![language],
        )
    }

    fn sample_websites(&self, n: usize) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM websites ORDER BY RANDOM() LIMIT ?1")?;
        let rows = stmt.query_map(params![n as i64], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ===== Counts =====

    fn count_websites(&self) -> StorageResult<u64> {
        self.count("websites")
    }

    fn count_articles(&self) -> StorageResult<u64> {
        self.count("articles")
    }

    fn count_images(&self) -> StorageResult<u64> {
        self.count("images")
    }

    fn count_files(&self) -> StorageResult<u64> {
        self.count("files")
    }
}
