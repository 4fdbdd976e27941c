//! Crawl orchestration
//!
//! Seeds the shared frontier from the configured URLs plus a random sample
//! of previously stored websites, then runs a fixed pool of workers that
//! drain it. Workers share one frontier, one storage handle, and one HTTP
//! client; a worker only exits once the frontier is empty and no sibling
//! has a fetch in flight that might still feed it.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_document};
use crate::embedding::EmbeddingTable;
use crate::frontier::{Blacklist, Frontier, FrontierLimits, SkipPolicy};
use crate::page::Page;
use crate::storage::{SqliteStorage, Storage, VectorRecord};
use crate::{GleanerError, Result};
use rand::seq::SliceRandom;
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Main crawler coordinator
pub struct Coordinator {
    config: Arc<Config>,
    frontier: Arc<Frontier>,
    storage: Arc<Mutex<SqliteStorage>>,
    client: Client,
    embeddings: Option<Arc<EmbeddingTable>>,
    run_id: i64,
}

/// Everything a worker needs, cloned once per spawned task
#[derive(Clone)]
struct WorkerShared {
    frontier: Arc<Frontier>,
    storage: Arc<Mutex<SqliteStorage>>,
    client: Client,
    embeddings: Option<Arc<EmbeddingTable>>,
    in_flight: Arc<AtomicUsize>,
    pages_crawled: Arc<AtomicUsize>,
}

impl Coordinator {
    /// Initializes storage, frontier, HTTP client, and the optional
    /// embedding table
    ///
    /// Any failure here (unreachable database, invalid blacklist pattern,
    /// unreadable vectors file) is fatal before a single worker is spawned.
    pub fn new(config: Config, config_hash: &str) -> Result<Self> {
        let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
        let run_id = storage.create_run(config_hash)?;

        let blacklist = Blacklist::from_patterns(&config.blacklist)?;
        let policy = SkipPolicy::new(blacklist, config.crawler.max_domain_visits);
        let frontier = Frontier::new(FrontierLimits::from(&config.crawler), policy);

        let client = build_http_client(&config.crawler)?;

        let embeddings = if config.embedding.enabled {
            let table = EmbeddingTable::load(Path::new(&config.embedding.vectors_path))?;
            Some(Arc::new(table))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            frontier: Arc::new(frontier),
            storage: Arc::new(Mutex::new(storage)),
            client,
            embeddings,
            run_id,
        })
    }

    /// Runs the crawl to completion: seeds the frontier, spawns the worker
    /// pool, joins it, and marks the run completed
    pub async fn run(&self, seeds: Vec<String>) -> Result<()> {
        let sampled = {
            let storage = self.storage.lock().unwrap();
            storage
                .sample_websites(self.config.crawler.reseed_sample_size)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to sample stored websites");
                    Vec::new()
                })
        };

        let mut urls = merge_seeds(seeds, sampled);
        if urls.is_empty() {
            return Err(GleanerError::SeedFile("no seed URLs to crawl".to_string()));
        }
        urls.shuffle(&mut rand::thread_rng());

        let workers = (self.config.crawler.workers as usize).max(1);
        let chunk_size = urls.len().div_ceil(workers).max(1);

        tracing::info!(
            run_id = self.run_id,
            seeds = urls.len(),
            workers,
            "Starting crawl"
        );

        let in_flight = Arc::new(AtomicUsize::new(0));
        let pages_crawled = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(workers);
        for (worker_id, chunk) in urls.chunks(chunk_size).enumerate() {
            let shared = WorkerShared {
                frontier: Arc::clone(&self.frontier),
                storage: Arc::clone(&self.storage),
                client: self.client.clone(),
                embeddings: self.embeddings.clone(),
                in_flight: Arc::clone(&in_flight),
                pages_crawled: Arc::clone(&pages_crawled),
            };
            let chunk = chunk.to_vec();
            handles.push(tokio::spawn(run_worker(worker_id, chunk, shared)));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| GleanerError::WorkerJoin(e.to_string()))?;
        }

        {
            let mut storage = self.storage.lock().unwrap();
            storage.complete_run(self.run_id)?;
            tracing::info!(
                pages = pages_crawled.load(Ordering::SeqCst),
                websites = storage.count_websites()?,
                articles = storage.count_articles()?,
                images = storage.count_images()?,
                files = storage.count_files()?,
                "Crawl completed"
            );
        }
        Ok(())
    }
}

/// Combines configured seeds with sampled website URLs, deduplicated in
/// first-seen order
fn merge_seeds(seeds: Vec<String>, sampled: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(seeds.len() + sampled.len());
    for url in seeds.into_iter().chain(sampled) {
        if !merged.contains(&url) {
            merged.push(url);
        }
    }
    merged
}

/// One worker: admits its seed chunk, then drains the shared frontier.
///
/// The in-flight counter keeps the pool alive while any sibling is mid-
/// fetch: that fetch may admit new links, so an empty queue alone is not a
/// termination condition.
async fn run_worker(worker_id: usize, seeds: Vec<String>, shared: WorkerShared) {
    tracing::debug!(worker_id, seeds = seeds.len(), "Worker started");
    for url in &seeds {
        shared.frontier.admit(url);
    }

    loop {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        match shared.frontier.pop() {
            Some(url) => {
                crawl_url(&url, &shared).await;
                shared.in_flight.fetch_sub(1, Ordering::SeqCst);

                let crawled = shared.pages_crawled.fetch_add(1, Ordering::SeqCst) + 1;
                if crawled % 10 == 0 {
                    tracing::info!(
                        pages = crawled,
                        pending = shared.frontier.pending(),
                        "Progress"
                    );
                }
            }
            None => {
                let was_last = shared.in_flight.fetch_sub(1, Ordering::SeqCst) == 1;
                if was_last && shared.frontier.is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
    tracing::debug!(worker_id, "Worker finished");
}

/// One crawl step: skip-check, fetch, extract, persist, admit discovered
/// links. Every per-URL failure is contained here.
async fn crawl_url(url: &str, shared: &WorkerShared) {
    // State may have changed since the URL was admitted
    if shared.frontier.should_skip(url) {
        return;
    }
    shared.frontier.evict_if_oversized();
    shared.frontier.mark_visited(url);

    tracing::debug!(url, "Fetching");
    let body = match fetch_document(&shared.client, url).await {
        Some(body) => body,
        None => return,
    };

    let page = Page::parse(url, &body);
    persist_page(&page, &shared.storage);
    if let Some(table) = &shared.embeddings {
        embed_page(&page, table, &shared.storage);
    }

    let mut links = page.links;
    links.shuffle(&mut rand::thread_rng());
    for link in &links {
        shared.frontier.admit(link);
    }
}

/// Upserts every record extracted from a page; a failed upsert is logged
/// and the rest still go through
fn persist_page(page: &Page, storage: &Mutex<SqliteStorage>) {
    let mut storage = storage.lock().unwrap();

    for file in &page.files {
        if let Err(e) = storage.upsert_file(file) {
            tracing::warn!(url = %file.url, error = %e, "File upsert failed");
        }
    }
    for image in &page.images {
        if let Err(e) = storage.upsert_image(image) {
            tracing::warn!(url = %image.url, error = %e, "Image upsert failed");
        }
    }
    for article in &page.articles {
        for image in &article.images {
            if let Err(e) = storage.upsert_image(image) {
                tracing::warn!(url = %image.url, error = %e, "Image upsert failed");
            }
        }
        if let Err(e) = storage.upsert_article(&article.record) {
            tracing::warn!(uid = %article.record.uid, error = %e, "Article upsert failed");
        }
    }
    if let Err(e) = storage.upsert_website(&page.website_record()) {
        tracing::warn!(url = %page.url, error = %e, "Website upsert failed");
    }
}

/// Embeds the page's keywords (title when there are none) and stores the
/// vector; failures are logged and swallowed
fn embed_page(page: &Page, table: &EmbeddingTable, storage: &Mutex<SqliteStorage>) {
    let text = if page.keywords.is_empty() {
        page.title.clone().unwrap_or_default()
    } else {
        page.keywords.join(" ")
    };
    if text.is_empty() {
        return;
    }

    let (uid, vector) = match table.embed_with_id(&text) {
        Some(embedded) => embedded,
        None => return,
    };

    let record = VectorRecord {
        uid: uid.to_string(),
        url: page.url.clone(),
        name: page.title.clone(),
        domain: page.domain.clone(),
        vector,
    };
    if let Err(e) = storage.lock().unwrap().upsert_vector(&record) {
        tracing::warn!(url = %page.url, error = %e, "Vector upsert failed");
    }
}

/// Runs a complete crawl with the given configuration and seed URLs
pub async fn run_crawl(config: Config, config_hash: &str, seeds: Vec<String>) -> Result<()> {
    let coordinator = Coordinator::new(config, config_hash)?;
    coordinator.run(seeds).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_seeds_dedupes_preserving_order() {
        let seeds = vec!["https://a.com/".to_string(), "https://b.com/".to_string()];
        let sampled = vec!["https://b.com/".to_string(), "https://c.com/".to_string()];
        assert_eq!(
            merge_seeds(seeds, sampled),
            vec![
                "https://a.com/".to_string(),
                "https://b.com/".to_string(),
                "https://c.com/".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge_seeds_empty() {
        assert!(merge_seeds(Vec::new(), Vec::new()).is_empty());
    }
}
