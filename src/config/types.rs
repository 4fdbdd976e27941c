use serde::Deserialize;

/// Main configuration structure for Gleaner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Regex patterns matched against full URLs; matches are never admitted
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// Crawler behavior configuration
///
/// The cap and eviction defaults are empirical values carried over from
/// long-running crawls; they bound memory, they are not correctness knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent crawl workers
    pub workers: u32,

    /// Per-fetch timeout in milliseconds
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum number of pending URLs in the frontier queue
    #[serde(rename = "max-queue-size", default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Visited-set size past which it is cleared wholesale
    #[serde(rename = "max-visited-size", default = "default_max_visited_size")]
    pub max_visited_size: usize,

    /// Fetch attempts allowed per domain before its URLs are skipped
    #[serde(rename = "max-domain-visits", default = "default_max_domain_visits")]
    pub max_domain_visits: u32,

    /// Domain-counter key count past which the counters are cleared wholesale
    #[serde(
        rename = "max-domain-visits-size",
        default = "default_max_domain_visits_size"
    )]
    pub max_domain_visits_size: usize,

    /// How many previously stored websites to sample into the seed set
    #[serde(rename = "reseed-sample-size", default = "default_reseed_sample_size")]
    pub reseed_sample_size: usize,
}

/// Persistent store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Optional embedding-store configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmbeddingConfig {
    /// When false the embedding pipeline is skipped entirely
    #[serde(default)]
    pub enabled: bool,

    /// Path to the word-vector JSON file (word -> fixed-length vector)
    #[serde(rename = "vectors-path", default)]
    pub vectors_path: String,
}

fn default_fetch_timeout_ms() -> u64 {
    4000
}

fn default_max_queue_size() -> usize {
    300
}

fn default_max_visited_size() -> usize {
    1024
}

fn default_max_domain_visits() -> u32 {
    16
}

fn default_max_domain_visits_size() -> usize {
    512
}

fn default_reseed_sample_size() -> usize {
    10
}
