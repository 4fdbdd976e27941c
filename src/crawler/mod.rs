//! Crawler module: fetching and crawl orchestration

mod coordinator;
mod fetcher;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_document};
