//! Crawl frontier: the shared, bounded, deduplicated, randomized set of
//! pending URLs plus the visit bookkeeping that governs admission
//!
//! All three collections (`queue`, `visited`, per-domain counters) live
//! behind a single mutex so `admit`, `pop`, `mark_visited`, and eviction are
//! each atomic with respect to concurrent workers. `pop` removes-on-read, so
//! no URL is ever handed to two workers. No frontier operation performs I/O
//! and no lock is held across a fetch.

mod skip;

pub use skip::{Blacklist, SkipPolicy};

use crate::config::CrawlerConfig;
use crate::url::domain_of;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Size caps for the frontier collections.
///
/// `visited` and the domain counters are lossy caches: once past their caps
/// they are cleared wholesale, trading occasional re-fetch for deterministic
/// bounded memory.
#[derive(Debug, Clone, Copy)]
pub struct FrontierLimits {
    pub max_queue_size: usize,
    pub max_visited_size: usize,
    pub max_domain_visits_size: usize,
}

impl From<&CrawlerConfig> for FrontierLimits {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_queue_size: config.max_queue_size,
            max_visited_size: config.max_visited_size,
            max_domain_visits_size: config.max_domain_visits_size,
        }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: HashSet<String>,
    visited: HashSet<String>,
    visited_domains: HashMap<String, u32>,
}

/// Thread-safe crawl frontier shared by all workers
pub struct Frontier {
    state: Mutex<FrontierState>,
    policy: SkipPolicy,
    limits: FrontierLimits,
}

impl Frontier {
    pub fn new(limits: FrontierLimits, policy: SkipPolicy) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            policy,
            limits,
        }
    }

    /// Admits a discovered URL into the pending queue.
    ///
    /// Returns false when the URL is rejected by the skip policy or silently
    /// dropped because the queue is at capacity (backpressure, not an error).
    pub fn admit(&self, url: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.queue.len() >= self.limits.max_queue_size {
            return false;
        }
        if self
            .policy
            .should_skip(url, &state.visited, &state.visited_domains)
        {
            return false;
        }
        state.queue.insert(url.to_string())
    }

    /// Removes and returns one uniformly-random pending URL.
    ///
    /// Random order spreads load across domains instead of draining one
    /// site's links consecutively.
    pub fn pop(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        if state.queue.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..state.queue.len());
        let url = state.queue.iter().nth(idx).cloned()?;
        state.queue.remove(&url);
        Some(url)
    }

    /// Records an attempted fetch: adds to `visited` and bumps the domain
    /// counter.
    pub fn mark_visited(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.visited.insert(url.to_string());
        *state
            .visited_domains
            .entry(domain_of(url))
            .or_insert(0) += 1;
    }

    /// Wholesale-clears the lossy caches once they exceed their caps.
    ///
    /// Called once per popped item. An exact LRU would recrawl less but costs
    /// bookkeeping this workload does not need.
    pub fn evict_if_oversized(&self) {
        let mut state = self.state.lock().unwrap();
        if state.visited.len() > self.limits.max_visited_size {
            tracing::info!(
                "Visited set exceeded {} entries, clearing",
                self.limits.max_visited_size
            );
            state.visited.clear();
        }
        if state.visited_domains.len() > self.limits.max_domain_visits_size {
            tracing::info!(
                "Domain counters exceeded {} keys, clearing",
                self.limits.max_domain_visits_size
            );
            state.visited_domains.clear();
        }
    }

    /// Defensive re-check before fetching a popped URL; frontier state may
    /// have changed since the URL was admitted.
    pub fn should_skip(&self, url: &str) -> bool {
        let state = self.state.lock().unwrap();
        self.policy
            .should_skip(url, &state.visited, &state.visited_domains)
    }

    /// Number of pending URLs
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Returns whether the pending queue is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().queue.is_empty()
    }

    #[cfg(test)]
    fn visited_len(&self) -> usize {
        self.state.lock().unwrap().visited.len()
    }

    #[cfg(test)]
    fn domain_count(&self, domain: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .visited_domains
            .get(domain)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_frontier(max_queue: usize, max_visited: usize) -> Frontier {
        let limits = FrontierLimits {
            max_queue_size: max_queue,
            max_visited_size: max_visited,
            max_domain_visits_size: 512,
        };
        let policy = SkipPolicy::new(Blacklist::default(), 16);
        Frontier::new(limits, policy)
    }

    #[test]
    fn test_admit_and_pop() {
        let frontier = test_frontier(300, 1024);
        assert!(frontier.admit("https://example.com/page"));
        assert_eq!(frontier.pending(), 1);
        assert_eq!(frontier.pop(), Some("https://example.com/page".to_string()));
        assert!(frontier.is_empty());
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_admit_dedupes() {
        let frontier = test_frontier(300, 1024);
        assert!(frontier.admit("https://example.com/page"));
        assert!(!frontier.admit("https://example.com/page"));
        assert_eq!(frontier.pending(), 1);
    }

    #[test]
    fn test_queue_bounded() {
        let frontier = test_frontier(5, 1024);
        for i in 0..50 {
            frontier.admit(&format!("https://example.com/page-{}", i));
        }
        assert_eq!(frontier.pending(), 5);
    }

    #[test]
    fn test_admit_rejects_skipped() {
        let frontier = test_frontier(300, 1024);
        assert!(!frontier.admit("javascript:void(0)"));
        assert!(!frontier.admit("https://example.com/logo.png"));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_visited_blocks_readmission() {
        let frontier = test_frontier(300, 1024);
        frontier.mark_visited("https://example.com/page");
        assert!(!frontier.admit("https://example.com/page"));
        assert!(!frontier.admit("https://example.com/page?utm=1"));
    }

    #[test]
    fn test_mark_visited_counts_domains() {
        let frontier = test_frontier(300, 1024);
        frontier.mark_visited("https://example.com/a");
        frontier.mark_visited("https://example.com/b");
        assert_eq!(frontier.domain_count("example.com"), 2);
    }

    #[test]
    fn test_eviction_clears_visited() {
        let frontier = test_frontier(300, 3);
        for i in 0..4 {
            frontier.mark_visited(&format!("https://site-{}.com/", i));
        }
        assert_eq!(frontier.visited_len(), 4);
        frontier.evict_if_oversized();
        assert_eq!(frontier.visited_len(), 0);
    }

    #[test]
    fn test_eviction_noop_below_cap() {
        let frontier = test_frontier(300, 1024);
        frontier.mark_visited("https://example.com/a");
        frontier.evict_if_oversized();
        assert_eq!(frontier.visited_len(), 1);
    }

    #[test]
    fn test_no_double_dispatch_under_concurrency() {
        let frontier = Arc::new(test_frontier(300, 1024));
        for i in 0..100 {
            frontier.admit(&format!("https://site-{}.com/page", i));
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let frontier = Arc::clone(&frontier);
            handles.push(std::thread::spawn(move || {
                let mut popped = Vec::new();
                while let Some(url) = frontier.pop() {
                    popped.push(url);
                }
                popped
            }));
        }

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(total, 100, "every admitted URL popped exactly once");
        assert_eq!(all.len(), 100, "no URL returned to two workers");
    }

    #[test]
    fn test_pop_is_randomized() {
        // With 50 URLs, two independent drain orders matching exactly is a
        // 1/50! coincidence; a failure here means pop is deterministic.
        let order = |frontier: &Frontier| {
            for i in 0..50 {
                frontier.admit(&format!("https://site-{}.com/page", i));
            }
            let mut popped = Vec::new();
            while let Some(url) = frontier.pop() {
                popped.push(url);
            }
            popped
        };
        let a = order(&test_frontier(300, 1024));
        let b = order(&test_frontier(300, 1024));
        assert_eq!(a.len(), 50);
        assert_ne!(a, b);
    }
}
