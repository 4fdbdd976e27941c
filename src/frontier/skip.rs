//! Skip policy: decides whether a URL is eligible for fetch
//!
//! A pure decision over (url, blacklist, visit counters) with no side
//! effects. It runs twice per URL: once at admission and again, defensively,
//! right before a worker fetches a popped URL, since frontier state may have
//! changed in between.

use crate::url::{domain_of, is_file_url, remove_query};
use crate::ConfigError;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Scheme markers that disqualify a URL outright
const DISALLOWED_MARKERS: &[&str] = &["javascript:", "mailto:", "tel:"];

/// Non-document extensions (media, scripts, styles, source maps)
const SKIPPED_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".map", ".svg", ".ico", ".gif", ".bmp", ".png", ".jpg", ".jpeg",
];

/// Compiled blacklist patterns, matched against full URLs
#[derive(Debug, Default)]
pub struct Blacklist {
    patterns: Vec<Regex>,
}

impl Blacklist {
    /// Compiles the configured patterns; fails on the first invalid one
    pub fn from_patterns(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// Returns true when any pattern matches at the start of the URL
    pub fn matches(&self, url: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.find(url).is_some_and(|m| m.start() == 0))
    }
}

/// The admission/skip decision for the frontier
#[derive(Debug)]
pub struct SkipPolicy {
    blacklist: Blacklist,
    max_domain_visits: u32,
}

impl SkipPolicy {
    pub fn new(blacklist: Blacklist, max_domain_visits: u32) -> Self {
        Self {
            blacklist,
            max_domain_visits,
        }
    }

    /// Decides whether `url` should be skipped.
    ///
    /// The check is applied to the URL as given and to its query-stripped
    /// form; either match skips it.
    pub fn should_skip(
        &self,
        url: &str,
        visited: &HashSet<String>,
        domain_visits: &HashMap<String, u32>,
    ) -> bool {
        self.check_one(url, visited, domain_visits)
            || self.check_one(&remove_query(url), visited, domain_visits)
    }

    fn check_one(
        &self,
        url: &str,
        visited: &HashSet<String>,
        domain_visits: &HashMap<String, u32>,
    ) -> bool {
        if self.blacklist.matches(url) {
            return true;
        }

        if visited.contains(url) {
            return true;
        }

        if DISALLOWED_MARKERS.iter().any(|m| url.contains(m)) {
            return true;
        }

        let low = url.to_lowercase();
        if is_file_url(&low) || SKIPPED_EXTENSIONS.iter().any(|ext| low.ends_with(ext)) {
            return true;
        }

        if url == "http://" || url == "https://" {
            return true;
        }

        if url.len() <= 8 {
            return true;
        }

        if domain_visits.get(&domain_of(url)).copied().unwrap_or(0) >= self.max_domain_visits {
            return true;
        }

        false
    }
}
