//! Word-vector embedding lookup
//!
//! A read-only table of word -> fixed-length vector, loaded once at startup
//! from a JSON file and shared by the workers. Embedding a text tries the
//! whole value (with casing fallbacks), then averages per-word vectors,
//! then averages character-bigram vectors. A text with no usable vector
//! simply produces nothing; embedding never fails a crawl step.

use crate::url::stable_uid;
use crate::{GleanerError, Result};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// Immutable word-vector table
pub struct EmbeddingTable {
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    /// Loads the vector table from a JSON file mapping words to vectors
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_str(&raw)
            .map_err(|e| GleanerError::Embedding(format!("invalid vectors file: {}", e)))?;
        tracing::info!("Loaded {} word vectors", vectors.len());
        Ok(Self { vectors })
    }

    /// Number of words in the table
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Looks up a single token, probing casing variants; vectors shorter
    /// than two components are treated as absent
    fn lookup(&self, word: &str) -> Option<&[f32]> {
        let variants = [
            word.to_string(),
            word.to_lowercase(),
            title_case(word),
            word.to_uppercase(),
        ];
        for variant in &variants {
            if let Some(vector) = self.vectors.get(variant) {
                if vector.len() > 1 {
                    return Some(vector);
                }
            }
        }
        None
    }

    /// Embeds a text into a single vector.
    ///
    /// Tries the whole text first, then the average of its word vectors,
    /// then the average of its character-bigram vectors.
    pub fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if let Some(vector) = self.lookup(text) {
            return Some(vector.to_vec());
        }

        if text.contains(' ') {
            let vectors: Vec<&[f32]> = text.split(' ').filter_map(|word| self.lookup(word)).collect();
            if !vectors.is_empty() {
                return Some(average(&vectors));
            }
        }

        let pairs = bigrams(text);
        let vectors: Vec<&[f32]> = pairs.iter().filter_map(|pair| self.lookup(pair)).collect();
        if vectors.is_empty() {
            None
        } else {
            Some(average(&vectors))
        }
    }

    /// Embeds a text and pairs the vector with the text's deterministic UID
    pub fn embed_with_id(&self, text: &str) -> Option<(Uuid, Vec<f32>)> {
        self.embed(text).map(|vector| (stable_uid(text), vector))
    }

    #[cfg(test)]
    fn from_pairs(pairs: &[(&str, &[f32])]) -> Self {
        Self {
            vectors: pairs
                .iter()
                .map(|(word, vector)| (word.to_string(), vector.to_vec()))
                .collect(),
        }
    }
}

/// Element-wise mean over the first vector's dimensionality
fn average(vectors: &[&[f32]]) -> Vec<f32> {
    let dims = vectors[0].len();
    let mut result = vec![0.0; dims];
    for vector in vectors {
        for (i, slot) in result.iter_mut().enumerate() {
            *slot += vector.get(i).copied().unwrap_or(0.0);
        }
    }
    for slot in &mut result {
        *slot /= vectors.len() as f32;
    }
    result
}

/// Consecutive character pairs ("hello" -> ["he", "ll", "o"])
fn bigrams(text: &str) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}
