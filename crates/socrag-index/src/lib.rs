//! In-memory exact-similarity vector index.
//!
//! Entries are `(vector, document)` pairs addressed by their load position;
//! search is a linear scan over dot products. Vectors are expected to be
//! unit length, so the dot product is cosine similarity. Corpora here are
//! small (tens to low thousands of documents), which keeps the scan cheap
//! and the results exact.

use std::cmp::Ordering;

use socrag_core::error::{Error, Result};
use socrag_core::types::Document;

/// `top_k` used when the caller does not specify one.
pub const DEFAULT_TOP_K: usize = 3;

/// One search result: the index's similarity score plus the stored payload.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub score: f32,
    pub document: Document,
}

/// Immutable after `build`; no update or delete operations.
#[derive(Debug)]
pub struct VectorIndex {
    dim: usize,
    entries: Vec<(Vec<f32>, Document)>,
}

impl VectorIndex {
    /// Bulk-load the index. Positions 0..N-1 follow input order and are the
    /// numeric handles tie-breaking relies on. Fails if vectors disagree on
    /// width.
    pub fn build(entries: Vec<(Vec<f32>, Document)>) -> Result<Self> {
        let dim = entries.first().map(|(v, _)| v.len()).unwrap_or(0);
        for (vector, _) in &entries {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    got: vector.len(),
                });
            }
        }
        Ok(Self { dim, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of the stored vectors. Zero for an empty index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn search_default(&self, query: &[f32]) -> Result<Vec<ScoredPoint>> {
        self.search(query, DEFAULT_TOP_K)
    }

    /// Score every entry against `query`, sort by descending score with
    /// exact ties broken by ascending position, and return at most `top_k`
    /// results. `top_k == 0` and an empty index both yield no results.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredPoint>> {
        if top_k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, (vector, _))| (dot(query, vector), pos))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, pos)| ScoredPoint {
                score,
                document: self.entries[pos].1.clone(),
            })
            .collect())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
