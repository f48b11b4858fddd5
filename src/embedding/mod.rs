//! Embedding infrastructure for question matching.
//!
//! An `EmbeddingProvider` turns normalized text into a sparse vector
//! (TF-IDF today). `cosine_similarity` compares two of them.

pub mod tfidf;

use crate::text::NormalizedText;

/// A sparse embedding: `(dimension, weight)` pairs sorted by dimension,
/// zero weights omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embedding {
    entries: Vec<(usize, f32)>,
}

impl Embedding {
    /// Build from unordered `(dimension, weight)` pairs. Zero weights are
    /// dropped; duplicate dimensions are summed.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f32)>) -> Self {
        let mut entries: Vec<(usize, f32)> = pairs.into_iter().collect();
        entries.sort_by_key(|&(dim, _)| dim);

        let mut merged: Vec<(usize, f32)> = Vec::with_capacity(entries.len());
        for (dim, w) in entries {
            if let Some((last, acc)) = merged.last_mut() {
                if *last == dim {
                    *acc += w;
                    continue;
                }
            }
            merged.push((dim, w));
        }
        merged.retain(|&(_, w)| w != 0.0);
        Self { entries: merged }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    /// Weight at a dimension (0.0 if absent).
    pub fn get(&self, dim: usize) -> f32 {
        self.entries
            .binary_search_by_key(&dim, |&(d, _)| d)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Number of non-zero dimensions.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// True for the all-zero vector.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &Embedding) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (da, wa) = self.entries[i];
            let (db, wb) = other.entries[j];
            if da == db {
                sum += wa * wb;
                i += 1;
                j += 1;
            } else if da < db {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scale to unit length (in-place). The zero vector stays zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.entries.iter_mut() {
                *w /= norm;
            }
        }
    }
}

/// Trait for embedding normalized text into vectors.
pub trait EmbeddingProvider {
    /// Embed normalized text. Unknown tokens contribute nothing.
    fn embed(&self, text: &NormalizedText) -> Embedding;
    /// Dimensionality of the embedding space.
    fn dimensions(&self) -> usize;
}

/// Cosine similarity between two vectors.
///
/// Computes the full formula rather than assuming unit vectors. Returns 0.0
/// when either side is the zero vector, and clamps float drift into [0, 1]
/// (TF-IDF weights are never negative).
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (norm_a * norm_b)).clamp(0.0, 1.0)
}
