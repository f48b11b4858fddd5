//! TF-IDF embedding provider: pure Rust.
//!
//! Fits a vocabulary and smoothed IDF weights over a corpus of normalized
//! questions, and produces sparse TF-IDF vectors normalized to unit length.
//!
//! Weighting: raw term count × `ln((1 + n) / (1 + df)) + 1`, then L2.
//! Terms are runs of word characters (alphanumerics and `_`) of at least two
//! chars, so `hello…` yields `hello` and single letters are ignored.

use std::collections::{HashMap, HashSet};

use super::{Embedding, EmbeddingProvider};
use crate::text::NormalizedText;

/// Minimum token length (in chars) that enters the vocabulary.
const MIN_TOKEN_CHARS: usize = 2;

/// TF-IDF embedding provider.
///
/// Immutable once fitted: a new corpus means a new provider.
#[derive(Debug, Clone)]
pub struct TfIdfProvider {
    /// term → dimension index, in first-seen order
    vocabulary: HashMap<String, usize>,
    /// IDF weight per dimension
    idf: Vec<f32>,
}

impl TfIdfProvider {
    /// Fit over a corpus of normalized documents.
    ///
    /// An empty corpus yields a provider with no dimensions; every embedding
    /// it produces is the zero vector.
    pub fn fit(documents: &[NormalizedText]) -> Self {
        let n = documents.len() as f32;

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for doc in documents {
            let unique: HashSet<&str> = terms(doc).collect();
            // Iterate in token order so dimension numbering is deterministic
            for term in terms(doc) {
                if !vocabulary.contains_key(term) {
                    vocabulary.insert(term.to_string(), vocabulary.len());
                    doc_freq.push(0);
                }
            }
            for term in unique {
                doc_freq[vocabulary[term]] += 1;
            }
        }

        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    /// Dimension of a term, if it is in the fitted vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// IDF weight of a term, if known.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_index(term).map(|i| self.idf[i])
    }
}

impl EmbeddingProvider for TfIdfProvider {
    fn embed(&self, text: &NormalizedText) -> Embedding {
        let mut tf: HashMap<usize, f32> = HashMap::new();
        for term in terms(text) {
            // Out-of-vocabulary terms never add a dimension
            if let Some(idx) = self.term_index(term) {
                *tf.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector =
            Embedding::from_pairs(tf.into_iter().map(|(idx, count)| (idx, count * self.idf[idx])));
        vector.normalize();
        vector
    }

    fn dimensions(&self) -> usize {
        self.idf.len()
    }
}

/// Vectorizer terms of a normalized text.
fn terms(text: &NormalizedText) -> impl Iterator<Item = &str> {
    text.as_str()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
}

/// Whether `text` has any term that could enter a vocabulary.
///
/// Text without terms embeds to the zero vector under every fitted provider.
pub fn has_terms(text: &NormalizedText) -> bool {
    terms(text).next().is_some()
}
