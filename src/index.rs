//! Lexical index: the fitted TF-IDF space plus one vector per question.
//!
//! An `Index` is immutable. It owns the `Normalizer` and the fitted model it
//! was built with, so a query can only ever be projected into the same space
//! as the documents. Learning never patches an index; it builds a new one.

use tracing::debug;

use crate::corpus::Corpus;
use crate::embedding::tfidf::TfIdfProvider;
use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::{EngineError, EngineResult};
use crate::text::{NormalizedText, Normalizer};

#[derive(Debug, Clone)]
pub struct Index {
    normalizer: Normalizer,
    provider: TfIdfProvider,
    /// `vectors[i]` is the question of corpus entry `i`.
    vectors: Vec<Embedding>,
    /// Bumped on every rebuild.
    generation: u64,
}

impl Index {
    /// Build an index over the questions of `corpus`.
    ///
    /// A corpus whose questions all normalize to nothing is accepted; its
    /// vectors are all zero and every query scores 0 against it.
    pub fn build(corpus: &Corpus, normalizer: Normalizer) -> EngineResult<Self> {
        Self::build_generation(corpus, normalizer, 0)
    }

    /// Build a fresh index over `corpus` with the same normalizer and the
    /// next generation number.
    pub fn rebuild(&self, corpus: &Corpus) -> EngineResult<Self> {
        Self::build_generation(corpus, self.normalizer.clone(), self.generation + 1)
    }

    fn build_generation(corpus: &Corpus, normalizer: Normalizer, generation: u64) -> EngineResult<Self> {
        if corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let documents: Vec<NormalizedText> = corpus
            .iter()
            .map(|entry| normalizer.normalize(&entry.question))
            .collect();

        let provider = TfIdfProvider::fit(&documents);
        let vectors: Vec<Embedding> = documents.iter().map(|d| provider.embed(d)).collect();

        debug!(
            generation,
            documents = vectors.len(),
            dimensions = provider.dimensions(),
            "built lexical index"
        );

        Ok(Self {
            normalizer,
            provider,
            vectors,
            generation,
        })
    }

    /// Normalize a query and project it into this index's space.
    pub fn embed_query(&self, text: &str) -> Embedding {
        self.provider.embed(&self.normalizer.normalize(text))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn vectors(&self) -> &[Embedding] {
        &self.vectors
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Always false for a built index; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
