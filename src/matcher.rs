//! Matcher: pick the best question for a query, or report "unknown".

use std::fmt;

use crate::corpus::Corpus;
use crate::embedding::cosine_similarity;
use crate::error::{EngineError, EngineResult};
use crate::index::Index;

/// Minimum similarity for a confident answer. Always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f32);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(0.5);

    pub fn new(value: f32) -> EngineResult<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Inclusive: a score equal to the threshold is accepted.
    pub fn accepts(self, score: f32) -> bool {
        score >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Outcome of matching one query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The answer, or `None` when nothing scored at or above the threshold.
    pub answer: Option<String>,
    /// Best cosine similarity [0.0, 1.0].
    pub score: f32,
    /// Corpus position of the best-scoring question, if the query had any
    /// known terms. Set even when the score is below the threshold.
    pub position: Option<usize>,
}

impl MatchResult {
    pub fn unknown(score: f32, position: Option<usize>) -> Self {
        Self {
            answer: None,
            score,
            position,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.answer.is_none()
    }
}

/// One scored corpus position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub position: usize,
    pub score: f32,
}

/// Match `query` against `index`, answering from `corpus`.
///
/// `index` must have been built from `corpus`. Ties go to the earliest
/// corpus position. A query with no known terms is always unknown with
/// score 0, whatever the threshold.
pub fn match_query(query: &str, index: &Index, corpus: &Corpus, threshold: Threshold) -> MatchResult {
    debug_assert_eq!(index.len(), corpus.len(), "index is stale for this corpus");

    let q = index.embed_query(query);
    if q.is_zero() {
        return MatchResult::unknown(0.0, None);
    }

    let mut best: Option<Ranked> = None;
    for (position, doc) in index.vectors().iter().enumerate() {
        let score = cosine_similarity(&q, doc);
        // Strict comparison keeps the first of equal scores
        if best.map_or(true, |b| score > b.score) {
            best = Some(Ranked { position, score });
        }
    }

    let Some(best) = best else {
        return MatchResult::unknown(0.0, None);
    };

    match corpus.get(best.position) {
        Some(entry) if threshold.accepts(best.score) => MatchResult {
            answer: Some(entry.answer.clone()),
            score: best.score,
            position: Some(best.position),
        },
        _ => MatchResult::unknown(best.score, Some(best.position)),
    }
}

/// Top `k` corpus positions by descending score (ties in corpus order).
pub fn rank(query: &str, index: &Index, k: usize) -> Vec<Ranked> {
    let q = index.embed_query(query);
    let mut results: Vec<Ranked> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(position, doc)| Ranked {
            position,
            score: cosine_similarity(&q, doc),
        })
        .collect();

    // Stable sort keeps corpus order among equal scores
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(k);
    results
}
