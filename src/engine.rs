//! Engine handle: a corpus and the index built from it, kept together.
//!
//! The handle is immutable. `learn` returns a new handle over the extended
//! corpus with a freshly built index, so an index can never be queried
//! against a corpus it was not built from.

use std::sync::Arc;

use tracing::info;

use crate::corpus::{Corpus, Entry};
use crate::embedding::tfidf::has_terms;
use crate::error::{EngineError, EngineResult};
use crate::index::Index;
use crate::matcher::{self, MatchResult, Ranked, Threshold};
use crate::text::Normalizer;

#[derive(Debug, Clone)]
pub struct Engine {
    corpus: Arc<Corpus>,
    index: Arc<Index>,
    threshold: Threshold,
}

impl Engine {
    /// Build the first index over `corpus`.
    pub fn initialize(corpus: Corpus, normalizer: Normalizer, threshold: Threshold) -> EngineResult<Self> {
        let index = Index::build(&corpus, normalizer)?;
        info!(
            entries = corpus.len(),
            dimensions = index.dimensions(),
            %threshold,
            "engine initialized"
        );
        Ok(Self {
            corpus: Arc::new(corpus),
            index: Arc::new(index),
            threshold,
        })
    }

    /// Match a question against the corpus.
    pub fn ask(&self, text: &str) -> MatchResult {
        matcher::match_query(text, &self.index, &self.corpus, self.threshold)
    }

    /// Top `k` candidates with their scores, best first.
    pub fn top(&self, text: &str, k: usize) -> Vec<(Ranked, &Entry)> {
        matcher::rank(text, &self.index, k)
            .into_iter()
            .filter_map(|r| self.corpus.get(r.position).map(|e| (r, e)))
            .collect()
    }

    /// Whether `question` has words an index could match on. Questions
    /// without any (only stopwords, punctuation or single letters) cannot
    /// be learned.
    pub fn can_learn(&self, question: &str) -> bool {
        has_terms(&self.index.normalizer().normalize(question))
    }

    /// Add (or re-answer) a question and rebuild.
    ///
    /// `self` stays valid and unchanged; callers switch to the returned
    /// handle for subsequent questions.
    pub fn learn(&self, question: &str, answer: &str) -> EngineResult<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() {
            return Err(EngineError::EmptyEntry("question"));
        }
        if answer.is_empty() {
            return Err(EngineError::EmptyEntry("answer"));
        }

        let mut corpus = (*self.corpus).clone();
        let position = corpus.upsert(Entry::new(question, answer));
        let index = self.index.rebuild(&corpus)?;
        if index.embed_query(question).is_zero() {
            return Err(EngineError::UnsearchableQuestion(question.to_string()));
        }

        info!(
            position,
            entries = corpus.len(),
            generation = index.generation(),
            "learned new answer"
        );

        Ok(Self {
            corpus: Arc::new(corpus),
            index: Arc::new(index),
            threshold: self.threshold,
        })
    }

    /// Same corpus and index, different threshold.
    pub fn with_threshold(&self, threshold: Threshold) -> Self {
        Self {
            corpus: Arc::clone(&self.corpus),
            index: Arc::clone(&self.index),
            threshold,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::default_faqs;

    fn engine() -> Engine {
        Engine::initialize(default_faqs(), Normalizer::english(), Threshold::DEFAULT).unwrap()
    }

    #[test]
    fn initialize_rejects_empty_corpus() {
        let err = Engine::initialize(Corpus::new(), Normalizer::english(), Threshold::DEFAULT).unwrap_err();
        assert!(matches!(err, EngineError::EmptyCorpus));
    }

    #[test]
    fn ask_default_scenarios() {
        let e = engine();
        let hit = e.ask("How do I return an item?");
        assert_eq!(hit.answer.as_deref(), Some("You can return products within 7 days."));
        assert!(hit.score >= 0.5);

        let miss = e.ask("what is the weather today");
        assert!(miss.is_unknown());
        assert!(miss.score < 0.5);

        assert!(e.ask("").is_unknown());
    }

    #[test]
    fn learn_round_trip() {
        let before = engine();
        let question = "What is the weather today?";
        assert!(before.ask(question).is_unknown());

        let after = before.learn(question, "Sunny in Karachi.").unwrap();
        let result = after.ask(question);
        assert_eq!(result.answer.as_deref(), Some("Sunny in Karachi."));
        assert!((result.score - 1.0).abs() < 1e-5);
        assert_eq!(result.position, Some(5));
        assert_eq!(after.index().len(), after.corpus().len());
        assert_eq!(after.index().generation(), 1);
    }

    #[test]
    fn learn_leaves_old_handle_untouched() {
        let before = engine();
        let after = before.learn("Do you sell gift cards?", "Yes, in store.").unwrap();
        assert_eq!(before.corpus().len(), 5);
        assert_eq!(before.index().len(), 5);
        assert!(before.ask("Do you sell gift cards?").is_unknown());
        assert_eq!(after.corpus().len(), 6);
    }

    #[test]
    fn learn_existing_question_replaces_answer() {
        let e = engine()
            .learn("What is your return policy?", "Returns accepted within 14 days.")
            .unwrap();
        assert_eq!(e.corpus().len(), 5);
        let result = e.ask("What is your return policy?");
        assert_eq!(result.answer.as_deref(), Some("Returns accepted within 14 days."));
    }

    #[test]
    fn learn_rejects_blank_fields() {
        let e = engine();
        assert!(matches!(e.learn("  ", "a"), Err(EngineError::EmptyEntry("question"))));
        assert!(matches!(e.learn("q", ""), Err(EngineError::EmptyEntry("answer"))));
    }

    #[test]
    fn learn_rejects_question_without_searchable_words() {
        let e = engine();
        for question in ["What is it?", "x?", "…"] {
            assert!(!e.can_learn(question));
            match e.learn(question, "It is a shop.") {
                Err(EngineError::UnsearchableQuestion(q)) => assert_eq!(q, question),
                other => panic!("expected UnsearchableQuestion for {question:?}, got {other:?}"),
            }
        }
        assert!(e.can_learn("Is there parking?"));
        assert_eq!(e.corpus().len(), 5);
    }

    #[test]
    fn learn_keeps_threshold() {
        let e = engine().with_threshold(Threshold::new(0.9).unwrap());
        let learned = e.learn("Any discounts?", "Not right now.").unwrap();
        assert_eq!(learned.threshold().value(), 0.9);
    }

    #[test]
    fn top_returns_entries_best_first() {
        let e = engine();
        let top = e.top("contact support by email", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].1.question, "How can I contact support?");
        assert!(top[0].0.score >= top[1].0.score);
    }
}
