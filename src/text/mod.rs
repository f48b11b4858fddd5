//! Text normalization: the shared front end of indexing and querying.
//!
//! Lowercases, strips ASCII punctuation, splits on whitespace and drops
//! English stopwords. The index and every query must go through the same
//! `Normalizer`, which is why `Index` carries the one it was built with.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// NLTK's English stopword list, one word per line.
const BUNDLED_STOPWORDS: &str = include_str!("stopwords_english.txt");

/// A fixed set of stopwords, loaded once at startup.
#[derive(Debug)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// The bundled English list.
    pub fn bundled() -> Self {
        Self {
            words: parse_word_list(BUNDLED_STOPWORDS),
        }
    }

    /// Load a word list from disk (one word per line, `#` starts a comment).
    ///
    /// An unreadable file or a file with no words is `ResourceUnavailable`.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::ResourceUnavailable {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_list(&path.display().to_string(), &content)
    }

    /// Parse a word list from memory. `origin` names it in errors.
    pub fn from_list(origin: &str, content: &str) -> EngineResult<Self> {
        let words = parse_word_list(content);
        if words.is_empty() {
            return Err(EngineError::ResourceUnavailable {
                origin: origin.to_string(),
                reason: "word list contains no words".into(),
            });
        }
        debug!("loaded {} stopwords from {origin}", words.len());
        Ok(Self { words })
    }

    /// Configured file if given, otherwise the bundled list.
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::bundled()),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn parse_word_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

/// Normalized text: lowercase tokens joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text normalizer. Cheap to clone; the stopword set is shared.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: Arc<Stopwords>,
}

impl Normalizer {
    pub fn new(stopwords: Stopwords) -> Self {
        Self {
            stopwords: Arc::new(stopwords),
        }
    }

    /// Normalizer over the bundled English stopwords.
    pub fn english() -> Self {
        Self::new(Stopwords::bundled())
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Lowercase, strip ASCII punctuation, drop stopwords.
    ///
    /// Text made only of stopwords and punctuation normalizes to the empty
    /// string, which is valid input everywhere downstream.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        let kept: Vec<&str> = cleaned
            .split_whitespace()
            .filter(|w| !self.stopwords.contains(w))
            .collect();

        NormalizedText(kept.join(" "))
    }
}
