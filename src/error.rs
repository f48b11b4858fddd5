//! Engine error types.

/// Errors from building or querying the matching engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The stopword list could not be obtained. Fatal: matching on
    /// unfiltered text would silently change every score.
    #[error("stopword list unavailable ({origin}): {reason}")]
    ResourceUnavailable { origin: String, reason: String },

    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    #[error("confidence threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("cannot learn an entry with an empty {0}")]
    EmptyEntry(&'static str),

    /// The question has no searchable words, so no query could ever match it.
    #[error("question {0:?} has no searchable words")]
    UnsearchableQuestion(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
