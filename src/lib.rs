//! faqbot answers FAQ questions by lexical similarity and learns the ones it
//! cannot answer.
//!
//! The matching engine (`text`, `embedding`, `index`, `matcher`, `engine`)
//! is pure and synchronous. `store` persists the corpus, `chat` drives the
//! ask / teach-me conversation, `config` loads settings.

pub mod chat;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod store;
pub mod text;

pub use corpus::{Corpus, Entry};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use matcher::{MatchResult, Threshold};
