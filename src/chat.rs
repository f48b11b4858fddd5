//! Chat session: the ask / teach-me interaction, independent of any UI.
//!
//! Two states:
//! - `AwaitingQuestion` → input is matched; an unknown question moves to
//!   `AwaitingTaughtAnswer`.
//! - `AwaitingTaughtAnswer` → input is the answer for the remembered
//!   question; it is learned, saved, and the session returns to
//!   `AwaitingQuestion`.

use tracing::warn;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::store::{KnowledgeStore, StoreError};

/// Typed while teaching to abandon the pending question.
pub const SKIP_COMMAND: &str = "/skip";

/// Where the conversation is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    AwaitingQuestion,
    AwaitingTaughtAnswer { question: String },
}

/// What the session says back.
#[derive(Debug)]
pub enum Reply {
    /// Confident match.
    Answer { text: String, score: f32 },
    /// No confident match; the next input will be taken as the answer.
    TeachMe { question: String, score: f32 },
    /// Teaching: blank input, still waiting for an answer.
    NeedAnswer { question: String },
    /// Teaching abandoned.
    Skipped,
    /// No confident match, and the question has no words to learn it by.
    CannotLearn { question: String },
    /// Learned and saved.
    Learned { question: String },
    /// Learned for this session, but the save failed.
    LearnedNotSaved { question: String, error: StoreError },
}

impl Reply {
    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Reply::Answer { text, .. } => text.clone(),
            Reply::TeachMe { .. } => format!(
                "Sorry, I don't know the answer to that. Please teach me the answer (or type {SKIP_COMMAND}):"
            ),
            Reply::NeedAnswer { .. } => {
                format!("Please type the answer, or {SKIP_COMMAND} to cancel.")
            }
            Reply::Skipped => "Okay, never mind. Ask me something else.".into(),
            Reply::CannotLearn { .. } => {
                "Sorry, I don't know that, and I can't learn it either. Try asking with more specific words.".into()
            }
            Reply::Learned { .. } => "Thanks! I learned something new.".into(),
            Reply::LearnedNotSaved { error, .. } => format!(
                "Thanks! I learned something new, but could not save it ({error}). It will be forgotten when I exit."
            ),
        }
    }
}

/// A running conversation: the current engine handle, the store to save
/// learned answers to, and the interaction state.
pub struct ChatSession {
    engine: Engine,
    store: Box<dyn KnowledgeStore>,
    state: ChatState,
}

impl ChatSession {
    pub fn new(engine: Engine, store: Box<dyn KnowledgeStore>) -> Self {
        Self {
            engine,
            store,
            state: ChatState::AwaitingQuestion,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Handle one line of user input. Blank questions get no reply.
    pub fn handle(&mut self, input: &str) -> Option<Reply> {
        let input = input.trim();
        match std::mem::replace(&mut self.state, ChatState::AwaitingQuestion) {
            ChatState::AwaitingQuestion => {
                if input.is_empty() {
                    return None;
                }
                Some(self.ask(input))
            }
            ChatState::AwaitingTaughtAnswer { question } => Some(self.teach(question, input)),
        }
    }

    fn ask(&mut self, question: &str) -> Reply {
        let result = self.engine.ask(question);
        match result.answer {
            Some(text) => Reply::Answer {
                text,
                score: result.score,
            },
            None if !self.engine.can_learn(question) => Reply::CannotLearn {
                question: question.to_string(),
            },
            None => {
                self.state = ChatState::AwaitingTaughtAnswer {
                    question: question.to_string(),
                };
                Reply::TeachMe {
                    question: question.to_string(),
                    score: result.score,
                }
            }
        }
    }

    fn teach(&mut self, question: String, answer: &str) -> Reply {
        if answer.eq_ignore_ascii_case(SKIP_COMMAND) {
            return Reply::Skipped;
        }
        if answer.is_empty() {
            self.state = ChatState::AwaitingTaughtAnswer {
                question: question.clone(),
            };
            return Reply::NeedAnswer { question };
        }

        self.engine = match self.engine.learn(&question, answer) {
            Ok(engine) => engine,
            Err(EngineError::UnsearchableQuestion(_)) => return Reply::CannotLearn { question },
            Err(e) => {
                warn!("could not learn answer for {question:?}: {e}");
                return Reply::Skipped;
            }
        };

        match self.store.save(self.engine.corpus()) {
            Ok(()) => Reply::Learned { question },
            Err(error) => {
                warn!("learned answer not persisted: {error}");
                Reply::LearnedNotSaved { question, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::matcher::Threshold;
    use crate::store::{default_faqs, JsonFileStore, MemoryStore};
    use crate::text::Normalizer;

    /// Store that shares its contents with the test through an `Rc`.
    struct SharedStore(std::rc::Rc<MemoryStore>);

    impl KnowledgeStore for SharedStore {
        fn load(&self) -> Result<Option<Corpus>, StoreError> {
            self.0.load()
        }
        fn save(&self, corpus: &Corpus) -> Result<(), StoreError> {
            self.0.save(corpus)
        }
        fn describe(&self) -> String {
            self.0.describe()
        }
    }

    fn engine() -> Engine {
        Engine::initialize(default_faqs(), Normalizer::english(), Threshold::DEFAULT).unwrap()
    }

    fn session() -> (ChatSession, std::rc::Rc<MemoryStore>) {
        let store = std::rc::Rc::new(MemoryStore::new());
        let session = ChatSession::new(engine(), Box::new(SharedStore(store.clone())));
        (session, store)
    }

    #[test]
    fn blank_question_gets_no_reply() {
        let (mut s, _) = session();
        assert!(s.handle("   ").is_none());
        assert_eq!(s.state(), &ChatState::AwaitingQuestion);
    }

    #[test]
    fn known_question_is_answered() {
        let (mut s, _) = session();
        match s.handle("Where are you located?") {
            Some(Reply::Answer { text, score }) => {
                assert_eq!(text, "We are located in Karachi, Pakistan.");
                assert!(score > 0.99);
            }
            other => panic!("expected Answer, got {other:?}"),
        }
        assert_eq!(s.state(), &ChatState::AwaitingQuestion);
    }

    #[test]
    fn teach_flow_learns_and_saves() {
        let (mut s, store) = session();

        let reply = s.handle("Are you open on Sundays?").unwrap();
        assert!(matches!(reply, Reply::TeachMe { .. }));
        assert_eq!(
            s.state(),
            &ChatState::AwaitingTaughtAnswer {
                question: "Are you open on Sundays?".into()
            }
        );

        let reply = s.handle("No, we are closed on Sundays.").unwrap();
        assert!(matches!(reply, Reply::Learned { .. }));
        assert_eq!(s.state(), &ChatState::AwaitingQuestion);

        let saved = store.snapshot().unwrap();
        assert_eq!(saved.len(), 6);
        assert_eq!(saved.get(5).unwrap().answer, "No, we are closed on Sundays.");

        match s.handle("Are you open on Sundays?") {
            Some(Reply::Answer { text, .. }) => assert_eq!(text, "No, we are closed on Sundays."),
            other => panic!("expected Answer, got {other:?}"),
        }
    }

    #[test]
    fn blank_answer_keeps_waiting() {
        let (mut s, store) = session();
        s.handle("Do you have a loyalty program?");
        let reply = s.handle("").unwrap();
        assert!(matches!(reply, Reply::NeedAnswer { .. }));
        assert!(matches!(s.state(), ChatState::AwaitingTaughtAnswer { .. }));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn skip_abandons_teaching() {
        let (mut s, store) = session();
        s.handle("Do you have a loyalty program?");
        let reply = s.handle("/skip").unwrap();
        assert!(matches!(reply, Reply::Skipped));
        assert_eq!(s.state(), &ChatState::AwaitingQuestion);
        assert!(store.snapshot().is_none());
        assert_eq!(s.engine().corpus().len(), 5);
    }

    #[test]
    fn question_without_searchable_words_is_not_taught() {
        let (mut s, store) = session();
        for question in ["What is it?", "x?"] {
            match s.handle(question) {
                Some(Reply::CannotLearn { question: q }) => assert_eq!(q, question),
                other => panic!("expected CannotLearn for {question:?}, got {other:?}"),
            }
            assert_eq!(s.state(), &ChatState::AwaitingQuestion);
        }
        // The next line is a fresh question, not a taught answer
        assert!(matches!(s.handle("It is a shop."), Some(Reply::TeachMe { .. })));
        assert!(store.snapshot().is_none());
        assert_eq!(s.engine().corpus().len(), 5);
    }

    #[test]
    fn unsearchable_pending_question_is_refused_at_teach_time() {
        let (mut s, store) = session();
        s.state = ChatState::AwaitingTaughtAnswer {
            question: "What is it?".into(),
        };
        match s.handle("It is a shop.") {
            Some(Reply::CannotLearn { question }) => assert_eq!(question, "What is it?"),
            other => panic!("expected CannotLearn, got {other:?}"),
        }
        assert_eq!(s.state(), &ChatState::AwaitingQuestion);
        assert!(store.snapshot().is_none());
        assert_eq!(s.engine().corpus().len(), 5);
    }

    #[test]
    fn teaching_over_malformed_store_keeps_original_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("faqs.json");
        let original = r#"{"My custom question?": "My answer", }"#;
        std::fs::write(&path, original).unwrap();

        let store = JsonFileStore::new(&path);
        let corpus = crate::store::load_or_seed(&store, default_faqs());
        assert_eq!(corpus, default_faqs());
        let engine = Engine::initialize(corpus, Normalizer::english(), Threshold::DEFAULT).unwrap();
        let mut s = ChatSession::new(engine, Box::new(store));

        s.handle("Is there parking?");
        assert!(matches!(s.handle("Yes, behind the store."), Some(Reply::Learned { .. })));

        let kept = std::fs::read_to_string(dir.path().join("faqs.json.bad")).unwrap();
        assert!(kept.contains("My custom question?"));
        let saved = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(saved.len(), 6);
    }

    #[test]
    fn save_failure_keeps_learned_answer_in_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = JsonFileStore::new(blocker.join("faqs.json"));
        let mut s = ChatSession::new(engine(), Box::new(store));

        s.handle("Is there parking?");
        let reply = s.handle("Yes, free parking behind the store.").unwrap();
        assert!(matches!(reply, Reply::LearnedNotSaved { .. }));
        assert!(reply.message().contains("could not save"));

        match s.handle("Is there parking?") {
            Some(Reply::Answer { text, .. }) => assert_eq!(text, "Yes, free parking behind the store."),
            other => panic!("expected Answer, got {other:?}"),
        }
    }
}
