//! Knowledge store: where the corpus lives between runs.
//!
//! The engine never touches storage. The application loads a corpus through
//! a `KnowledgeStore`, builds an engine from it, and saves after learning.
//! On disk the corpus is a JSON object `{ "question": "answer", ... }` in
//! corpus order.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::corpus::{Corpus, Entry};

/// Errors from loading or saving the corpus.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed knowledge file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Trait for corpus persistence backends.
pub trait KnowledgeStore {
    /// Load the persisted corpus. `Ok(None)` means nothing was saved yet.
    fn load(&self) -> Result<Option<Corpus>, StoreError>;
    /// Persist the whole corpus, replacing what was there.
    fn save(&self, corpus: &Corpus) -> Result<(), StoreError>;
    /// Human-readable location for logs and messages.
    fn describe(&self) -> String;
}

/// The built-in FAQ seed set used on first run.
pub fn default_faqs() -> Corpus {
    [
        Entry::new("What is your return policy?", "You can return products within 7 days."),
        Entry::new("How can I contact support?", "You can contact support via email or phone."),
        Entry::new("Do you offer home delivery?", "Yes, we provide home delivery all over Pakistan."),
        Entry::new(
            "What payment methods are accepted?",
            "We accept cash, debit card, and online transfer.",
        ),
        Entry::new("Where are you located?", "We are located in Karachi, Pakistan."),
    ]
    .into_iter()
    .collect()
}

/// Load from `store`, falling back to `seed` when nothing is stored, the
/// stored corpus is empty, or loading fails.
///
/// Load failures are logged, not returned: a broken file must not stop the
/// assistant from answering. The broken file itself is left alone; stores
/// must not overwrite data they could not read (see `JsonFileStore::save`).
pub fn load_or_seed(store: &dyn KnowledgeStore, seed: Corpus) -> Corpus {
    match store.load() {
        Ok(Some(corpus)) if !corpus.is_empty() => {
            info!("loaded {} entries from {}", corpus.len(), store.describe());
            corpus
        }
        Ok(_) => {
            info!("no stored entries in {}, using {} seed entries", store.describe(), seed.len());
            seed
        }
        Err(e) => {
            warn!("could not load knowledge store, using seed entries (the stored file is kept): {e}");
            seed
        }
    }
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    /// First free `<name>.bad`, `<name>.bad.1`, ... next to the store file.
    fn backup_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "knowledge".into());
        let mut n = 0;
        loop {
            let candidate = match n {
                0 => format!("{name}.bad"),
                _ => format!("{name}.bad.{n}"),
            };
            let path = self.path.with_file_name(candidate);
            if !path.exists() {
                return path;
            }
            n += 1;
        }
    }

    /// Make sure saving cannot destroy entries we failed to read.
    ///
    /// A malformed file is moved aside; a file that cannot be read at all
    /// blocks the save.
    fn set_aside_unreadable(&self) -> Result<(), StoreError> {
        match self.load() {
            Ok(_) => Ok(()),
            Err(StoreError::Malformed { reason, .. }) => {
                let backup = self.backup_path();
                std::fs::rename(&self.path, &backup).map_err(|e| self.io_error(e))?;
                warn!(
                    "{} was not valid ({reason}); moved it to {} before saving",
                    self.path.display(),
                    backup.display()
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl KnowledgeStore for JsonFileStore {
    fn load(&self) -> Result<Option<Corpus>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let map: Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| self.malformed(e.to_string()))?;

        let mut entries = Vec::with_capacity(map.len());
        for (question, value) in map {
            let Value::String(answer) = value else {
                return Err(self.malformed(format!("answer for {question:?} is not a string")));
            };
            entries.push(Entry::new(question, answer));
        }
        Ok(Some(entries.into_iter().collect()))
    }

    fn save(&self, corpus: &Corpus) -> Result<(), StoreError> {
        let map: Map<String, Value> = corpus
            .iter()
            .map(|e| (e.question.clone(), Value::String(e.answer.clone())))
            .collect();
        let json = serde_json::to_string_pretty(&map).map_err(|e| self.malformed(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        self.set_aside_unreadable()?;

        // Write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        info!("saved {} entries to {}", corpus.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store. Nothing survives the process; used in tests and for
/// `--no-persist` sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    corpus: std::cell::RefCell<Option<Corpus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corpus(corpus: Corpus) -> Self {
        Self {
            corpus: std::cell::RefCell::new(Some(corpus)),
        }
    }

    /// Last saved corpus.
    pub fn snapshot(&self) -> Option<Corpus> {
        self.corpus.borrow().clone()
    }
}

impl KnowledgeStore for MemoryStore {
    fn load(&self) -> Result<Option<Corpus>, StoreError> {
        Ok(self.corpus.borrow().clone())
    }

    fn save(&self, corpus: &Corpus) -> Result<(), StoreError> {
        *self.corpus.borrow_mut() = Some(corpus.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
