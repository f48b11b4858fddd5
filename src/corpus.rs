//! Question/answer entries and the ordered corpus they form.

use serde::{Deserialize, Serialize};

/// One FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub question: String,
    pub answer: String,
}

impl Entry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered FAQ entries. Position `i` is document `i` of any index built
/// from this corpus. Questions are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<Entry>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&Entry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of an exact question.
    pub fn position(&self, question: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.question == question)
    }

    /// Append a new entry, or replace the answer of an existing question in
    /// place. Returns the entry's position.
    pub fn upsert(&mut self, entry: Entry) -> usize {
        match self.position(&entry.question) {
            Some(i) => {
                self.entries[i].answer = entry.answer;
                i
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        }
    }
}

impl FromIterator<Entry> for Corpus {
    /// Later duplicates of a question overwrite the earlier answer.
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for entry in iter {
            corpus.upsert(entry);
        }
        corpus
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
