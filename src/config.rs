//! Assistant configuration, loaded from YAML.
//!
//! Every field is optional. A missing file means defaults; an explicitly
//! requested file that is missing is an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::corpus::{Corpus, Entry};
use crate::error::EngineResult;
use crate::matcher::Threshold;
use crate::store::default_faqs;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "faqbot.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Minimum similarity for a confident answer.
    pub threshold: f32,
    /// Where learned answers are kept.
    pub store_path: PathBuf,
    /// Custom stopword list; the bundled English list when unset.
    pub stopwords_path: Option<PathBuf>,
    /// First line of the chat transcript.
    pub greeting: String,
    /// Entries used when the store is empty or unreadable.
    pub seed_faqs: Option<Vec<Entry>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: Threshold::DEFAULT.value(),
            store_path: PathBuf::from("faqs.json"),
            stopwords_path: None,
            greeting: "Hello! Ask me any FAQ question.".into(),
            seed_faqs: None,
        }
    }
}

impl Config {
    pub fn from_yaml(path: &Path, yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading config from {}", path.display());
        Self::from_yaml(path, &content)
    }

    /// Explicit path if given; otherwise `faqbot.yaml` in `dir` if it exists;
    /// otherwise defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let conventional = dir.join(DEFAULT_CONFIG_FILE);
        if conventional.is_file() {
            Self::from_file(&conventional)
        } else {
            Ok(Self::default())
        }
    }

    pub fn threshold(&self) -> EngineResult<Threshold> {
        Threshold::new(self.threshold)
    }

    /// Configured seed entries, or the built-in FAQ set.
    pub fn seed_corpus(&self) -> Corpus {
        match &self.seed_faqs {
            Some(entries) if !entries.is_empty() => entries.iter().cloned().collect(),
            _ => default_faqs(),
        }
    }
}
