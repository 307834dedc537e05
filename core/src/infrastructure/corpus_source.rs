// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Training data suppliers.
//!
//! A [`CorpusSource`] yields raw training entries; [`train`] feeds them into a
//! [`Corpus`] and applies the configured [`IngestPolicy`] to malformed ones.
//!
//! Corpus documents (YAML or JSON) share one shape:
//!
//! ```yaml
//! conversations:
//!   - ["Hi", "Hello! How are you today?"]
//!   - ["Good morning!", "Morning! Sleep well?", "Yes, thanks.", "Glad to hear it."]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::IngestPolicy;
use crate::infrastructure::corpus_store::{Corpus, IngestError};

const BUILTIN_CORPUS: &str = include_str!("../../assets/default-corpus.yaml");

#[derive(Debug, Error)]
pub enum CorpusSourceError {
    #[error("Failed to read corpus file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML corpus: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON corpus: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported corpus format {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Corpus entry {entry} rejected: {source}")]
    Rejected {
        entry: usize,
        #[source]
        source: IngestError,
    },
}

/// One unit of training data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingEntry {
    Pair { stimulus: String, response: String },
    /// Statements where each answers the previous one
    Conversation(Vec<String>),
}

impl From<Vec<String>> for TrainingEntry {
    fn from(mut statements: Vec<String>) -> Self {
        if statements.len() == 2 {
            let response = statements.pop().unwrap_or_default();
            let stimulus = statements.pop().unwrap_or_default();
            TrainingEntry::Pair { stimulus, response }
        } else {
            TrainingEntry::Conversation(statements)
        }
    }
}

/// On-disk corpus document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusDocument {
    #[serde(default)]
    pub conversations: Vec<Vec<String>>,
}

impl CorpusDocument {
    pub fn into_entries(self) -> Vec<TrainingEntry> {
        self.conversations.into_iter().map(TrainingEntry::from).collect()
    }
}

/// Supplier of training data, consulted once at startup
pub trait CorpusSource: Send + Sync {
    /// Human-readable origin for logs
    fn name(&self) -> String;

    fn load(&self) -> Result<Vec<TrainingEntry>, CorpusSourceError>;
}

/// The corpus shipped with the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCorpus;

impl CorpusSource for BuiltinCorpus {
    fn name(&self) -> String {
        "builtin".to_string()
    }

    fn load(&self) -> Result<Vec<TrainingEntry>, CorpusSourceError> {
        let document: CorpusDocument = serde_yaml::from_str(BUILTIN_CORPUS)?;
        Ok(document.into_entries())
    }
}

/// YAML (`.yaml`, `.yml`) or JSON (`.json`) corpus file
#[derive(Debug, Clone)]
pub struct FileCorpus {
    path: PathBuf,
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for FileCorpus {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<TrainingEntry>, CorpusSourceError> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        let read = || {
            std::fs::read_to_string(&self.path).map_err(|source| CorpusSourceError::Io {
                path: self.path.clone(),
                source,
            })
        };

        let document: CorpusDocument = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&read()?)?,
            Some("json") => serde_json::from_str(&read()?)?,
            _ => return Err(CorpusSourceError::UnsupportedFormat(self.path.clone())),
        };

        Ok(document.into_entries())
    }
}

/// Built-in corpus unless a file path is configured
pub fn corpus_source_for(path: Option<&Path>) -> Box<dyn CorpusSource> {
    match path {
        Some(path) => Box::new(FileCorpus::new(path)),
        None => Box::new(BuiltinCorpus),
    }
}

/// A malformed entry that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub entry: usize,
    pub error: IngestError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingReport {
    /// Pairs appended to the corpus
    pub accepted: usize,
    pub rejected: Vec<RejectedEntry>,
}

/// Ingest everything a source supplies.
///
/// With [`IngestPolicy::Abort`] the first malformed entry stops training and
/// is returned as [`CorpusSourceError::Rejected`]; entries before it stay
/// ingested. With [`IngestPolicy::Skip`] it is logged and recorded in the
/// report instead.
pub fn train(
    corpus: &mut Corpus,
    source: &dyn CorpusSource,
    policy: IngestPolicy,
) -> Result<TrainingReport, CorpusSourceError> {
    let entries = source.load()?;
    let mut report = TrainingReport::default();

    for (entry, training) in entries.into_iter().enumerate() {
        let outcome = match training {
            TrainingEntry::Pair { stimulus, response } => corpus.ingest([(stimulus, response)]),
            TrainingEntry::Conversation(statements) if statements.len() < 2 => {
                // A lone statement has nothing answering it
                Err(IngestError::EmptyResponse { index: 0 })
            }
            TrainingEntry::Conversation(statements) => corpus.ingest_conversation(statements),
        };

        match outcome {
            Ok(added) => report.accepted += added,
            Err(error) => match policy {
                IngestPolicy::Abort => {
                    return Err(CorpusSourceError::Rejected {
                        entry,
                        source: error,
                    })
                }
                IngestPolicy::Skip => {
                    warn!(source = %source.name(), entry, %error, "Skipping malformed corpus entry");
                    report.rejected.push(RejectedEntry { entry, error });
                }
            },
        }
    }

    info!(
        source = %source.name(),
        accepted = report.accepted,
        rejected = report.rejected.len(),
        "Training complete"
    );

    Ok(report)
}
