// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory corpus of trained conversation pairs.
//!
//! Training is a one-time batch load at startup; after that the corpus is
//! shared read-only (usually behind an `Arc`) by every session.

use thiserror::Error;

use crate::domain::ConversationPair;

/// Malformed training data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Training entry {index} has an empty stimulus")]
    EmptyStimulus { index: usize },

    #[error("Training entry {index} has an empty response")]
    EmptyResponse { index: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pairs: Vec<ConversationPair>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of (stimulus, response) pairs.
    ///
    /// The whole batch is validated before anything is appended, so a failed
    /// call leaves the corpus unchanged. `index` in the error is the position
    /// inside this batch.
    pub fn ingest<I, S, R>(&mut self, pairs: I) -> Result<usize, IngestError>
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: Into<String>,
    {
        let mut batch = Vec::new();
        for (index, (stimulus, response)) in pairs.into_iter().enumerate() {
            let stimulus = stimulus.into();
            let response = response.into();
            if stimulus.trim().is_empty() {
                return Err(IngestError::EmptyStimulus { index });
            }
            if response.trim().is_empty() {
                return Err(IngestError::EmptyResponse { index });
            }
            batch.push(ConversationPair::new(stimulus, response));
        }

        let added = batch.len();
        self.pairs.extend(batch);
        Ok(added)
    }

    /// Train on a list-style conversation: each statement answers the one
    /// before it, so N statements become N - 1 pairs.
    pub fn ingest_conversation<I, S>(&mut self, statements: I) -> Result<usize, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statements: Vec<String> = statements.into_iter().map(Into::into).collect();
        if let Some(index) = statements.iter().position(|s| s.trim().is_empty()) {
            // First statement is only ever a stimulus; every later one is a response.
            return Err(if index == 0 {
                IngestError::EmptyStimulus { index }
            } else {
                IngestError::EmptyResponse { index: index - 1 }
            });
        }

        let pairs: Vec<(String, String)> = statements
            .windows(2)
            .map(|w| (w[0].clone(), w[1].clone()))
            .collect();
        self.ingest(pairs)
    }

    /// Every pair in insertion order
    pub fn all(&self) -> &[ConversationPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
