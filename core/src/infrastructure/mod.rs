// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: corpus storage and training data suppliers

pub mod corpus_store;
pub mod corpus_source;

pub use corpus_store::{Corpus, IngestError};
pub use corpus_source::{
    corpus_source_for, train, BuiltinCorpus, CorpusDocument, CorpusSource, CorpusSourceError,
    FileCorpus, RejectedEntry, TrainingEntry, TrainingReport,
};
