// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Property tests for scoring and best-match retrieval.
//!
//! Covers the guarantees callers rely on:
//! - confidence always within [0, 1]
//! - an unmodified stimulus retrieves its own response with confidence 1.0
//! - raising the threshold only ever swaps in the fallback
//! - identical inputs give identical results
//! - scoring is symmetric

use banter_core::domain::{RetrievalConfig, SimilarityScorer, TokenBlendScorer};
use banter_core::infrastructure::{train, BuiltinCorpus, Corpus};
use banter_core::application::RetrievalEngine;
use banter_core::domain::IngestPolicy;
use proptest::collection::btree_set;
use proptest::prelude::*;

fn engine() -> RetrievalEngine {
    RetrievalEngine::new(&RetrievalConfig::default()).unwrap()
}

fn builtin() -> Corpus {
    let mut corpus = Corpus::new();
    train(&mut corpus, &BuiltinCorpus, IngestPolicy::Abort).unwrap();
    corpus
}

#[test]
fn test_every_builtin_stimulus_retrieves_itself() {
    let corpus = builtin();
    let engine = engine();

    for pair in corpus.all() {
        let result = engine.retrieve(pair.stimulus(), &corpus);
        assert_eq!(result.confidence, 1.0, "stimulus {:?}", pair.stimulus());
        assert_eq!(result.response, pair.response());
        assert!(!result.fallback);
    }
}

#[test]
fn test_empty_corpus_and_empty_query() {
    let engine = engine();

    let result = engine.retrieve("anything", &Corpus::new());
    assert_eq!(result.response, "I am still learning. Can you tell me more?");
    assert_eq!(result.confidence, 0.0);

    let result = engine.retrieve("", &builtin());
    assert_eq!(result.response, "I am still learning. Can you tell me more?");
    assert_eq!(result.confidence, 0.0);
}

proptest! {
    #[test]
    fn prop_confidence_is_bounded(query in "[a-zA-Z0-9 ?!',.]{0,60}") {
        let result = engine().retrieve(&query, &builtin());
        prop_assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn prop_blank_queries_score_zero(query in "[ \t\n]{0,10}") {
        let result = engine().retrieve(&query, &builtin());
        prop_assert!(result.fallback);
        prop_assert_eq!(result.confidence, 0.0);
        prop_assert!(result.matched_stimulus.is_none());
    }

    #[test]
    fn prop_exact_match(words in btree_set("[a-z]{3,8}", 1..12)) {
        let words: Vec<String> = words.into_iter().collect();
        let mut corpus = Corpus::new();
        corpus
            .ingest(words.iter().map(|w| (w.clone(), format!("reply to {}", w))))
            .unwrap();

        let engine = engine();
        for word in &words {
            let result = engine.retrieve(word, &corpus);
            prop_assert_eq!(result.confidence, 1.0);
            prop_assert_eq!(result.response, format!("reply to {}", word));
        }
    }

    #[test]
    fn prop_threshold_monotonicity(
        query in "[a-zA-Z ?']{1,40}",
        low in 0.0f64..=1.0,
        high in 0.0f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let corpus = builtin();
        let engine = engine();

        let lenient = engine.retrieve_with_threshold(&query, &corpus, low);
        let strict = engine.retrieve_with_threshold(&query, &corpus, high);

        prop_assert_eq!(&lenient.matched_stimulus, &strict.matched_stimulus);
        prop_assert_eq!(lenient.confidence, strict.confidence);
        if lenient.fallback {
            prop_assert!(strict.fallback);
        }
    }

    #[test]
    fn prop_retrieval_is_deterministic(query in "[a-zA-Z ?']{0,40}") {
        let corpus = builtin();
        let engine = engine();

        let first = engine.retrieve(&query, &corpus);
        let second = engine.retrieve(&query, &corpus);
        prop_assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_score_is_symmetric(a in "[a-z ?']{0,30}", b in "[a-z ?']{0,30}") {
        let scorer = TokenBlendScorer::new();
        prop_assert_eq!(scorer.score(&a, &b).to_bits(), scorer.score(&b, &a).to_bits());
    }
}
