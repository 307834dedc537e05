// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # RetrievalEngine: Best-Match Selection
//!
//! Scores a query against every stimulus in a [`Corpus`] and decides whether
//! the best one is trustworthy.
//!
//! ## Selection
//!
//! The highest score wins. Ties go to the pair inserted first, which keeps
//! retrieval deterministic for duplicate or equally similar stimuli.
//!
//! ## Threshold
//!
//! A best score below `threshold` (default 0.90) substitutes the configured
//! fallback response. The reported confidence is still the best score, so
//! callers can distinguish a weak match from no match at all.
//!
//! The engine only needs `&self`, holds no mutable state and does no I/O, so
//! one instance can serve any number of sessions concurrently.

use std::sync::Arc;
use tracing::debug;

use crate::domain::{
    ConfigurationError, ConversationPair, MatchResult, RetrievalConfig, SimilarityScorer,
    TokenBlendScorer,
};
use crate::infrastructure::Corpus;

pub struct RetrievalEngine {
    scorer: Arc<dyn SimilarityScorer>,
    threshold: f64,
    fallback_response: String,
}

impl std::fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("threshold", &self.threshold)
            .field("fallback_response", &self.fallback_response)
            .finish_non_exhaustive()
    }
}

impl RetrievalEngine {
    /// Build an engine with a [`TokenBlendScorer`] tuned by `config`
    pub fn new(config: &RetrievalConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let scorer = TokenBlendScorer::new()
            .with_char_weight(config.char_weight)
            .with_short_utterance_tokens(config.short_utterance_tokens);

        Ok(Self {
            scorer: Arc::new(scorer),
            threshold: config.threshold,
            fallback_response: config.fallback_response.clone(),
        })
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigurationError::ThresholdOutOfRange(threshold));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn fallback_response(&self) -> &str {
        &self.fallback_response
    }

    /// Best match for `query` under the configured threshold
    pub fn retrieve(&self, query: &str, corpus: &Corpus) -> MatchResult {
        self.retrieve_with_threshold(query, corpus, self.threshold)
    }

    /// Best match for `query` under an explicit threshold.
    ///
    /// The threshold is clamped to `[0, 1]`; NaN is treated as 1.0.
    pub fn retrieve_with_threshold(&self, query: &str, corpus: &Corpus, threshold: f64) -> MatchResult {
        let threshold = if threshold.is_nan() {
            1.0
        } else {
            threshold.clamp(0.0, 1.0)
        };

        if query.trim().is_empty() || corpus.is_empty() {
            return MatchResult::unattempted(&self.fallback_response);
        }

        let Some((best, confidence)) = self.best_match(query, corpus.all()) else {
            return MatchResult::unattempted(&self.fallback_response);
        };

        debug!(
            confidence,
            threshold,
            stimulus = best.stimulus(),
            "Best corpus match"
        );

        if confidence < threshold {
            MatchResult::fallback(&self.fallback_response, confidence, Some(best))
        } else {
            MatchResult::matched(best, confidence)
        }
    }

    /// First pair reaching the maximum score
    fn best_match<'a>(
        &self,
        query: &str,
        pairs: &'a [ConversationPair],
    ) -> Option<(&'a ConversationPair, f64)> {
        let mut best: Option<(&ConversationPair, f64)> = None;

        for pair in pairs {
            let score = clamp_score(self.scorer.score(query, pair.stimulus()));
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((pair, score)),
            }
            if score >= 1.0 {
                // Nothing later can beat a perfect score under first-wins ties
                break;
            }
        }

        best
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
