// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Similarity Scoring Domain Service
//!
//! Scores a user utterance against a stored stimulus in `[0, 1]`.
//!
//! # Algorithm
//!
//! Both texts are normalized (lowercased, trimmed, internal whitespace
//! collapsed) and split into tokens with surrounding punctuation removed.
//!
//! - identical normalized text, or identical token sequences, score `1.0`
//! - token sets with nothing in common score `0.0`
//! - otherwise the token Jaccard index `|A ∩ B| / |A ∪ B|` is used; for short
//!   utterances (at most [`SHORT_UTTERANCE_TOKENS`] tokens on both sides) it is
//!   blended with normalized Levenshtein similarity so small typos still land
//!
//! Every step is symmetric, so `score(a, b) == score(b, a)`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure, deterministic scoring with no shared state

use std::collections::HashSet;

/// Utterances with at most this many tokens get the character-level blend
pub const SHORT_UTTERANCE_TOKENS: usize = 4;

/// Share of the character-level similarity in the short-utterance blend
pub const DEFAULT_CHAR_WEIGHT: f64 = 0.5;

/// Scores how closely a query matches a candidate stimulus.
///
/// Implementations must be pure: same inputs, same score, no side effects.
pub trait SimilarityScorer: Send + Sync {
    /// Similarity in `[0, 1]`
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// Token-overlap scorer with a character-level blend for short utterances
#[derive(Debug, Clone)]
pub struct TokenBlendScorer {
    short_utterance_tokens: usize,
    char_weight: f64,
}

impl TokenBlendScorer {
    pub fn new() -> Self {
        Self {
            short_utterance_tokens: SHORT_UTTERANCE_TOKENS,
            char_weight: DEFAULT_CHAR_WEIGHT,
        }
    }

    /// Token-only scoring, no typo tolerance
    pub fn token_only() -> Self {
        Self {
            short_utterance_tokens: 0,
            char_weight: 0.0,
        }
    }

    pub fn with_char_weight(mut self, weight: f64) -> Self {
        self.char_weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_short_utterance_tokens(mut self, tokens: usize) -> Self {
        self.short_utterance_tokens = tokens;
        self
    }
}

impl Default for TokenBlendScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer for TokenBlendScorer {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let query = normalize(query);
        if query.is_empty() {
            return 0.0;
        }
        let candidate = normalize(candidate);
        if candidate.is_empty() {
            return 0.0;
        }
        if query == candidate {
            return 1.0;
        }

        let query_tokens = tokenize(&query);
        let candidate_tokens = tokenize(&candidate);
        if !query_tokens.is_empty() && query_tokens == candidate_tokens {
            return 1.0;
        }

        let jaccard = jaccard_similarity(&query_tokens, &candidate_tokens);
        if jaccard == 0.0 {
            return 0.0;
        }

        let longest = query_tokens.len().max(candidate_tokens.len());
        let score = if longest <= self.short_utterance_tokens {
            let chars = char_similarity(&query_tokens.join(" "), &candidate_tokens.join(" "));
            (1.0 - self.char_weight) * jaccard + self.char_weight * chars
        } else {
            jaccard
        };

        score.clamp(0.0, 1.0)
    }
}

/// Lowercase, trim and collapse runs of whitespace to a single space
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split normalized text into word tokens, stripping surrounding punctuation.
///
/// Inner punctuation survives (`what's` stays one token).
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Jaccard index over the distinct tokens of both sides.
///
/// Returns 0.0 if both sides are empty.
pub fn jaccard_similarity(a: &[&str], b: &[&str]) -> f64 {
    let set_a: HashSet<&str> = a.iter().copied().collect();
    let set_b: HashSet<&str> = b.iter().copied().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, counted in chars
pub fn char_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Edit distance over chars (insert, delete, substitute)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
