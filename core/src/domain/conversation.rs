// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Conversation data: trained (stimulus, response) pairs and per-query
//! match results.

use serde::{Deserialize, Serialize};

/// A single trained exchange. Immutable once ingested into a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPair {
    stimulus: String,
    response: String,
}

impl ConversationPair {
    pub fn new(stimulus: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            stimulus: stimulus.into(),
            response: response.into(),
        }
    }

    /// Text an utterance is matched against
    pub fn stimulus(&self) -> &str {
        &self.stimulus
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Outcome of a single retrieval.
///
/// `confidence` is always the best score seen, even when the fallback
/// response was substituted, so callers can tell "no good match" apart from
/// "no match attempted" (`matched_stimulus == None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub response: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_stimulus: Option<String>,
    pub fallback: bool,
}

impl MatchResult {
    /// A corpus pair cleared the threshold
    pub fn matched(pair: &ConversationPair, confidence: f64) -> Self {
        Self {
            response: pair.response().to_string(),
            confidence,
            matched_stimulus: Some(pair.stimulus().to_string()),
            fallback: false,
        }
    }

    /// The best candidate (if any) scored below the threshold
    pub fn fallback(
        fallback_response: &str,
        confidence: f64,
        best: Option<&ConversationPair>,
    ) -> Self {
        Self {
            response: fallback_response.to_string(),
            confidence,
            matched_stimulus: best.map(|pair| pair.stimulus().to_string()),
            fallback: true,
        }
    }

    /// Nothing was scored: empty corpus or blank query
    pub fn unattempted(fallback_response: &str) -> Self {
        Self::fallback(fallback_response, 0.0, None)
    }
}
