// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # ChatSession: Contextual Override Layer
//!
//! Decides the reply that actually reaches the user for one conversation.
//! Each turn runs exactly one of these paths, checked in order:
//!
//! 1. **Greeting**: the utterance contains a greeting token and the session
//!    has not greeted yet: reply with the fixed greeting.
//! 2. **Affect follow-up**: the utterance contains an affect token and the
//!    previous reply asked how the user is: reply with the fixed follow-up.
//! 3. **Retrieval**: best corpus match (or the fallback), optionally beaten
//!    by an arithmetic answer.
//!
//! The reply is remembered as `last_response` whichever path produced it.
//! A panic in the retrieval path is contained here and turned into the
//! fallback response, so a broken match never ends the session.
//!
//! Sessions take `&mut self` per turn: one conversation is strictly
//! sequential. The engine and corpus are shared read-only between sessions.

use serde::Serialize;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info_span};

use crate::application::math::MathematicalEvaluation;
use crate::application::retrieval::RetrievalEngine;
use crate::domain::{normalize, tokenize, ContextConfig, ConversationMemory, SessionId};
use crate::infrastructure::Corpus;

/// Vocabulary and canned replies of the override rules
#[derive(Debug, Clone)]
pub struct ContextRules {
    greeting_tokens: HashSet<String>,
    affect_tokens: HashSet<String>,
    greeting_response: String,
    affect_response: String,
    follow_up_trigger: String,
}

impl ContextRules {
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            greeting_tokens: vocabulary(&config.greeting_tokens),
            affect_tokens: vocabulary(&config.affect_tokens),
            greeting_response: config.greeting_response.clone(),
            affect_response: config.affect_response.clone(),
            follow_up_trigger: config.follow_up_trigger.clone(),
        }
    }

    fn is_greeting(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.greeting_tokens.contains(*t))
    }

    fn is_affect(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.affect_tokens.contains(*t))
    }
}

fn vocabulary(words: &[String]) -> HashSet<String> {
    words
        .iter()
        .map(|w| normalize(w))
        .filter(|w| !w.is_empty())
        .collect()
}

impl Default for ContextRules {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

/// Which rule produced a turn's reply
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum TurnPath {
    Greeting,
    AffectFollowUp,
    Retrieved { confidence: f64 },
    Fallback { confidence: f64 },
    Mathematical,
    /// Retrieval panicked; the fallback was used
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub response: String,
    #[serde(flatten)]
    pub path: TurnPath,
}

pub struct ChatSession {
    id: SessionId,
    engine: Arc<RetrievalEngine>,
    corpus: Arc<Corpus>,
    rules: Arc<ContextRules>,
    math: Option<MathematicalEvaluation>,
    memory: ConversationMemory,
}

impl ChatSession {
    pub fn new(engine: Arc<RetrievalEngine>, corpus: Arc<Corpus>, rules: Arc<ContextRules>) -> Self {
        Self {
            id: SessionId::new(),
            engine,
            corpus,
            rules,
            math: None,
            memory: ConversationMemory::new(),
        }
    }

    pub fn with_math_evaluation(mut self, enabled: bool) -> Self {
        self.math = enabled.then(MathematicalEvaluation::new);
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Forget the conversation so far; the next turn starts fresh
    pub fn reset(&mut self) {
        self.memory = ConversationMemory::new();
    }

    /// Reply to one user utterance
    pub fn handle_turn(&mut self, query: &str) -> String {
        self.respond(query).response
    }

    /// Reply to one user utterance, reporting which rule fired
    pub fn respond(&mut self, query: &str) -> Turn {
        let span = info_span!("turn", session = %self.id);
        let _guard = span.enter();

        let normalized = normalize(query);
        let tokens = tokenize(&normalized);

        if !self.memory.has_greeted && self.rules.is_greeting(&tokens) {
            let response = self.rules.greeting_response.clone();
            self.memory.record_greeting(&response);
            debug!("Greeting override");
            return Turn {
                response,
                path: TurnPath::Greeting,
            };
        }

        if self.rules.is_affect(&tokens)
            && self.memory.last_response_contains(&self.rules.follow_up_trigger)
        {
            let response = self.rules.affect_response.clone();
            self.memory.record_follow_up(&response);
            debug!("Affect follow-up override");
            return Turn {
                response,
                path: TurnPath::AffectFollowUp,
            };
        }

        let turn = match panic::catch_unwind(AssertUnwindSafe(|| self.select_response(query))) {
            Ok(turn) => turn,
            Err(_) => {
                error!("Response selection panicked; replying with the fallback");
                Turn {
                    response: self.engine.fallback_response().to_string(),
                    path: TurnPath::Recovered,
                }
            }
        };

        self.memory.remember(&turn.response);
        turn
    }

    fn select_response(&self, query: &str) -> Turn {
        let result = self.engine.retrieve(query, &self.corpus);

        if result.confidence < 1.0 {
            if let Some(answer) = self.math.as_ref().and_then(|m| m.evaluate(query)) {
                debug!(expression = %answer.expression, "Arithmetic answer");
                return Turn {
                    response: answer.response(),
                    path: TurnPath::Mathematical,
                };
            }
        }

        let path = if result.fallback {
            TurnPath::Fallback {
                confidence: result.confidence,
            }
        } else {
            TurnPath::Retrieved {
                confidence: result.confidence,
            }
        };

        Turn {
            response: result.response,
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RetrievalConfig, SessionState, SimilarityScorer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingScorer(AtomicUsize);

    impl SimilarityScorer for CountingScorer {
        fn score(&self, _query: &str, _candidate: &str) -> f64 {
            self.0.fetch_add(1, Ordering::SeqCst);
            0.0
        }
    }

    struct PanickingScorer;

    impl SimilarityScorer for PanickingScorer {
        fn score(&self, _query: &str, _candidate: &str) -> f64 {
            panic!("scorer exploded");
        }
    }

    fn corpus() -> Arc<Corpus> {
        let mut corpus = Corpus::new();
        corpus
            .ingest([
                ("Hi", "Hello! How are you today?"),
                ("I'm good", "That's wonderful to hear! What brings you here today?"),
                ("Thanks", "No problem at all! Anything else I can help with?"),
            ])
            .unwrap();
        Arc::new(corpus)
    }

    fn session_with(engine: RetrievalEngine) -> ChatSession {
        ChatSession::new(Arc::new(engine), corpus(), Arc::new(ContextRules::default()))
    }

    fn session() -> ChatSession {
        session_with(RetrievalEngine::new(&RetrievalConfig::default()).unwrap())
    }

    #[test]
    fn test_greeting_fires_once() {
        let mut session = session();

        let first = session.respond("hi");
        assert_eq!(first.path, TurnPath::Greeting);
        assert_eq!(first.response, "Hello! Nice to meet you! How are you doing today?");
        assert_eq!(session.memory().state, SessionState::Greeted);

        let second = session.respond("hi");
        assert_eq!(second.path, TurnPath::Retrieved { confidence: 1.0 });
        assert_eq!(second.response, "Hello! How are you today?");
    }

    #[test]
    fn test_greeting_requires_whole_token() {
        let mut session = session();
        let turn = session.respond("this is something");

        assert_ne!(turn.path, TurnPath::Greeting);
        assert!(!session.memory().has_greeted);
    }

    #[test]
    fn test_affect_follow_up_after_greeting() {
        let mut session = session();
        session.handle_turn("Hello there!");

        let turn = session.respond("I'm good");
        assert_eq!(turn.path, TurnPath::AffectFollowUp);
        assert_eq!(turn.response, "That's wonderful! What would you like to chat about?");
        assert_eq!(session.memory().state, SessionState::Engaged);
    }

    #[test]
    fn test_affect_follow_up_bypasses_scorer() {
        let scorer = Arc::new(CountingScorer(AtomicUsize::new(0)));
        let engine = RetrievalEngine::new(&RetrievalConfig::default())
            .unwrap()
            .with_scorer(scorer.clone());
        let mut session = session_with(engine);
        session.memory.has_greeted = true;
        session.memory.last_response = Some("Hello! How are you today?".to_string());

        assert_eq!(
            session.handle_turn("good"),
            "That's wonderful! What would you like to chat about?"
        );
        assert_eq!(scorer.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_affect_without_trigger_falls_through() {
        let mut session = session();
        session.memory.has_greeted = true;
        session.memory.last_response = Some("No problem at all!".to_string());

        let turn = session.respond("I'm good");
        assert_eq!(turn.path, TurnPath::Retrieved { confidence: 1.0 });
        assert_eq!(turn.response, "That's wonderful to hear! What brings you here today?");
    }

    #[test]
    fn test_greeting_takes_priority_over_affect() {
        let mut session = session();
        session.memory.last_response = Some("How are you?".to_string());

        assert_eq!(session.respond("hey, good morning").path, TurnPath::Greeting);
    }

    #[test]
    fn test_last_response_tracks_every_path() {
        let mut session = session();

        session.handle_turn("hi");
        assert_eq!(
            session.memory().last_response.as_deref(),
            Some("Hello! Nice to meet you! How are you doing today?")
        );

        session.handle_turn("great");
        assert_eq!(
            session.memory().last_response.as_deref(),
            Some("That's wonderful! What would you like to chat about?")
        );

        session.handle_turn("quantum chromodynamics");
        assert_eq!(
            session.memory().last_response.as_deref(),
            Some("I am still learning. Can you tell me more?")
        );
    }

    #[test]
    fn test_fallback_path_reports_confidence() {
        let mut session = session();
        session.memory.has_greeted = true;

        let turn = session.respond("thanks a lot for everything");
        match turn.path {
            TurnPath::Fallback { confidence } => assert!(confidence > 0.0 && confidence < 0.9),
            other => panic!("unexpected path {:?}", other),
        }
    }

    #[test]
    fn test_math_evaluation() {
        let mut session = session().with_math_evaluation(true);
        let turn = session.respond("what is 6 times 7");

        assert_eq!(turn.path, TurnPath::Mathematical);
        assert_eq!(turn.response, "6 * 7 = 42");

        let mut plain = self::session();
        assert!(matches!(plain.respond("what is 6 times 7").path, TurnPath::Fallback { .. }));
    }

    #[test]
    fn test_panic_is_recovered() {
        let engine = RetrievalEngine::new(&RetrievalConfig::default())
            .unwrap()
            .with_scorer(Arc::new(PanickingScorer));
        let mut session = session_with(engine);
        session.memory.has_greeted = true;

        let turn = session.respond("Thanks");
        assert_eq!(turn.path, TurnPath::Recovered);
        assert_eq!(turn.response, "I am still learning. Can you tell me more?");

        // The session keeps working afterwards
        assert_eq!(session.respond("hello").path, TurnPath::Recovered);
    }

    #[test]
    fn test_reset_restores_fresh_memory() {
        let mut session = session();
        session.handle_turn("hi");
        session.reset();

        assert_eq!(session.memory(), &ConversationMemory::new());
        assert_eq!(session.respond("hi").path, TurnPath::Greeting);
    }

    #[test]
    fn test_turn_serialization() {
        let turn = Turn {
            response: "4".to_string(),
            path: TurnPath::Retrieved { confidence: 0.95 },
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["path"], "retrieved");
        assert_eq!(json["confidence"], 0.95);
        assert_eq!(json["response"], "4");
    }
}
