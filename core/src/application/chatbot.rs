// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Trained chat agent: one immutable corpus shared by any number of sessions.
//!
//! Training finishes before the `Chatbot` exists, which is the only ordering
//! the sessions need; after that everything they share is read-only.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::application::retrieval::RetrievalEngine;
use crate::application::session::{ChatSession, ContextRules};
use crate::domain::{ChatConfigSpec, ConfigurationError, MatchResult};
use crate::infrastructure::{train, Corpus, CorpusSource, TrainingReport};

#[derive(Debug, Clone)]
pub struct Chatbot {
    engine: Arc<RetrievalEngine>,
    corpus: Arc<Corpus>,
    rules: Arc<ContextRules>,
    math_evaluation: bool,
}

impl Chatbot {
    pub fn new(engine: RetrievalEngine, corpus: Corpus, rules: ContextRules) -> Self {
        Self {
            engine: Arc::new(engine),
            corpus: Arc::new(corpus),
            rules: Arc::new(rules),
            math_evaluation: false,
        }
    }

    /// Build from configuration around an already trained corpus
    pub fn from_config(spec: &ChatConfigSpec, corpus: Corpus) -> Result<Self, ConfigurationError> {
        spec.context.validate()?;
        let engine = RetrievalEngine::new(&spec.retrieval)?;
        let rules = ContextRules::from_config(&spec.context);

        Ok(Self::new(engine, corpus, rules).with_math_evaluation(spec.adapters.math_evaluation))
    }

    /// Train a fresh corpus from `source`, then build from configuration
    pub fn train(spec: &ChatConfigSpec, source: &dyn CorpusSource) -> Result<(Self, TrainingReport)> {
        let mut corpus = Corpus::new();
        let report = train(&mut corpus, source, spec.corpus.on_invalid)
            .with_context(|| format!("Failed to train from corpus source '{}'", source.name()))?;

        let chatbot = Self::from_config(spec, corpus).context("Invalid chat configuration")?;
        Ok((chatbot, report))
    }

    pub fn with_math_evaluation(mut self, enabled: bool) -> Self {
        self.math_evaluation = enabled;
        self
    }

    /// A new conversation with fresh memory
    pub fn session(&self) -> ChatSession {
        ChatSession::new(self.engine.clone(), self.corpus.clone(), self.rules.clone())
            .with_math_evaluation(self.math_evaluation)
    }

    /// Plain retrieval without session memory or overrides
    pub fn ask(&self, query: &str) -> MatchResult {
        self.engine.retrieve(query, &self.corpus)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IngestPolicy;
    use crate::infrastructure::BuiltinCorpus;

    fn chatbot() -> Chatbot {
        Chatbot::train(&ChatConfigSpec::default(), &BuiltinCorpus).unwrap().0
    }

    #[test]
    fn test_train_builtin() {
        let (chatbot, report) = Chatbot::train(&ChatConfigSpec::default(), &BuiltinCorpus).unwrap();

        assert_eq!(report.accepted, chatbot.corpus().len());
        assert_eq!(
            chatbot.ask("Good morning! How are you doing?").response,
            "I am doing very well, thank you for asking."
        );
    }

    #[test]
    fn test_from_config_rejects_bad_threshold() {
        let mut spec = ChatConfigSpec::default();
        spec.retrieval.threshold = 2.0;

        assert_eq!(
            Chatbot::from_config(&spec, Corpus::new()).unwrap_err(),
            ConfigurationError::ThresholdOutOfRange(2.0)
        );
        assert!(Chatbot::train(&spec, &BuiltinCorpus).is_err());
    }

    #[test]
    fn test_sessions_have_independent_memory() {
        let chatbot = chatbot();
        let mut alice = chatbot.session();
        let mut bob = chatbot.session();

        assert_ne!(alice.id(), bob.id());
        assert_eq!(alice.handle_turn("hello"), "Hello! Nice to meet you! How are you doing today?");
        assert_eq!(bob.handle_turn("hello"), "Hello! Nice to meet you! How are you doing today?");
        assert_eq!(alice.handle_turn("hello"), "Hi there! How can I help you?");
    }

    #[test]
    fn test_concurrent_sessions_share_corpus() {
        let chatbot = chatbot();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let chatbot = &chatbot;
                    scope.spawn(move || {
                        let mut session = chatbot.session();
                        vec![
                            session.handle_turn("hey"),
                            session.handle_turn("Thank you"),
                            session.handle_turn("What is AI?"),
                        ]
                    })
                })
                .collect();

            for handle in handles {
                let replies = handle.join().unwrap();
                assert_eq!(replies[1], "You're very welcome! Happy to help!");
                assert_eq!(
                    replies[2],
                    "AI stands for Artificial Intelligence. It's technology that can think and learn like humans."
                );
            }
        });
    }

    #[test]
    fn test_math_evaluation_follows_config() {
        let mut spec = ChatConfigSpec::default();
        spec.corpus.on_invalid = IngestPolicy::Skip;

        let (chatbot, _) = Chatbot::train(&spec, &BuiltinCorpus).unwrap();
        assert_eq!(chatbot.session().handle_turn("what is 12 divided by 4"), "12 / 4 = 3");

        spec.adapters.math_evaluation = false;
        let (chatbot, _) = Chatbot::train(&spec, &BuiltinCorpus).unwrap();
        assert_eq!(
            chatbot.session().handle_turn("what is 12 divided by 4"),
            "I am still learning. Can you tell me more?"
        );
    }
}
