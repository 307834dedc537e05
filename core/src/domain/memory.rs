// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a session stands in the greeting / small-talk exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No greeting yet
    #[default]
    Fresh,
    Greeted,
    /// Normal turn-taking after the affect follow-up
    Engaged,
}

/// Single-slot conversational memory owned by one chat session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub last_response: Option<String>,
    pub has_greeted: bool,
    pub state: SessionState,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_greeting(&mut self, response: &str) {
        self.has_greeted = true;
        if self.state == SessionState::Fresh {
            self.state = SessionState::Greeted;
        }
        self.remember(response);
    }

    pub(crate) fn record_follow_up(&mut self, response: &str) {
        self.state = SessionState::Engaged;
        self.remember(response);
    }

    pub(crate) fn remember(&mut self, response: &str) {
        self.last_response = Some(response.to_string());
    }

    /// Case-insensitive check of the previous reply
    pub fn last_response_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.last_response
            .as_deref()
            .map(|last| last.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}
