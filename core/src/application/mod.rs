// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application services: retrieval, arithmetic answers, per-session
//! contextual overrides and the trained chatbot tying them together

pub mod retrieval;
pub mod math;
pub mod session;
pub mod chatbot;

pub use retrieval::RetrievalEngine;
pub use math::{MathAnswer, MathematicalEvaluation};
pub use session::{ChatSession, ContextRules, Turn, TurnPath};
pub use chatbot::Chatbot;
