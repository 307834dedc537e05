// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the banter CLI

pub mod ask;
pub mod chat;
pub mod config;
pub mod corpus;

pub use self::ask::AskArgs;
pub use self::chat::{quiet_panics, run_session, spawn_line_reader, QuietPanics, SessionEnd};
pub use self::config::ConfigCommand;
pub use self::corpus::CorpusCommand;
