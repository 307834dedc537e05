// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Banter Core
//!
//! Retrieval engine behind the `banter` terminal chat agent.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Corpus storage, similarity scoring, best-match retrieval
//!   and the contextual override layer that decides each turn's reply

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
pub use application::*;
pub use infrastructure::*;
