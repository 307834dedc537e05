// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: conversation data, session memory, similarity scoring and
//! configuration.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types and domain services with no I/O

pub mod conversation;
pub mod memory;
pub mod similarity;
pub mod config;

pub use conversation::*;
pub use memory::*;
pub use similarity::*;
pub use config::*;
