// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Banter CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Configuration bootstrap, command handlers and the
//!   interactive session loop

pub mod bootstrap;
pub mod commands;
