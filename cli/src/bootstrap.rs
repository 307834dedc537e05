// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Startup wiring shared by the commands: resolve the configuration, pick the
//! corpus source and train the chatbot before any conversation starts.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use banter_core::application::Chatbot;
use banter_core::domain::ChatConfigManifest;
use banter_core::infrastructure::{corpus_source_for, TrainingReport};

/// Discover and validate the configuration; `corpus_override` replaces
/// `spec.corpus.path`.
///
/// A relative corpus path in a config file is taken relative to that file;
/// `corpus_override` stays relative to the working directory.
pub fn load_config(
    config_override: Option<PathBuf>,
    corpus_override: Option<PathBuf>,
) -> Result<ChatConfigManifest> {
    let config_path = config_override.or_else(ChatConfigManifest::discover_config);
    let mut manifest = ChatConfigManifest::load_or_default(config_path.clone())
        .context("Failed to load configuration")?;

    if let Some(config_dir) = config_path.as_deref().and_then(Path::parent) {
        manifest.resolve_relative_paths(config_dir);
    }

    if let Some(path) = corpus_override {
        manifest.spec.corpus.path = Some(path);
    }

    manifest
        .validate()
        .context("Configuration validation failed")?;

    Ok(manifest)
}

/// Train a chatbot from the configured corpus source
pub fn build_chatbot(manifest: &ChatConfigManifest) -> Result<(Chatbot, TrainingReport)> {
    let source = corpus_source_for(manifest.spec.corpus.path.as_deref());
    info!(source = %source.name(), bot = %manifest.metadata.name, "Training chatbot");

    Chatbot::train(&manifest.spec, source.as_ref())
}
