// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Corpus file commands
//!
//! Commands: validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use banter_core::domain::IngestPolicy;
use banter_core::infrastructure::{train, Corpus, FileCorpus, TrainingReport};

#[derive(Subcommand)]
pub enum CorpusCommand {
    /// Check that every entry of a corpus file can be trained on
    Validate {
        /// YAML or JSON corpus file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub async fn handle_command(command: CorpusCommand) -> Result<()> {
    match command {
        CorpusCommand::Validate { file } => validate(&file).await,
    }
}

async fn validate(file: &Path) -> Result<()> {
    println!("Validating corpus {}...", file.display());

    let report = inspect(file)?;

    for rejected in &report.rejected {
        println!(
            "  {} entry {}: {}",
            "✗".red(),
            rejected.entry,
            rejected.error
        );
    }

    if !report.rejected.is_empty() {
        anyhow::bail!(
            "{} malformed entries ({} pairs usable)",
            report.rejected.len(),
            report.accepted
        );
    }

    println!(
        "{}",
        format!("✓ Corpus is valid: {} pairs", report.accepted).green()
    );

    Ok(())
}

/// Train a scratch corpus from `file`, collecting every malformed entry
pub fn inspect(file: &Path) -> Result<TrainingReport> {
    let mut corpus = Corpus::new();
    train(&mut corpus, &FileCorpus::new(file), IngestPolicy::Skip)
        .with_context(|| format!("Failed to load corpus {:?}", file))
}
