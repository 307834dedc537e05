// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Banter CLI
//!
//! The `banter` binary trains a retrieval chat agent from its corpus and
//! talks to it in the terminal.
//!
//! ## Commands
//!
//! - `banter` / `banter chat` - Interactive session (the default)
//! - `banter ask <QUERY>` - One-shot retrieval
//! - `banter config show|validate|generate` - Configuration management
//! - `banter corpus validate <FILE>` - Check a corpus file
//!
//! Logs go to stderr; stdout carries only the conversation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use banter_cli::commands::{self, AskArgs, ConfigCommand, CorpusCommand};

/// Banter - a retrieval-based chat agent for the terminal
#[derive(Parser)]
#[command(name = "banter")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "BANTER_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Corpus file to train from (overrides spec.corpus.path)
    #[arg(long, global = true, env = "BANTER_CORPUS_PATH", value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BANTER_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    #[command(name = "chat")]
    Chat,

    /// Answer a single query from the corpus
    #[command(name = "ask")]
    Ask {
        #[command(flatten)]
        args: AskArgs,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Corpus file tools
    #[command(name = "corpus")]
    Corpus {
        #[command(subcommand)]
        command: CorpusCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::handle_command(cli.config, cli.corpus).await,
        Commands::Ask { args } => commands::ask::handle_command(args, cli.config, cli.corpus).await,
        Commands::Config { command } => {
            commands::config::handle_command(command, cli.config).await
        }
        Commands::Corpus { command } => commands::corpus::handle_command(command).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
