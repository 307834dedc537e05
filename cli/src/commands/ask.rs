// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! One-shot retrieval: `banter ask "How are you?"`
//!
//! Plain best-match lookup. No greeting or follow-up overrides apply since
//! there is no conversation to remember.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::bootstrap;

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Utterance to answer
    #[arg(value_name = "QUERY", required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Print the full match result as JSON
    #[arg(long)]
    pub json: bool,

    /// Override the similarity threshold for this query
    #[arg(long, value_name = "THRESHOLD")]
    pub threshold: Option<f64>,
}

pub async fn handle_command(
    args: AskArgs,
    config_override: Option<PathBuf>,
    corpus_override: Option<PathBuf>,
) -> Result<()> {
    let manifest = bootstrap::load_config(config_override, corpus_override)?;
    let (chatbot, _) = bootstrap::build_chatbot(&manifest)?;

    let query = args.query.join(" ");
    let result = match args.threshold {
        Some(threshold) => {
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("--threshold must be within [0, 1], got {}", threshold);
            }
            chatbot
                .engine()
                .retrieve_with_threshold(&query, chatbot.corpus(), threshold)
        }
        None => chatbot.ask(&query),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize match result")?;
        println!("{}", json);
    } else if result.fallback {
        println!("{}", result.response.dimmed());
    } else {
        println!("{}", result.response);
    }

    Ok(())
}
