// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use banter_core::domain::ChatConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./banter-config.yaml)
        #[arg(short, long, default_value = "./banter-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config_path = config_override.clone().or_else(ChatConfigManifest::discover_config);
    let mut config = ChatConfigManifest::load_or_default(config_path.clone())
        .context("Failed to load configuration")?;
    if let Some(config_dir) = config_path.as_deref().and_then(Path::parent) {
        config.resolve_relative_paths(config_dir);
    }

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. BANTER_CONFIG_PATH: {}",
            std::env::var("BANTER_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./banter-config.yaml");
        println!("  4. ~/.banter/config.yaml");
        println!("  5. /etc/banter/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Bot:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    let spec = &config.spec;

    println!("{}", "Retrieval:".bold());
    println!("  Threshold: {}", spec.retrieval.threshold);
    println!("  Fallback: {}", spec.retrieval.fallback_response);
    println!(
        "  Typo blend: {} (utterances up to {} tokens)",
        spec.retrieval.char_weight, spec.retrieval.short_utterance_tokens
    );
    println!(
        "  Math evaluation: {}",
        if spec.adapters.math_evaluation { "enabled" } else { "disabled" }
    );
    println!();

    println!("{}", "Corpus:".bold());
    match &spec.corpus.path {
        Some(path) => println!("  Source: {}", path.display()),
        None => println!("  Source: {}", "(built-in)".dimmed()),
    }
    println!("  On invalid entry: {:?}", spec.corpus.on_invalid);
    println!();

    println!("{}", "Context:".bold());
    println!("  Greeting tokens: {}", spec.context.greeting_tokens.join(", "));
    println!("  Affect tokens: {}", spec.context.affect_tokens.join(", "));
    println!("  Exit commands: {}", spec.session.exit_commands.join(", "));
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ChatConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = sample_config(with_examples);

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn sample_config(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}
