// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Chat Configuration Types
//
// Defines the configuration schema for a banter chat agent:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Retrieval threshold and fallback response
// - Contextual override vocabulary and canned replies
// - Corpus source and malformed-entry policy
// - Interactive session wording

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::similarity::{DEFAULT_CHAR_WEIGHT, SHORT_UTTERANCE_TOKENS};

pub const API_VERSION: &str = "banter/v1";
pub const KIND: &str = "ChatConfig";

/// Configuration errors. Raised at startup only, never during a turn.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Similarity threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("Character similarity weight must be within [0, 1], got {0}")]
    CharWeightOutOfRange(f64),

    #[error("Fallback response cannot be empty")]
    MissingFallback,

    #[error("Context response cannot be empty: {0}")]
    EmptyContextResponse(&'static str),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

/// Top-level Kubernetes-style chat configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfigManifest {
    /// API version (must be "banter/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ChatConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: ChatConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Bot name shown in the session banner
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfigSpec {
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub adapters: AdapterConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum confidence for a corpus response to be trusted
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Reply used when no stimulus clears the threshold
    #[serde(default = "default_fallback_response")]
    pub fallback_response: String,

    /// Share of character-level similarity when scoring short utterances
    #[serde(default = "default_char_weight")]
    pub char_weight: f64,

    /// Utterances up to this many tokens get the character-level blend;
    /// 0 disables typo tolerance
    #[serde(default = "default_short_utterance_tokens")]
    pub short_utterance_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_greeting_tokens")]
    pub greeting_tokens: Vec<String>,

    #[serde(default = "default_affect_tokens")]
    pub affect_tokens: Vec<String>,

    #[serde(default = "default_greeting_response")]
    pub greeting_response: String,

    #[serde(default = "default_affect_response")]
    pub affect_response: String,

    /// Phrase the previous reply must contain for the affect follow-up
    #[serde(default = "default_follow_up_trigger")]
    pub follow_up_trigger: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Answer arithmetic questions ("what is 2 plus 3")
    #[serde(default = "default_true")]
    pub math_evaluation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IngestPolicy {
    /// Stop training at the first malformed entry
    #[default]
    Abort,
    /// Log and skip malformed entries
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// YAML or JSON corpus file; the built-in corpus is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub on_invalid: IngestPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_exit_commands")]
    pub exit_commands: Vec<String>,

    #[serde(default = "default_user_prompt")]
    pub user_prompt: String,

    #[serde(default = "default_bot_prefix")]
    pub bot_prefix: String,

    /// Printed when the user types an exit command
    #[serde(default = "default_farewell")]
    pub farewell: String,

    /// Printed on Ctrl+C
    #[serde(default = "default_interrupt_farewell")]
    pub interrupt_farewell: String,

    /// Printed when stdin closes
    #[serde(default = "default_eof_farewell")]
    pub eof_farewell: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_threshold() -> f64 {
    0.90
}

fn default_char_weight() -> f64 {
    DEFAULT_CHAR_WEIGHT
}

fn default_short_utterance_tokens() -> usize {
    SHORT_UTTERANCE_TOKENS
}

fn default_fallback_response() -> String {
    "I am still learning. Can you tell me more?".to_string()
}

fn default_greeting_tokens() -> Vec<String> {
    vec!["hi".to_string(), "hello".to_string(), "hey".to_string()]
}

fn default_affect_tokens() -> Vec<String> {
    vec![
        "good".to_string(),
        "fine".to_string(),
        "well".to_string(),
        "great".to_string(),
    ]
}

fn default_greeting_response() -> String {
    "Hello! Nice to meet you! How are you doing today?".to_string()
}

fn default_affect_response() -> String {
    "That's wonderful! What would you like to chat about?".to_string()
}

fn default_follow_up_trigger() -> String {
    "how are you".to_string()
}

fn default_exit_commands() -> Vec<String> {
    vec![
        "quit".to_string(),
        "exit".to_string(),
        "bye".to_string(),
        "goodbye".to_string(),
    ]
}

fn default_user_prompt() -> String {
    "user: ".to_string()
}

fn default_bot_prefix() -> String {
    "bot: ".to_string()
}

fn default_farewell() -> String {
    "Thanks for the great conversation! Goodbye!".to_string()
}

fn default_interrupt_farewell() -> String {
    "Thanks for chatting! Goodbye!".to_string()
}

fn default_eof_farewell() -> String {
    "Take care!".to_string()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            fallback_response: default_fallback_response(),
            char_weight: default_char_weight(),
            short_utterance_tokens: default_short_utterance_tokens(),
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigurationError::ThresholdOutOfRange(self.threshold));
        }
        if self.fallback_response.trim().is_empty() {
            return Err(ConfigurationError::MissingFallback);
        }
        if !(0.0..=1.0).contains(&self.char_weight) {
            return Err(ConfigurationError::CharWeightOutOfRange(self.char_weight));
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            greeting_tokens: default_greeting_tokens(),
            affect_tokens: default_affect_tokens(),
            greeting_response: default_greeting_response(),
            affect_response: default_affect_response(),
            follow_up_trigger: default_follow_up_trigger(),
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.greeting_response.trim().is_empty() {
            return Err(ConfigurationError::EmptyContextResponse("greeting_response"));
        }
        if self.affect_response.trim().is_empty() {
            return Err(ConfigurationError::EmptyContextResponse("affect_response"));
        }
        if self.follow_up_trigger.trim().is_empty() {
            return Err(ConfigurationError::EmptyContextResponse("follow_up_trigger"));
        }
        Ok(())
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            math_evaluation: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exit_commands: default_exit_commands(),
            user_prompt: default_user_prompt(),
            bot_prefix: default_bot_prefix(),
            farewell: default_farewell(),
            interrupt_farewell: default_interrupt_farewell(),
            eof_farewell: default_eof_farewell(),
        }
    }
}

impl SessionConfig {
    /// Whether a (trimmed, case-insensitive) input line ends the session
    pub fn is_exit_command(&self, line: &str) -> bool {
        let line = line.trim().to_lowercase();
        self.exit_commands.iter().any(|cmd| cmd.to_lowercase() == line)
    }
}

impl Default for ChatConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "banter".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: ChatConfigSpec::default(),
        }
    }
}

impl ChatConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. BANTER_CONFIG_PATH environment variable
    /// 2. ./banter-config.yaml (working directory)
    /// 3. ~/.banter/config.yaml (user home)
    /// 4. /etc/banter/config.yaml (system, Unix) or C:\ProgramData\Banter\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BANTER_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./banter-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".banter").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/banter/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Banter\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing/invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Anchor a relative `spec.corpus.path` at `config_dir`, the directory of
    /// the file this manifest was loaded from
    pub fn resolve_relative_paths(&mut self, config_dir: &Path) {
        if let Some(path) = &self.spec.corpus.path {
            if path.is_relative() {
                self.spec.corpus.path = Some(config_dir.join(path));
            }
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BANTER_THRESHOLD") {
            match val.trim().parse::<f64>() {
                Ok(threshold) => {
                    tracing::info!("Environment override: BANTER_THRESHOLD={}", threshold);
                    self.spec.retrieval.threshold = threshold;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for BANTER_THRESHOLD: '{}'. Expected a number. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("BANTER_FALLBACK_RESPONSE") {
            tracing::info!("Environment override: BANTER_FALLBACK_RESPONSE");
            self.spec.retrieval.fallback_response = val;
        }

        if let Ok(val) = std::env::var("BANTER_MATH_EVALUATION") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => {
                    tracing::info!("Environment override: BANTER_MATH_EVALUATION=true");
                    self.spec.adapters.math_evaluation = true;
                }
                "false" | "0" | "no" | "off" => {
                    tracing::info!("Environment override: BANTER_MATH_EVALUATION=false");
                    self.spec.adapters.math_evaluation = false;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for BANTER_MATH_EVALUATION: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_version != API_VERSION {
            return Err(ConfigurationError::InvalidManifest(format!(
                "apiVersion '{}' must be '{}'",
                self.api_version, API_VERSION
            )));
        }

        if self.kind != KIND {
            return Err(ConfigurationError::InvalidManifest(format!(
                "kind '{}' must be '{}'",
                self.kind, KIND
            )));
        }

        if self.metadata.name.trim().is_empty() {
            return Err(ConfigurationError::InvalidManifest(
                "metadata.name cannot be empty".to_string(),
            ));
        }

        self.spec.retrieval.validate()?;
        self.spec.context.validate()?;

        if self.spec.session.exit_commands.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigurationError::InvalidManifest(
                "session.exit_commands cannot contain empty entries".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = ChatConfigManifest::default();
        assert_eq!(manifest.api_version, "banter/v1");
        assert_eq!(manifest.kind, "ChatConfig");
        assert_eq!(manifest.spec.retrieval.threshold, 0.90);
        assert_eq!(
            manifest.spec.retrieval.fallback_response,
            "I am still learning. Can you tell me more?"
        );
        assert!(manifest.spec.adapters.math_evaluation);
        assert_eq!(manifest.spec.corpus.on_invalid, IngestPolicy::Abort);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_sparse_yaml_fills_defaults() {
        let yaml = r#"
apiVersion: banter/v1
kind: ChatConfig
metadata:
  name: test-bot
spec:
  retrieval:
    threshold: 0.75
  corpus:
    path: ./corpus.yaml
    on_invalid: skip
"#;
        let manifest = ChatConfigManifest::from_yaml_str(yaml).unwrap();

        assert_eq!(manifest.metadata.name, "test-bot");
        assert_eq!(manifest.spec.retrieval.threshold, 0.75);
        assert_eq!(
            manifest.spec.retrieval.fallback_response,
            "I am still learning. Can you tell me more?"
        );
        assert_eq!(manifest.spec.corpus.path, Some(PathBuf::from("./corpus.yaml")));
        assert_eq!(manifest.spec.corpus.on_invalid, IngestPolicy::Skip);
        assert_eq!(manifest.spec.context.greeting_tokens, vec!["hi", "hello", "hey"]);
        assert_eq!(manifest.spec.session.user_prompt, "user: ");
    }

    #[test]
    fn test_validation() {
        let mut manifest = ChatConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(matches!(
            manifest.validate(),
            Err(ConfigurationError::InvalidManifest(_))
        ));
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.retrieval.threshold = 1.5;
        assert_eq!(
            manifest.validate(),
            Err(ConfigurationError::ThresholdOutOfRange(1.5))
        );
        manifest.spec.retrieval.threshold = -0.1;
        assert!(manifest.validate().is_err());
        manifest.spec.retrieval.threshold = f64::NAN;
        assert!(manifest.validate().is_err());
        manifest.spec.retrieval.threshold = 0.0;
        assert!(manifest.validate().is_ok());

        manifest.spec.retrieval.fallback_response = "   ".to_string();
        assert_eq!(manifest.validate(), Err(ConfigurationError::MissingFallback));
        manifest.spec.retrieval.fallback_response = "fallback".to_string();

        manifest.spec.retrieval.char_weight = 1.5;
        assert_eq!(
            manifest.validate(),
            Err(ConfigurationError::CharWeightOutOfRange(1.5))
        );
        manifest.spec.retrieval.char_weight = 0.0;
        assert!(manifest.validate().is_ok());

        manifest.spec.context.greeting_response.clear();
        assert_eq!(
            manifest.validate(),
            Err(ConfigurationError::EmptyContextResponse("greeting_response"))
        );
    }

    #[test]
    fn test_scorer_knobs_from_yaml() {
        let yaml = r#"
apiVersion: banter/v1
kind: ChatConfig
metadata:
  name: test-bot
spec:
  retrieval:
    char_weight: 0.25
    short_utterance_tokens: 0
"#;
        let manifest = ChatConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.spec.retrieval.char_weight, 0.25);
        assert_eq!(manifest.spec.retrieval.short_utterance_tokens, 0);

        let defaults = RetrievalConfig::default();
        assert_eq!(defaults.char_weight, DEFAULT_CHAR_WEIGHT);
        assert_eq!(defaults.short_utterance_tokens, SHORT_UTTERANCE_TOKENS);
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_corpus_path_resolves_against_config_dir() {
        let mut manifest = ChatConfigManifest::default();
        manifest.spec.corpus.path = Some(PathBuf::from("./corpus.yaml"));
        manifest.resolve_relative_paths(Path::new("/home/user/.banter"));
        assert_eq!(
            manifest.spec.corpus.path,
            Some(PathBuf::from("/home/user/.banter/./corpus.yaml"))
        );

        manifest.spec.corpus.path = Some(PathBuf::from("/srv/corpus.json"));
        manifest.resolve_relative_paths(Path::new("/home/user/.banter"));
        assert_eq!(manifest.spec.corpus.path, Some(PathBuf::from("/srv/corpus.json")));

        manifest.spec.corpus.path = None;
        manifest.resolve_relative_paths(Path::new("/home/user/.banter"));
        assert!(manifest.spec.corpus.path.is_none());
    }

    #[test]
    fn test_exit_commands_are_case_insensitive() {
        let session = SessionConfig::default();
        assert!(session.is_exit_command("  QUIT "));
        assert!(session.is_exit_command("Goodbye"));
        assert!(!session.is_exit_command("goodbye for now"));
    }
}
