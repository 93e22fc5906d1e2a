//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`TAGDESK_*`, read by the CLI parser)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing TOML file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTP port for tagdesk-api
pub const DEFAULT_PORT: u16 = 5780;

/// Spam phrases rejected when no list is configured
pub const DEFAULT_SPAM_PHRASES: &[&str] = &[
    "buy now",
    "click here",
    "free money",
    "limited offer",
    "act now",
    "winner",
    "viagra",
];

/// Compiled default values for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_dir().join("tagdesk.db"),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
        }
    }
}

/// Configuration file contents
///
/// Every field is optional so that partial files merge over the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub urgent: UrgentConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or EnvFilter directive (e.g. "info", "tagdesk_api=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Inference endpoint configuration
///
/// When `endpoint` is unset the service tags complaints with the offline
/// lexicon classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of a Hugging Face style inference API
    /// (e.g. "https://api-inference.huggingface.co")
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent with inference requests
    #[serde(default)]
    pub api_token: Option<String>,

    /// Zero-shot classification model id
    #[serde(default = "default_category_model")]
    pub category_model: String,

    /// Sentiment classification model id
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sentiment scores below this are bucketed as NEUTRAL
    #[serde(default = "default_neutral_threshold")]
    pub neutral_threshold: f64,

    /// Top zero-shot scores below this map to OTHER
    #[serde(default = "default_min_category_score")]
    pub min_category_score: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            category_model: default_category_model(),
            sentiment_model: default_sentiment_model(),
            timeout_secs: default_timeout_secs(),
            neutral_threshold: default_neutral_threshold(),
            min_category_score: default_min_category_score(),
        }
    }
}

/// Request validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_spam_phrases")]
    pub spam_phrases: Vec<String>,

    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,

    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            spam_phrases: default_spam_phrases(),
            min_message_len: default_min_message_len(),
            max_message_len: default_max_message_len(),
        }
    }
}

/// Urgent complaint selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgentConfig {
    /// Minimum NEGATIVE sentiment score for a complaint to count as urgent
    #[serde(default = "default_urgent_threshold")]
    pub threshold: f64,
}

impl Default for UrgentConfig {
    fn default() -> Self {
        Self {
            threshold: default_urgent_threshold(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_category_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

fn default_sentiment_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_neutral_threshold() -> f64 {
    0.60
}

fn default_min_category_score() -> f64 {
    0.30
}

fn default_spam_phrases() -> Vec<String> {
    DEFAULT_SPAM_PHRASES.iter().map(|s| s.to_string()).collect()
}

fn default_min_message_len() -> usize {
    10
}

fn default_max_message_len() -> usize {
    1000
}

fn default_urgent_threshold() -> f64 {
    0.80
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the config file if it exists
    ///
    /// Returns `Ok(None)` when the file is absent so the caller can log and
    /// continue with defaults.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }
}

/// Values supplied on the command line or through `TAGDESK_*` variables
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub inference_endpoint: Option<String>,
    pub inference_token: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging: LoggingConfig,
    pub inference: InferenceConfig,
    pub validation: ValidationConfig,
    pub urgent: UrgentConfig,
}

impl ServiceConfig {
    /// Merge overrides over file values over compiled defaults
    pub fn resolve(file: TomlConfig, overrides: Overrides) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let mut logging = file.logging;
        if let Some(level) = overrides.log_level {
            logging.level = level;
        }

        let mut inference = file.inference;
        if let Some(endpoint) = overrides.inference_endpoint {
            inference.endpoint = Some(endpoint);
        }
        if let Some(token) = overrides.inference_token {
            inference.api_token = Some(token);
        }
        // Blank values mean "not configured"
        inference.endpoint = inference.endpoint.filter(|s| !s.trim().is_empty());
        inference.api_token = inference.api_token.filter(|s| !s.trim().is_empty());

        Self {
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            logging,
            inference,
            validation: file.validation,
            urgent: file.urgent,
        }
    }

    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::Config(format!("{} must be within [0, 1], got {}", name, v)))
            }
        };
        unit("inference.neutral_threshold", self.inference.neutral_threshold)?;
        unit("inference.min_category_score", self.inference.min_category_score)?;
        unit("urgent.threshold", self.urgent.threshold)?;

        if self.validation.min_message_len > self.validation.max_message_len {
            return Err(Error::Config(format!(
                "validation.min_message_len ({}) exceeds validation.max_message_len ({})",
                self.validation.min_message_len, self.validation.max_message_len
            )));
        }
        if self.inference.timeout_secs == 0 {
            return Err(Error::Config("inference.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Default configuration file location (`~/.config/tagdesk/tagdesk.toml` on Linux)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("tagdesk").join("tagdesk.toml"))
        .unwrap_or_else(|| PathBuf::from("tagdesk.toml"))
}

/// OS-dependent data directory holding the database
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tagdesk"))
        .unwrap_or_else(|| PathBuf::from("./tagdesk_data"))
}
