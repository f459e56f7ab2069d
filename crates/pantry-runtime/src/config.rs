//! Runtime configuration.
//!
//! Loaded once at startup from YAML (every section optional) and passed by
//! value into the components that need it. Durations use humantime syntax:
//!
//! ```yaml
//! recipes:
//!   base_url: https://api.spoonacular.com
//!   timeout: 15s
//!   retry: { max_retries: 1, base_delay: 500ms }
//! reasoning:
//!   model: gemini-1.5-flash-latest
//!   timeout: 30s
//! prompt_log:
//!   dir: logs
//! credentials:
//!   spoonacular_api_key: "..."
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::resilience::RetryPolicy;

/// Config file read when no path is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "pantry.yaml";

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);
const REASONING_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde adapter for humantime durations (`500ms`, `15s`, `1m 30s`).
pub(crate) mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

/// Spoonacular recipe lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeApiConfig {
    pub base_url: String,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    pub retry: RetryPolicy,

    /// Results requested per search
    pub results: u32,
}

impl Default for RecipeApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.spoonacular.com".to_string(),
            timeout: PROVIDER_TIMEOUT,
            retry: RetryPolicy::provider_default(),
            results: 5,
        }
    }
}

/// Gemini reasoning calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub base_url: String,

    pub model: String,

    pub temperature: f32,

    pub max_output_tokens: u32,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    pub retry: RetryPolicy,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            temperature: 0.6,
            max_output_tokens: 2048,
            timeout: REASONING_TIMEOUT,
            retry: RetryPolicy::reasoning_default(),
        }
    }
}

/// Telegram bot delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub base_url: String,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    pub retry: RetryPolicy,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.telegram.org".to_string(),
            timeout: PROVIDER_TIMEOUT,
            retry: RetryPolicy::provider_default(),
        }
    }
}

/// SendGrid email delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub base_url: String,

    /// Display name on outgoing mail
    pub sender_name: String,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    pub retry: RetryPolicy,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sendgrid.com".to_string(),
            sender_name: "Recipe Suggester Extension".to_string(),
            timeout: PROVIDER_TIMEOUT,
            retry: RetryPolicy::provider_default(),
        }
    }
}

/// Dated prompt/response log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLogConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for PromptLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("logs"),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub recipes: RecipeApiConfig,
    pub reasoning: ReasoningConfig,
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
    pub prompt_log: PromptLogConfig,

    /// Credential values by key; the environment fills in anything absent
    pub credentials: serde_json::Value,
}

impl RuntimeConfig {
    /// Parse from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] when present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("recipes.base_url", &self.recipes.base_url),
            ("reasoning.base_url", &self.reasoning.base_url),
            ("telegram.base_url", &self.telegram.base_url),
            ("email.base_url", &self.email.base_url),
        ];
        for (key, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{} must start with http:// or https://",
                    key
                )));
            }
        }

        let timeouts = [
            ("recipes.timeout", self.recipes.timeout),
            ("reasoning.timeout", self.reasoning.timeout),
            ("telegram.timeout", self.telegram.timeout),
            ("email.timeout", self.email.timeout),
        ];
        for (key, timeout) in timeouts {
            if timeout.is_zero() {
                return Err(ConfigError::Invalid(format!("{} must be positive", key)));
            }
        }

        if !(0.0..=2.0).contains(&self.reasoning.temperature) {
            return Err(ConfigError::Invalid(
                "reasoning.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.recipes.results == 0 {
            return Err(ConfigError::Invalid(
                "recipes.results must be at least 1".to_string(),
            ));
        }

        if !self.credentials.is_null() && !self.credentials.is_object() {
            return Err(ConfigError::Invalid(
                "credentials must be a mapping".to_string(),
            ));
        }

        Ok(())
    }
}
