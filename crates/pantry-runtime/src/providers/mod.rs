//! Language model provider abstraction.
//!
//! The reasoning gateway talks to a model only through [`LlmProvider`], so
//! tests can substitute a fake and the remote API stays swappable.
//!
//! ## Security
//!
//! Providers hold their key as an [`ApiCredential`](crate::secrets::ApiCredential)
//! and expose it only when building the HTTP request.

use async_trait::async_trait;
use pantry_core::GatewayResult;
use std::time::Duration;

mod gemini;

pub use gemini::GeminiProvider;

/// Configuration for a completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash-latest".to_string(),
            temperature: 0.6,
            max_output_tokens: 2048,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&crate::config::ReasoningConfig> for CompletionConfig {
    fn from(config: &crate::config::ReasoningConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout: config.timeout,
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated text
    pub content: String,

    pub usage: TokenUsage,

    /// Why generation stopped, if reported
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            finish_reason: None,
        }
    }
}

/// Token usage from a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A text-in, text-out language model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion. Failures are already classified.
    async fn complete(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> GatewayResult<CompletionResponse>;

    /// Whether a credential is present. When false no call is attempted.
    fn is_configured(&self) -> bool;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
