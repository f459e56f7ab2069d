//! Reasoning gateway: one structured model call per pipeline stage.
//!
//! The result is advisory. Call failures are folded into the returned
//! [`ReasoningResult`] rather than propagated, so a pipeline always gets a
//! value back and decides for itself what to do with flagged issues.

use std::sync::Arc;

use pantry_core::{GatewayError, ReasoningResult, Service, Stage};

use crate::prompt_log::PromptLog;
use crate::prompts::build_prompt;
use crate::providers::{CompletionConfig, LlmProvider};
use crate::resilience::RetryPolicy;

/// Wraps an [`LlmProvider`] with prompts, retry and the prompt log.
pub struct ReasoningGateway {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    retry: RetryPolicy,
    log: Option<PromptLog>,
}

impl ReasoningGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig, retry: RetryPolicy) -> Self {
        Self {
            provider,
            completion,
            retry,
            log: None,
        }
    }

    /// Record prompts and replies to `log`.
    pub fn with_prompt_log(mut self, log: PromptLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Run the stage prompt for `query` and parse the reply.
    ///
    /// Without a credential nothing is sent or logged.
    pub async fn analyze(&self, query: &str, stage: Stage, context: &serde_json::Value) -> ReasoningResult {
        if !self.provider.is_configured() {
            let err = GatewayError::MissingCredential {
                service: Service::Reasoning,
            };
            tracing::warn!(stage = stage.number(), "Reasoning skipped: {}", err);
            return ReasoningResult::missing_credential(err.to_string());
        }

        let prompt = build_prompt(query, stage);
        if let Some(log) = &self.log {
            log.record_prompt(stage, query, context, &prompt).await;
        }

        tracing::info!(
            stage = stage.number(),
            provider = self.provider.name(),
            model = %self.completion.model,
            "Requesting reasoning"
        );

        let outcome = self
            .retry
            .execute(
                || self.provider.complete(&prompt, &self.completion),
                GatewayError::is_retryable,
            )
            .await;

        match outcome {
            Ok(response) => {
                if let Some(log) = &self.log {
                    log.record_response(stage, Ok(&response.content)).await;
                }
                tracing::debug!(
                    stage = stage.number(),
                    total_tokens = response.usage.total(),
                    finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
                    "Reasoning reply received"
                );

                let result = ReasoningResult::from_reply(response.content, prompt);
                if let Some(error) = &result.error {
                    tracing::warn!(stage = stage.number(), error = %error, "Model flagged issues");
                }
                result
            }
            Err(e) => {
                let error = e.to_string();
                if let Some(log) = &self.log {
                    log.record_response(stage, Err(&error)).await;
                }
                tracing::error!(stage = stage.number(), error = %error, "Reasoning call failed");
                ReasoningResult::call_failed(error, prompt)
            }
        }
    }
}
