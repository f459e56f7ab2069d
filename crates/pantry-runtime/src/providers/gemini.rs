//! Google Gemini provider (`generateContent`).
//!
//! ## Security
//!
//! Gemini takes the key as a `key` query parameter. Transport errors are
//! stripped of their URL before they are reported so the key never reaches a
//! log line or a response.

use super::{CompletionConfig, CompletionResponse, LlmProvider, TokenUsage};
use crate::gateways::{read_error_body, transport_error};
use crate::secrets::ApiCredential;
use async_trait::async_trait;
use pantry_core::{GatewayError, GatewayResult, Service};
use serde::{Deserialize, Serialize};

const SERVICE: Service = Service::Reasoning;

/// Gemini generative-language provider.
pub struct GeminiProvider {
    credential: Option<ApiCredential>,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider against `base_url` (e.g. `https://generativelanguage.googleapis.com/v1beta`).
    pub fn new(credential: Option<ApiCredential>, base_url: impl Into<String>) -> Self {
        Self {
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GenerateResponse {
    fn into_completion(self) -> GatewayResult<CompletionResponse> {
        if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
            let ratings = self
                .prompt_feedback
                .map(|f| f.safety_ratings)
                .unwrap_or_default();
            return Err(GatewayError::ProviderValidation {
                service: SERVICE,
                detail: format!("Gemini request blocked due to: {}. Ratings: {}", reason, ratings),
            });
        }

        let usage = self
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            GatewayError::ResponseParse {
                service: SERVICE,
                detail: "Gemini response missing candidates.".to_string(),
            }
        })?;

        let content = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| GatewayError::ResponseParse {
                service: SERVICE,
                detail: "candidate has no text part".to_string(),
            })?;

        Ok(CompletionResponse {
            content,
            usage,
            finish_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> GatewayResult<CompletionResponse> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(GatewayError::MissingCredential { service: SERVICE })?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };

        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, config.model
            ))
            .query(&[("key", credential.expose())])
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            let detail = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::from_status(SERVICE, status.as_u16(), None, detail));
        }

        let body: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::ResponseParse {
                    service: SERVICE,
                    detail: e.without_url().to_string(),
                })?;

        let completion = body.into_completion()?;
        tracing::debug!(
            model = %config.model,
            prompt_tokens = completion.usage.prompt_tokens,
            completion_tokens = completion.usage.completion_tokens,
            "Gemini completion received"
        );
        Ok(completion)
    }

    fn is_configured(&self) -> bool {
        self.credential.as_ref().is_some_and(|c| !c.is_empty())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
