//! Structured view of a reasoning model reply.
//!
//! The model produces free text. We extract the tags it was asked to emit and
//! carry them to the caller as diagnostics. Extracted `[ERROR: ...]` tags
//! promote the whole result to failed, even when the call itself succeeded.

pub mod tags;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Text returned when the reasoning service has no credential.
pub const MISSING_KEY_FALLBACK: &str = "[Fallback due to missing API key]";

/// Prefix of the summary set when the model flagged errors in its own reply.
pub const MODEL_FLAGGED_PREFIX: &str = "LLM identified issues";

/// Tags extracted from a model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningMetadata {
    pub self_check: String,
    pub reasoning_types: BTreeSet<String>,
    pub uncertainties: BTreeSet<String>,
    pub errors: BTreeSet<String>,
    pub preference_uncertainties: BTreeSet<String>,
    pub preference_errors: BTreeSet<String>,
}

impl Default for ReasoningMetadata {
    fn default() -> Self {
        Self {
            self_check: "Not performed".to_string(),
            reasoning_types: BTreeSet::new(),
            uncertainties: BTreeSet::new(),
            errors: BTreeSet::new(),
            preference_uncertainties: BTreeSet::new(),
            preference_errors: BTreeSet::new(),
        }
    }
}

/// Parse every tag out of a model reply.
pub fn extract_metadata(text: &str) -> ReasoningMetadata {
    let uncertainties = tags::uncertainties(text);
    let errors = tags::errors(text);

    ReasoningMetadata {
        self_check: tags::self_check(text),
        reasoning_types: tags::reasoning_types(text),
        preference_uncertainties: tags::preference_related(&uncertainties),
        preference_errors: tags::preference_related(&errors),
        uncertainties,
        errors,
    }
}

/// Outcome of one reasoning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningResult {
    /// Model reply, or a bracketed fallback note when the call failed
    pub text: String,

    /// Prompt that was sent, if the call was attempted
    pub prompt_sent: Option<String>,

    pub metadata: ReasoningMetadata,

    /// Call failure or summary of model-flagged errors
    pub error: Option<String>,
}

impl ReasoningResult {
    /// Result for a successful call: tags are parsed and error tags promoted.
    pub fn from_reply(text: impl Into<String>, prompt: impl Into<String>) -> Self {
        let text = text.into();
        let metadata = extract_metadata(&text);
        let error = if metadata.errors.is_empty() {
            None
        } else {
            Some(format!(
                "{}: {}",
                MODEL_FLAGGED_PREFIX,
                join(&metadata.errors)
            ))
        };

        Self {
            text,
            prompt_sent: Some(prompt.into()),
            metadata,
            error,
        }
    }

    /// Result when no credential is configured; nothing was sent.
    pub fn missing_credential(error: impl Into<String>) -> Self {
        Self {
            text: MISSING_KEY_FALLBACK.to_string(),
            prompt_sent: None,
            metadata: ReasoningMetadata::default(),
            error: Some(error.into()),
        }
    }

    /// Result when the call was attempted and failed.
    pub fn call_failed(error: impl Into<String>, prompt: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            text: format!("[Fallback due to LLM API error: {}]", error),
            prompt_sent: Some(prompt.into()),
            metadata: ReasoningMetadata::default(),
            error: Some(error),
        }
    }

    /// True when the model itself flagged errors in its reply.
    pub fn model_flagged_issues(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.starts_with(MODEL_FLAGGED_PREFIX))
    }

    /// True when the model reported the user's ingredients as invalid.
    pub fn flags_invalid_ingredients(&self) -> bool {
        self.model_flagged_issues()
            && self
                .metadata
                .errors
                .iter()
                .any(|e| e.to_lowercase().contains("invalid ingredients"))
    }

    /// Model-flagged errors joined for display.
    pub fn joined_errors(&self) -> String {
        join(&self.metadata.errors)
    }
}

fn join(items: &BTreeSet<String>) -> String {
    items.iter().cloned().collect::<Vec<_>>().join("; ")
}
