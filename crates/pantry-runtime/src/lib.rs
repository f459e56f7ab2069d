//! # pantry-runtime
//!
//! Everything in Pantry that talks to the outside world.
//!
//! This crate wires the deterministic pieces of `pantry-core` to:
//! - Spoonacular for recipe search and detail lookup
//! - Gemini for advisory reasoning over each request
//! - Telegram and SendGrid for shopping list delivery
//!
//! ## Failure model
//!
//! Gateways return [`pantry_core::GatewayResult`]. Missing credentials fail
//! before any network call. Transient failures and rate limits are retried
//! with exponential backoff. Everything else is reported in the pipeline's
//! response rather than raised.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pantry_core::FindRecipesRequest;
//! use pantry_runtime::{Credentials, Orchestrator, RuntimeConfig};
//!
//! let config = RuntimeConfig::load(None)?;
//! let credentials = Credentials::load(&config.credentials);
//! let orchestrator = Orchestrator::from_config(&config, credentials);
//!
//! let request = FindRecipesRequest::from_json(r#"{"ingredients": "chicken, rice"}"#)?;
//! let response = orchestrator.find_recipes(&request).await?;
//! ```

pub mod config;
pub mod gateways;
pub mod orchestrator;
pub mod prompt_log;
pub mod prompts;
pub mod providers;
pub mod reasoning;
pub mod resilience;
pub mod secrets;

pub use config::{ConfigError, RuntimeConfig};
pub use gateways::{
    DeliveryChannel, RecipeSource, SendGridGateway, SpoonacularGateway, TelegramGateway,
};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, PipelineError};
pub use prompt_log::PromptLog;
pub use providers::{CompletionConfig, CompletionResponse, GeminiProvider, LlmProvider};
pub use reasoning::ReasoningGateway;
pub use resilience::RetryPolicy;
pub use secrets::{ApiCredential, CredentialSource, Credentials};
