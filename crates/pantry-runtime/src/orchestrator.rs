//! Pipeline orchestrator for the three user-facing operations.
//!
//! Each pipeline runs its steps in order:
//! 1. Reasoning over the request (advisory, never fatal on its own)
//! 2. Recipe lookup or list delivery through a gateway
//! 3. Deterministic post-processing from `pantry-core`
//!
//! Every response carries the prompt that was sent and the tags parsed from
//! the model's reply.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use pantry_core::shopping_list::items_text;
use pantry_core::{
    find_missing, generate_fallback, DeliveryMethod, FindRecipesRequest, FindRecipesResponse,
    MissingIngredientsRequest, MissingIngredientsResponse, ReasoningResult, SendListRequest,
    SendListResponse, ShoppingListMessage, Stage,
};

use crate::config::RuntimeConfig;
use crate::gateways::{
    DeliveryChannel, RecipeSource, SendGridGateway, SpoonacularGateway, TelegramGateway,
};
use crate::prompt_log::PromptLog;
use crate::providers::{CompletionConfig, GeminiProvider};
use crate::reasoning::ReasoningGateway;
use crate::secrets::Credentials;

/// Shown when a search succeeds with nothing to suggest.
pub const NO_RECIPES_MESSAGE: &str = "No recipes found matching your ingredients and preferences.";

/// Failures that are not part of a pipeline's normal response.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Orchestrator not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to serialize pipeline context: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Runs the find-recipes, missing-ingredients and send-list pipelines.
pub struct Orchestrator {
    recipes: Arc<dyn RecipeSource>,
    reasoning: ReasoningGateway,
    telegram: Arc<dyn DeliveryChannel>,
    email: Arc<dyn DeliveryChannel>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Wire the production gateways from configuration.
    pub fn from_config(config: &RuntimeConfig, credentials: Credentials) -> Self {
        let Credentials {
            spoonacular,
            gemini,
            telegram_bot,
            sendgrid,
            sendgrid_sender,
        } = credentials;

        let provider = Arc::new(GeminiProvider::new(gemini, config.reasoning.base_url.clone()));
        let mut reasoning = ReasoningGateway::new(
            provider,
            CompletionConfig::from(&config.reasoning),
            config.reasoning.retry,
        );
        if config.prompt_log.enabled {
            let log = PromptLog::new(config.prompt_log.dir.clone());
            tracing::info!(dir = %log.dir().display(), "Prompt logging enabled");
            reasoning = reasoning.with_prompt_log(log);
        }

        Self {
            recipes: Arc::new(SpoonacularGateway::new(spoonacular, &config.recipes)),
            reasoning,
            telegram: Arc::new(TelegramGateway::new(telegram_bot, &config.telegram)),
            email: Arc::new(SendGridGateway::new(sendgrid, sendgrid_sender, &config.email)),
        }
    }

    fn channel(&self, method: DeliveryMethod) -> &dyn DeliveryChannel {
        match method {
            DeliveryMethod::Telegram => self.telegram.as_ref(),
            DeliveryMethod::Email => self.email.as_ref(),
        }
    }

    /// Suggest recipes for the user's ingredients and preferences.
    pub async fn find_recipes(
        &self,
        request: &FindRecipesRequest,
    ) -> Result<FindRecipesResponse, PipelineError> {
        let preferences = request.preferences();
        let ingredients = request.ingredients.trim();

        let mut query = format!(
            "The user wants recipe suggestions for these ingredients: '{}'",
            request.ingredients
        );
        if let Some(food_type) = preferences.food_type_filter() {
            query.push_str(&format!(", with food type preference: {}", food_type));
        }
        if let Some(cuisine) = preferences.cuisine_filter() {
            query.push_str(&format!(", and cuisine preference: {}", cuisine));
        }
        let context = json!({
            "stage": Stage::FindRecipes.number(),
            "userIngredients": request.ingredients,
            "preferences": preferences,
        });

        let reasoning = self.reasoning.analyze(&query, Stage::FindRecipes, &context).await;
        let mut response = FindRecipesResponse {
            llm_prompt: reasoning.prompt_sent.clone(),
            metadata: Some(reasoning.metadata.clone()),
            ..Default::default()
        };

        if reasoning.flags_invalid_ingredients() {
            tracing::warn!(ingredients, "Model rejected the ingredient list");
            response.error = Some(format!(
                "Invalid ingredients detected: {}",
                reasoning.joined_errors()
            ));
            return Ok(response);
        }

        match self.recipes.find_by_ingredients(ingredients, &preferences).await {
            Ok(recipes) => {
                if recipes.is_empty() {
                    response.message = Some(NO_RECIPES_MESSAGE.to_string());
                }
                response.recipes = Some(recipes);
            }
            Err(e) => response.error = Some(e.to_string()),
        }
        Ok(response)
    }

    /// Work out which of a recipe's ingredients the user still needs.
    ///
    /// Falls back to a title-based estimate when the recipe cannot be read.
    pub async fn missing_ingredients(
        &self,
        request: &MissingIngredientsRequest,
    ) -> Result<MissingIngredientsResponse, PipelineError> {
        let owned = request.owned_ingredients();

        let query = format!(
            "The user selected the recipe '{}' (ID: {}) and has these ingredients: {}. We need to determine what ingredients they're missing for this recipe.",
            request.recipe_title,
            request.recipe_id,
            owned.join(", ")
        );
        let context = json!({
            "stage": Stage::MissingIngredients.number(),
            "recipeId": request.recipe_id,
            "recipeTitle": request.recipe_title,
            "userIngredients": owned,
        });

        let reasoning = self
            .reasoning
            .analyze(&query, Stage::MissingIngredients, &context)
            .await;
        let mut response = with_reasoning(&reasoning);

        let details = match self.recipes.recipe_details(request.recipe_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(recipe_id = request.recipe_id, "Using estimated ingredients");
                response.missing_ingredients = Some(generate_fallback(&request.recipe_title));
                response.is_estimate = true;
                response.error = Some(format!("Could not retrieve exact recipe ingredients: {}", e));
                return Ok(response);
            }
        };

        match details.ingredients {
            Ok(required) => {
                response.missing_ingredients = Some(find_missing(&required, &owned));
                response.is_estimate = false;
            }
            Err(issue) => {
                tracing::warn!(recipe_id = request.recipe_id, "Using estimated ingredients");
                response.missing_ingredients = Some(generate_fallback(&request.recipe_title));
                response.is_estimate = true;
                response.error = Some(format!("Error processing recipe ingredients: {}", issue));
            }
        }
        Ok(response)
    }

    /// Format the shopping list and deliver it.
    pub async fn send_list(
        &self,
        request: &SendListRequest,
    ) -> Result<SendListResponse, PipelineError> {
        let items = items_text(&request.missing_ingredients);
        let method_name = match request.delivery_method {
            DeliveryMethod::Telegram => "Telegram",
            DeliveryMethod::Email => "Email",
        };

        let query = format!(
            "The user wants to send a shopping list for the recipe '{}' via {} to '{}'. The list contains these items:\n{}",
            request.recipe_title, method_name, request.delivery_details, items
        );
        let context = json!({
            "stage": Stage::SendList.number(),
            "deliveryMethod": request.delivery_method,
            "deliveryDetails": request.delivery_details,
            "recipeTitle": request.recipe_title,
            "missingIngredients": serde_json::to_value(&request.missing_ingredients)?,
        });

        let reasoning = self.reasoning.analyze(&query, Stage::SendList, &context).await;

        let message = ShoppingListMessage::compose(&request.recipe_title, &request.missing_ingredients);
        let channel = self.channel(request.delivery_method);
        let outcome = channel.deliver(&request.delivery_details, &message).await;

        let (success, message) = match outcome {
            Ok(()) => {
                tracing::info!(method = %channel.method(), "Shopping list delivered");
                (true, format!("Shopping list sent successfully via {}!", method_name))
            }
            Err(e) => (false, e.to_string()),
        };

        Ok(SendListResponse {
            success,
            message,
            llm_prompt: reasoning.prompt_sent,
            metadata: Some(reasoning.metadata),
        })
    }
}

fn with_reasoning(reasoning: &ReasoningResult) -> MissingIngredientsResponse {
    MissingIngredientsResponse {
        llm_prompt: reasoning.prompt_sent.clone(),
        metadata: Some(reasoning.metadata.clone()),
        ..Default::default()
    }
}

/// Builder for an [`Orchestrator`] with custom collaborators.
pub struct OrchestratorBuilder {
    recipes: Option<Arc<dyn RecipeSource>>,
    reasoning: Option<ReasoningGateway>,
    telegram: Option<Arc<dyn DeliveryChannel>>,
    email: Option<Arc<dyn DeliveryChannel>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            recipes: None,
            reasoning: None,
            telegram: None,
            email: None,
        }
    }

    pub fn recipes(mut self, recipes: Arc<dyn RecipeSource>) -> Self {
        self.recipes = Some(recipes);
        self
    }

    pub fn reasoning(mut self, reasoning: ReasoningGateway) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    pub fn telegram(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.telegram = Some(channel);
        self
    }

    pub fn email(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    pub fn build(self) -> Result<Orchestrator, PipelineError> {
        let missing = |what: &str| PipelineError::NotConfigured(format!("{} is required", what));

        Ok(Orchestrator {
            recipes: self.recipes.ok_or_else(|| missing("recipe source"))?,
            reasoning: self.reasoning.ok_or_else(|| missing("reasoning gateway"))?,
            telegram: self.telegram.ok_or_else(|| missing("telegram channel"))?,
            email: self.email.ok_or_else(|| missing("email channel"))?,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
