//! Spoonacular recipe search and detail lookup.

use super::{read_error_body, transport_error, RecipeSource};
use crate::config::RecipeApiConfig;
use crate::resilience::RetryPolicy;
use crate::secrets::ApiCredential;
use async_trait::async_trait;
use pantry_core::{
    GatewayError, GatewayResult, IngredientRef, Preferences, RecipeDetails, RecipeSummary, Service,
};
use serde::Deserialize;
use std::time::Duration;

const SERVICE: Service = Service::RecipeLookup;

/// Diets Spoonacular can filter on. Other food types are not sent.
const SUPPORTED_DIETS: [&str; 2] = ["vegetarian", "vegan"];

/// Spoonacular REST client.
pub struct SpoonacularGateway {
    credential: Option<ApiCredential>,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    results: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for SpoonacularGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoonacularGateway")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// One entry of `extendedIngredients`.
#[derive(Debug, Deserialize)]
struct ExtendedIngredient {
    id: i64,
    name: String,
    amount: f64,
    unit: String,
}

impl SpoonacularGateway {
    pub fn new(credential: Option<ApiCredential>, config: &RecipeApiConfig) -> Self {
        Self {
            credential,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            retry: config.retry,
            results: config.results,
            client: reqwest::Client::new(),
        }
    }

    fn credential(&self) -> GatewayResult<&ApiCredential> {
        self.credential
            .as_ref()
            .ok_or(GatewayError::MissingCredential { service: SERVICE })
    }

    /// Query parameters for a search, without the key.
    fn search_params(&self, ingredients: &str, preferences: &Preferences) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("ingredients", ingredients.to_string()),
            ("number", self.results.to_string()),
            ("ranking", "1".to_string()),
        ];
        if let Some(cuisine) = preferences.cuisine_filter() {
            params.push(("cuisine", cuisine.to_string()));
        }
        if let Some(diet) = preferences
            .food_type_filter()
            .map(str::to_lowercase)
            .filter(|d| SUPPORTED_DIETS.contains(&d.as_str()))
        {
            params.push(("diet", diet));
        }
        params
    }

    async fn search_once(
        &self,
        key: &str,
        params: &[(&'static str, String)],
    ) -> GatewayResult<Vec<RecipeSummary>> {
        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .get(format!("{}/recipes/findByIngredients", self.base_url))
            .query(params)
            .query(&[("apiKey", key)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(GatewayError::from_status(SERVICE, status.as_u16(), None, body));
        }

        response.json().await.map_err(|e| GatewayError::ResponseParse {
            service: SERVICE,
            detail: e.without_url().to_string(),
        })
    }

    async fn details_once(&self, key: &str, recipe_id: i64) -> GatewayResult<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/recipes/{}/information", self.base_url, recipe_id))
            .query(&[("includeNutrition", "false"), ("apiKey", key)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(GatewayError::from_status(
                SERVICE,
                status.as_u16(),
                Some(format!("Recipe ID {}", recipe_id)),
                body,
            ));
        }

        response.json().await.map_err(|e| GatewayError::ResponseParse {
            service: SERVICE,
            detail: e.without_url().to_string(),
        })
    }
}

/// Best-effort parse of `extendedIngredients`.
///
/// An absent or empty list is an issue too: the recipe cannot be compared without it.
fn extended_ingredients(raw: &serde_json::Value) -> Result<Vec<IngredientRef>, String> {
    let list = raw
        .get("extendedIngredients")
        .ok_or_else(|| "recipe has no extendedIngredients".to_string())?;

    let parsed: Vec<ExtendedIngredient> =
        serde_json::from_value(list.clone()).map_err(|e| e.to_string())?;
    if parsed.is_empty() {
        return Err("recipe has no extendedIngredients".to_string());
    }

    Ok(parsed
        .into_iter()
        .map(|i| IngredientRef::authoritative(Some(i.id), i.name, Some(i.amount), Some(&i.unit)))
        .collect())
}

#[async_trait]
impl RecipeSource for SpoonacularGateway {
    async fn find_by_ingredients(
        &self,
        ingredients: &str,
        preferences: &Preferences,
    ) -> GatewayResult<Vec<RecipeSummary>> {
        let key = self.credential()?.expose();
        let params = self.search_params(ingredients, preferences);
        tracing::info!(
            ingredients,
            cuisine = preferences.cuisine_filter(),
            food_type = preferences.food_type_filter(),
            "Searching Spoonacular by ingredients"
        );

        let recipes = self
            .retry
            .execute(|| self.search_once(key, &params), GatewayError::is_retryable)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Spoonacular search failed"))?;

        tracing::info!(count = recipes.len(), "Spoonacular search complete");
        Ok(recipes)
    }

    async fn recipe_details(&self, recipe_id: i64) -> GatewayResult<RecipeDetails> {
        let key = self.credential()?.expose();
        tracing::info!(recipe_id, "Fetching Spoonacular recipe information");

        let raw = self
            .retry
            .execute(|| self.details_once(key, recipe_id), GatewayError::is_retryable)
            .await
            .inspect_err(|e| tracing::error!(recipe_id, error = %e, "Spoonacular lookup failed"))?;

        let ingredients = extended_ingredients(&raw);
        if let Err(issue) = &ingredients {
            tracing::warn!(recipe_id, issue = %issue, "Could not parse recipe ingredients");
        }

        Ok(RecipeDetails {
            id: recipe_id,
            title: raw.get("title").and_then(|t| t.as_str()).map(str::to_string),
            ingredients,
            raw,
        })
    }
}
