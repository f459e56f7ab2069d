//! Request parsing and response models.

use super::schema::{validate_request_schema, RequestKind};
use crate::reasoning::ReasoningMetadata;
use crate::types::{DeliveryMethod, IngredientRef, Preferences, RecipeSummary, ANY_PREFERENCE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing an inbound request.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid input provided: malformed JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid input provided: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
}

fn parse<T: DeserializeOwned>(kind: RequestKind, json: &str) -> Result<T, RequestError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    parse_value(kind, value)
}

fn parse_value<T: DeserializeOwned>(
    kind: RequestKind,
    value: serde_json::Value,
) -> Result<T, RequestError> {
    validate_request_schema(kind, &value).map_err(RequestError::SchemaViolation)?;
    Ok(serde_json::from_value(value)?)
}

fn any_preference() -> String {
    ANY_PREFERENCE.to_string()
}

/// `find-recipes` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRecipesRequest {
    /// Comma-separated ingredient names
    pub ingredients: String,

    #[serde(default = "any_preference", deserialize_with = "null_as_any")]
    pub food_type: String,

    #[serde(default = "any_preference", deserialize_with = "null_as_any")]
    pub cuisine: String,
}

fn null_as_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(any_preference))
}

impl FindRecipesRequest {
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        parse(RequestKind::FindRecipes, json)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RequestError> {
        parse_value(RequestKind::FindRecipes, value)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            food_type: self.food_type.clone(),
            cuisine: self.cuisine.clone(),
        }
    }
}

/// `missing-ingredients` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingIngredientsRequest {
    pub recipe_id: i64,

    pub recipe_title: String,

    /// Owned ingredient names; null entries are tolerated
    #[serde(default)]
    pub user_ingredients: Vec<Option<String>>,
}

impl MissingIngredientsRequest {
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        parse(RequestKind::MissingIngredients, json)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RequestError> {
        parse_value(RequestKind::MissingIngredients, value)
    }

    /// Owned names with null and blank entries removed.
    pub fn owned_ingredients(&self) -> Vec<String> {
        self.user_ingredients
            .iter()
            .flatten()
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// `send-list` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendListRequest {
    pub delivery_method: DeliveryMethod,

    /// Telegram chat ID or recipient email address
    pub delivery_details: String,

    pub recipe_title: String,

    #[serde(default)]
    pub missing_ingredients: Vec<IngredientRef>,
}

impl SendListRequest {
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        parse(RequestKind::SendList, json)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RequestError> {
        parse_value(RequestKind::SendList, value)
    }
}

/// `find-recipes` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRecipesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<RecipeSummary>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "llm_prompt", skip_serializing_if = "Option::is_none")]
    pub llm_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReasoningMetadata>,
}

/// `missing-ingredients` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingIngredientsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_ingredients: Option<Vec<IngredientRef>>,

    /// True when the list was estimated from the recipe title
    pub is_estimate: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "llm_prompt", skip_serializing_if = "Option::is_none")]
    pub llm_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReasoningMetadata>,
}

impl MissingIngredientsResponse {
    /// True when the response carries a list the user can act on, exact or estimated.
    pub fn has_usable_list(&self) -> bool {
        self.error.is_none() || self.is_estimate
    }
}

/// `send-list` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendListResponse {
    pub success: bool,

    /// Confirmation or error message
    pub message: String,

    #[serde(rename = "llm_prompt", skip_serializing_if = "Option::is_none")]
    pub llm_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReasoningMetadata>,
}
