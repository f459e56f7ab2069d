//! Shared data model for all pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Preference value meaning "no filter".
pub const ANY_PREFERENCE: &str = "any";

/// An ingredient, either taken from a recipe or estimated from its title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRef {
    #[serde(default)]
    pub id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub unit: Option<String>,

    /// True when the ingredient is a heuristic guess rather than recipe data
    #[serde(default)]
    pub is_estimate: bool,
}

impl IngredientRef {
    /// Create an ingredient backed by recipe data.
    pub fn authoritative(
        id: Option<i64>,
        name: impl Into<String>,
        amount: Option<f64>,
        unit: Option<&str>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            unit: unit.map(str::to_string),
            is_estimate: false,
        }
    }

    /// Create a heuristic ingredient.
    pub fn estimate(name: impl Into<String>, amount: f64, unit: &str) -> Self {
        Self {
            id: None,
            name: name.into(),
            amount: Some(amount),
            unit: Some(unit.to_string()),
            is_estimate: true,
        }
    }

    /// Unit, if present and non-blank.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// One candidate recipe from a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub used_ingredient_count: u32,

    #[serde(default)]
    pub missed_ingredient_count: u32,
}

/// Full recipe information from a detail lookup.
///
/// `ingredients` is parsed on a best-effort basis: when the ingredient list is
/// absent or malformed it holds the reason, and `raw` still carries the payload.
#[derive(Debug, Clone)]
pub struct RecipeDetails {
    pub id: i64,
    pub title: Option<String>,
    pub ingredients: Result<Vec<IngredientRef>, String>,
    pub raw: serde_json::Value,
}

/// User preferences used to filter recipe discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "any_preference")]
    pub food_type: String,

    #[serde(default = "any_preference")]
    pub cuisine: String,
}

fn any_preference() -> String {
    ANY_PREFERENCE.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            food_type: any_preference(),
            cuisine: any_preference(),
        }
    }
}

impl Preferences {
    /// Food type, unless it is blank or "any".
    pub fn food_type_filter(&self) -> Option<&str> {
        specific(&self.food_type)
    }

    /// Cuisine, unless it is blank or "any".
    pub fn cuisine_filter(&self) -> Option<&str> {
        specific(&self.cuisine)
    }
}

fn specific(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ANY_PREFERENCE) {
        None
    } else {
        Some(value)
    }
}

/// Channel used to deliver a shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Telegram,
    Email,
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMethod::Telegram => write!(f, "telegram"),
            DeliveryMethod::Email => write!(f, "email"),
        }
    }
}

/// Pipeline stage, used to pick the reasoning prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FindRecipes,
    MissingIngredients,
    SendList,
}

impl Stage {
    /// Stage number as shown in prompts and logs.
    pub fn number(&self) -> u8 {
        match self {
            Stage::FindRecipes => 1,
            Stage::MissingIngredients => 2,
            Stage::SendList => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::FindRecipes => write!(f, "Stage 1: Find Recipes"),
            Stage::MissingIngredients => write!(f, "Stage 2: Missing Ingredients"),
            Stage::SendList => write!(f, "Stage 3: Send List"),
        }
    }
}
