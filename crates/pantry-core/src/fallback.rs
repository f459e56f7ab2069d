//! Heuristic ingredient estimates for when recipe data is unavailable.

use crate::types::IngredientRef;

/// Prefix marking every estimated ingredient name.
pub const ESTIMATE_PREFIX: &str = "(Estimate) ";

const PASTA_KEYWORDS: [&str; 4] = ["pasta", "spaghetti", "lasagna", "macaroni"];

/// Estimate a recipe's ingredients from its title.
///
/// Always includes salt, pepper and cooking oil. At most one category is
/// added, checked in order: pasta, chicken, salad, soup. A title naming both
/// pasta and chicken only gets the pasta additions.
pub fn generate_fallback(recipe_title: &str) -> Vec<IngredientRef> {
    tracing::info!(title = recipe_title, "Generating fallback ingredients");
    let title = recipe_title.to_lowercase();

    let mut ingredients = vec![
        estimate("Salt", 1.0, "tsp"),
        estimate("Pepper", 0.5, "tsp"),
        estimate("Cooking Oil", 1.0, "tbsp"),
    ];

    if PASTA_KEYWORDS.iter().any(|k| title.contains(k)) {
        ingredients.push(estimate("Pasta", 8.0, "oz"));
        ingredients.push(estimate("Tomato Sauce", 1.0, "can"));
    } else if title.contains("chicken") {
        ingredients.push(estimate("Chicken", 1.0, "lb"));
    } else if title.contains("salad") {
        ingredients.push(estimate("Lettuce", 1.0, "head"));
        ingredients.push(estimate("Vinaigrette", 2.0, "tbsp"));
    } else if title.contains("soup") {
        ingredients.push(estimate("Broth", 4.0, "cups"));
    }

    ingredients
}

fn estimate(name: &str, amount: f64, unit: &str) -> IngredientRef {
    IngredientRef::estimate(format!("{}{}", ESTIMATE_PREFIX, name), amount, unit)
}
