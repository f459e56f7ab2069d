//! Reasoning prompts, one per pipeline stage.
//!
//! A prompt is assembled from:
//! 1. The shared preamble defining the tag grammar
//! 2. The stage section (self-check steps and error handling)
//! 3. The query, followed by a structure reminder
//!
//! The tags requested here are parsed by `pantry_core::reasoning::tags`.
//! Changing the wording of a tag breaks extraction.

use pantry_core::Stage;

/// Reasoning types the model may declare.
pub const REASONING_TYPES: [&str; 8] = [
    "ARITHMETIC",
    "RETRIEVAL",
    "COMPARISON",
    "LOGICAL",
    "CAUSAL",
    "ANALOGICAL",
    "CREATIVE",
    "SOCIAL",
];

/// Shared preamble for every stage.
pub const BASE_REASONING_PROMPT: &str = r#"
Think through this request step by step. Work out what is being asked, look at the information you have, and decide which further information or API calls are needed. Show your reasoning as you go.

Split the problem into parts that need different kinds of reasoning. For each part:
1. Name the reasoning type with a [REASONING TYPE: X] tag, where X is one of: ARITHMETIC, RETRIEVAL, COMPARISON, LOGICAL, CAUSAL, ANALOGICAL, CREATIVE, SOCIAL
2. Apply that reasoning explicitly
3. State the conclusion it leads to

Use these tags throughout so the reasoning can be followed.

IMPORTANT: Whenever you are unsure of something, say so with an [UNCERTAINTY: X] tag describing what you are unsure about and your confidence (low/medium/high). For example: [UNCERTAINTY: these look like common cooking ingredients, but 'szechuan peppercorns' may be specialized, confidence medium].

If information you need is missing, or you cannot decide something with confidence, flag it with an [ERROR: X] tag describing the problem. For example: [ERROR: Cannot determine ingredient quantities from the provided information].
"#;

/// Stage 1: recipe discovery with preferences.
pub const FIND_RECIPES_STAGE_PROMPT: &str = r#"
**Stage 1: Find Recipes**

The goal is to help find recipes that fit the user's ingredients and their preferences (food type and cuisine). The preferences come first: any recipe suggestion or ingredient check must respect them.

**Reasoning Instructions**:
- [REASONING TYPE: LOGICAL]: Check that the ingredients fit the food type preference (e.g. vegetarian, vegan). If the food type is 'vegan' and the list includes 'cheese' or 'eggs', flag it with [ERROR: Ingredient X is not compatible with vegan preference].
- [REASONING TYPE: COMPARISON]: Compare the ingredients with the cuisine preference (e.g. Italian, Mexican). If an ingredient is unusual for that cuisine, note [UNCERTAINTY: Ingredient X is uncommon in Y cuisine, confidence medium].
- [REASONING TYPE: RETRIEVAL]: Recipes will be fetched from the Spoonacular API. Confirm it can filter by the requested food type and cuisine. For a niche cuisine, flag [UNCERTAINTY: Spoonacular may not fully support filtering for X cuisine].

SELF-CHECK:
1. Have you identified every ingredient in the query? Are they plausible cooking ingredients?
2. Are the food type and cuisine preferences clear? If not, flag [ERROR: Ambiguous preferences: X].
3. Does any ingredient conflict with the food type preference? Flag [ERROR: Ingredient X conflicts with food type Y].
4. Do the ingredients suit the cuisine? If they seem unrelated, flag [UNCERTAINTY: Ingredients may not suit cuisine X].
5. Is a Spoonacular search with these ingredients and preferences the right step? If its filtering may be weak here, note [UNCERTAINTY: Spoonacular filtering for X may be limited].

ERROR HANDLING:
- If ingredients look invalid or unclear (non-food items, gibberish), flag [ERROR: Invalid ingredients provided: X] and suggest a clarification.
- If preferences contradict the ingredients (e.g. 'vegan' with 'chicken'), flag [ERROR: Contradictory preferences: X].
- If an ingredient may be missing from standard recipe databases, mark [UNCERTAINTY: Ingredient X might be too niche].
- If Spoonacular is unavailable, state [ERROR: Spoonacular tool unavailable] and suggest general ideas for these ingredients and preferences.
- If no recipes are found, suggest common ingredients that suit the food type and cuisine, or broader preferences.
"#;

/// Stage 2: missing-ingredient derivation.
pub const MISSING_INGREDIENTS_STAGE_PROMPT: &str = r#"
**Stage 2: Missing Ingredients**

IMPORTANT: After your first analysis, run a SELF-CHECK with these steps:
1. Confirm the selected recipe title and ID from the context.
2. Confirm the list of ingredients the user already has.
3. Confirm that the next step is to fetch the recipe's required ingredients.
4. Confirm that comparing required and available ingredients is how the missing items are found.
5. Confirm that the Spoonacular recipe information endpoint is the right tool for the recipe details.

Label this section "SELF-CHECK" and point out any errors or adjustments before continuing.

ERROR HANDLING:
- If the recipe ID looks invalid or is missing, flag [ERROR: Recipe ID missing or invalid] and suggest choosing the recipe again.
- If the user's ingredient list is missing, flag [ERROR: User ingredients list missing].
- If the recipe details cannot be retrieved, mark [ERROR: Failed to retrieve recipe details for ID X] and fall back to partial information or ingredients estimated from the title.
- If matching is doubtful (e.g. "onion" against "red onion"), mark [UNCERTAINTY: Matching X vs Y might be imprecise] and use your best judgment.
- If the API fails entirely after retries, describe the ingredients this kind of recipe usually needs (use ANALOGICAL reasoning).
"#;

/// Stage 3: shopping list delivery.
pub const SEND_LIST_STAGE_PROMPT: &str = r#"
**Stage 3: Send List**

IMPORTANT: After your first analysis, run a SELF-CHECK with these steps:
1. Confirm the delivery method (email or Telegram) from the context.
2. Confirm the delivery details look valid (an email address, or a numeric chat ID).
3. Confirm you have the missing-ingredient list, or confirmation that nothing is missing.
4. Confirm the recipe title is carried into the message.
5. Confirm the delivery tool (SendGrid or Telegram) matches the delivery method.

Label this section "SELF-CHECK" and point out any errors or adjustments before continuing.

ERROR HANDLING:
- If the delivery details look invalid (malformed email, non-numeric chat ID), flag [ERROR: Invalid delivery details: X].
- If the missing-ingredient list is absent from the context, flag [ERROR: Missing ingredients list unavailable].
- If the list is empty, confirm that this is fine and that the message should say so.
- If the delivery call fails after retries, mark [ERROR: Failed to send via X API] and tell the user the list could not be sent.
- If ingredient amounts or details are uncertain, mark [UNCERTAINTY: Details for ingredient X are estimates] and give your best estimate.
"#;

const CLOSING_REMINDER: &str = "Structure your response with [REASONING TYPE: X] tags for each reasoning step, include your SELF-CHECK section, flag uncertainties with [UNCERTAINTY: X] tags and errors with [ERROR: X] tags, then finish with the most helpful answer or plan of action.";

/// The stage section for a pipeline stage.
pub fn stage_prompt(stage: Stage) -> &'static str {
    match stage {
        Stage::FindRecipes => FIND_RECIPES_STAGE_PROMPT,
        Stage::MissingIngredients => MISSING_INGREDIENTS_STAGE_PROMPT,
        Stage::SendList => SEND_LIST_STAGE_PROMPT,
    }
}

/// Assemble the full prompt for a stage and query.
pub fn build_prompt(query: &str, stage: Stage) -> String {
    format!(
        "{}{}\nHere is the query to respond to:\n{}\n\n{}\n",
        BASE_REASONING_PROMPT,
        stage_prompt(stage),
        query,
        CLOSING_REMINDER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_sections() {
        assert!(stage_prompt(Stage::FindRecipes).contains("Stage 1: Find Recipes"));
        assert!(stage_prompt(Stage::MissingIngredients).contains("Stage 2: Missing Ingredients"));
        assert!(stage_prompt(Stage::SendList).contains("Stage 3: Send List"));
    }

    #[test]
    fn test_base_prompt_defines_grammar() {
        for reasoning_type in REASONING_TYPES {
            assert!(BASE_REASONING_PROMPT.contains(reasoning_type));
        }
        assert!(BASE_REASONING_PROMPT.contains("[UNCERTAINTY: X]"));
        assert!(BASE_REASONING_PROMPT.contains("[ERROR: X]"));
    }

    #[test]
    fn test_every_stage_requests_self_check() {
        for stage in [Stage::FindRecipes, Stage::MissingIngredients, Stage::SendList] {
            let section = stage_prompt(stage);
            assert!(section.contains("SELF-CHECK"));
            assert!(section.contains("ERROR HANDLING:"));
        }
    }

    #[test]
    fn test_invalid_ingredient_tag_in_stage_one() {
        assert!(FIND_RECIPES_STAGE_PROMPT.contains("[ERROR: Invalid ingredients provided: X]"));
    }

    #[test]
    fn test_build_prompt_order() {
        let prompt = build_prompt("chicken and rice", Stage::SendList);
        let base = prompt.find("step by step").unwrap();
        let stage = prompt.find("Stage 3").unwrap();
        let query = prompt.find("chicken and rice").unwrap();
        let closing = prompt.find("Structure your response").unwrap();
        assert!(base < stage && stage < query && query < closing);
    }
}
