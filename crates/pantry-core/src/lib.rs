//! # pantry-core
//!
//! Deterministic building blocks for the Pantry recipe orchestrator.
//!
//! This crate answers, without touching the network:
//! - Which of a recipe's ingredients does the user still need?
//! - What should we guess when the recipe provider cannot tell us?
//! - What did the reasoning model flag in its reply?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No network calls**: Gateways and the language model live in `pantry-runtime`
//! 3. **Failures are values**: Every gateway failure is a [`GatewayError`] variant
//!
//! ## Example
//!
//! ```rust
//! use pantry_core::{find_missing, IngredientRef};
//!
//! let required = vec![
//!     IngredientRef::authoritative(Some(1), "Red Onions", Some(2.0), Some("pcs")),
//!     IngredientRef::authoritative(Some(2), "Garlic", Some(3.0), Some("cloves")),
//! ];
//! let missing = find_missing(&required, &["onion"]);
//!
//! assert_eq!(missing.len(), 1);
//! assert_eq!(missing[0].name, "Garlic");
//! ```

pub mod error;
pub mod fallback;
pub mod matcher;
pub mod reasoning;
pub mod requests;
pub mod shopping_list;
pub mod types;

// Re-export main types at crate root
pub use error::{GatewayError, GatewayResult, Service};
pub use fallback::generate_fallback;
pub use matcher::{find_missing, normalize};
pub use reasoning::{extract_metadata, ReasoningMetadata, ReasoningResult};
pub use requests::{
    FindRecipesRequest, FindRecipesResponse, MissingIngredientsRequest,
    MissingIngredientsResponse, RequestError, SendListRequest, SendListResponse,
};
pub use shopping_list::ShoppingListMessage;
pub use types::{DeliveryMethod, IngredientRef, Preferences, RecipeDetails, RecipeSummary, Stage};
