//! External service gateways.
//!
//! Each gateway wraps one provider behind a [`GatewayResult`]:
//! - Missing credentials fail before any network call
//! - Calls run through a [`RetryPolicy`](crate::resilience::RetryPolicy)
//! - Provider failures are classified into [`GatewayError`]
//!
//! The orchestrator sees only the [`RecipeSource`] and [`DeliveryChannel`]
//! traits, so pipelines can be tested without a network.

use async_trait::async_trait;
use pantry_core::{
    DeliveryMethod, GatewayError, GatewayResult, Preferences, RecipeDetails, RecipeSummary,
    Service, ShoppingListMessage,
};

mod sendgrid;
mod spoonacular;
mod telegram;

pub use sendgrid::SendGridGateway;
pub use spoonacular::SpoonacularGateway;
pub use telegram::TelegramGateway;

/// Recipe discovery and detail lookup.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Recipes that use the given comma-separated ingredients.
    async fn find_by_ingredients(
        &self,
        ingredients: &str,
        preferences: &Preferences,
    ) -> GatewayResult<Vec<RecipeSummary>>;

    /// Full information for one recipe.
    async fn recipe_details(&self, recipe_id: i64) -> GatewayResult<RecipeDetails>;
}

/// A way of delivering a shopping list to a person.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Send `message` to `recipient` (chat ID or email address).
    async fn deliver(&self, recipient: &str, message: &ShoppingListMessage) -> GatewayResult<()>;

    fn method(&self) -> DeliveryMethod;
}

/// Classify a transport-level failure. The URL is dropped since it may carry a key.
pub(crate) fn transport_error(service: Service, err: reqwest::Error) -> GatewayError {
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.without_url().to_string()
    };
    GatewayError::TransientNetwork { service, detail }
}

/// Body of a failed response, for error details. Unreadable bodies become empty.
pub(crate) async fn read_error_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}
