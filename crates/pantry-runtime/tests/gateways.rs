//! Gateway behaviour against mocked provider APIs.

use pantry_core::{GatewayError, IngredientRef, Preferences, ShoppingListMessage};
use pantry_runtime::config::{EmailConfig, RecipeApiConfig, TelegramConfig};
use pantry_runtime::{
    ApiCredential, CompletionConfig, CredentialSource, DeliveryChannel, GeminiProvider,
    LlmProvider, RecipeSource, RetryPolicy, SendGridGateway, SpoonacularGateway, TelegramGateway,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credential(value: &str, name: &'static str) -> Option<ApiCredential> {
    Some(ApiCredential::new(value, CredentialSource::Programmatic, name))
}

fn spoonacular(server: &MockServer) -> SpoonacularGateway {
    let config = RecipeApiConfig {
        base_url: server.uri(),
        retry: RetryPolicy::none(),
        ..Default::default()
    };
    SpoonacularGateway::new(credential("spoon-key", "SPOONACULAR_API_KEY"), &config)
}

fn telegram(server: &MockServer) -> TelegramGateway {
    let config = TelegramConfig {
        base_url: server.uri(),
        retry: RetryPolicy::none(),
        ..Default::default()
    };
    TelegramGateway::new(credential("123:abc", "TELEGRAM_BOT_API_KEY"), &config)
}

fn sendgrid(server: &MockServer, key: Option<&str>, sender: Option<&str>) -> SendGridGateway {
    let config = EmailConfig {
        base_url: server.uri(),
        retry: RetryPolicy::none(),
        ..Default::default()
    };
    SendGridGateway::new(
        key.and_then(|k| credential(k, "SENDGRID_API_KEY")),
        sender.and_then(|s| credential(s, "SENDGRID_SENDER_EMAIL")),
        &config,
    )
}

fn message() -> ShoppingListMessage {
    ShoppingListMessage::compose(
        "Pesto",
        &[IngredientRef::authoritative(None, "basil", Some(1.0), Some("bunch"))],
    )
}

// ============================================================================
// Spoonacular
// ============================================================================

#[tokio::test]
async fn test_spoonacular_search_sends_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/findByIngredients"))
        .and(query_param("ingredients", "tofu, rice"))
        .and(query_param("number", "5"))
        .and(query_param("ranking", "1"))
        .and(query_param("diet", "vegan"))
        .and(query_param("cuisine", "Thai"))
        .and(query_param("apiKey", "spoon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Tofu Fried Rice", "image": "https://img/1.jpg",
             "usedIngredientCount": 2, "missedIngredientCount": 1, "likes": 10}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let prefs = Preferences {
        food_type: "vegan".to_string(),
        cuisine: "Thai".to_string(),
    };
    let recipes = spoonacular(&server)
        .find_by_ingredients("tofu, rice", &prefs)
        .await
        .unwrap();

    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].title, "Tofu Fried Rice");
    assert_eq!(recipes[0].used_ingredient_count, 2);
    assert_eq!(recipes[0].missed_ingredient_count, 1);
}

#[tokio::test]
async fn test_spoonacular_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/findByIngredients"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = spoonacular(&server)
        .find_by_ingredients("egg", &Preferences::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Authentication { .. }));
    assert_eq!(
        err.to_string(),
        "Error communicating with Spoonacular: Authentication failed (Invalid API Key?)"
    );
    assert!(!err.to_string().contains("spoon-key"));
}

#[tokio::test]
async fn test_spoonacular_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/findByIngredients"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let err = spoonacular(&server)
        .find_by_ingredients("egg", &Preferences::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::RateLimited { .. }));
}

#[tokio::test]
async fn test_spoonacular_server_error_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/findByIngredients"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let config = RecipeApiConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    let gateway = SpoonacularGateway::new(credential("spoon-key", "SPOONACULAR_API_KEY"), &config);

    let err = gateway
        .find_by_ingredients("egg", &Preferences::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::TransientNetwork { .. }));
}

#[tokio::test]
async fn test_spoonacular_details_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/999/information"))
        .and(query_param("includeNutrition", "false"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = spoonacular(&server).recipe_details(999).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error communicating with Spoonacular: Recipe ID 999 not found"
    );
}

#[tokio::test]
async fn test_spoonacular_details_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/42/information"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "title": "Garlic Chicken",
            "extendedIngredients": [
                {"id": 5062, "name": "chicken breast", "amount": 1.5, "unit": "lb"},
                {"id": 11215, "name": "garlic", "amount": 4, "unit": "cloves"}
            ]
        })))
        .mount(&server)
        .await;

    let details = spoonacular(&server).recipe_details(42).await.unwrap();
    assert_eq!(details.title.as_deref(), Some("Garlic Chicken"));
    let ingredients = details.ingredients.unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[1].amount, Some(4.0));
}

#[tokio::test]
async fn test_spoonacular_details_without_ingredients() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/7/information"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "title": "Mystery"})))
        .mount(&server)
        .await;

    let details = spoonacular(&server).recipe_details(7).await.unwrap();
    assert!(details.ingredients.is_err());
    assert_eq!(details.raw["title"], "Mystery");
}

#[tokio::test]
async fn test_spoonacular_details_empty_ingredient_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/77/information"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 77,
            "title": "Chicken Pasta",
            "extendedIngredients": []
        })))
        .mount(&server)
        .await;

    let details = spoonacular(&server).recipe_details(77).await.unwrap();
    assert_eq!(
        details.ingredients,
        Err("recipe has no extendedIngredients".to_string())
    );
    assert_eq!(details.title.as_deref(), Some("Chicken Pasta"));
}

// ============================================================================
// Telegram
// ============================================================================

#[tokio::test]
async fn test_telegram_delivers_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({"chat_id": "555", "parse_mode": "Markdown"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    telegram(&server).deliver("555", &message()).await.unwrap();
}

#[tokio::test]
async fn test_telegram_ok_false_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: message is too long"
        })))
        .mount(&server)
        .await;

    let err = telegram(&server).deliver("555", &message()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error sending Telegram message: Bad Request: message is too long"
    );
}

#[tokio::test]
async fn test_telegram_chat_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = telegram(&server).deliver("nope", &message()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error sending Telegram message: Chat ID 'nope' not found or invalid."
    );
}

#[tokio::test]
async fn test_telegram_missing_token_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = TelegramConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    let err = TelegramGateway::new(None, &config)
        .deliver("555", &message())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Telegram Bot API key not configured in backend environment."
    );
}

// ============================================================================
// SendGrid
// ============================================================================

#[tokio::test]
async fn test_sendgrid_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer sg-key"))
        .and(body_partial_json(json!({
            "from": {"email": "bot@example.com", "name": "Recipe Suggester Extension"},
            "subject": "Shopping List for Pesto",
            "personalizations": [{"to": [{"email": "cook@example.com"}]}]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    sendgrid(&server, Some("sg-key"), Some("bot@example.com"))
        .deliver("cook@example.com", &message())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sendgrid_200_is_not_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = sendgrid(&server, Some("sg-key"), Some("bot@example.com"))
        .deliver("cook@example.com", &message())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error sending email via SendGrid: SendGrid returned status 200"
    );
}

#[tokio::test]
async fn test_sendgrid_invalid_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "Does not contain a valid email address.", "field": "personalizations.0.to.0.email"}]
        })))
        .mount(&server)
        .await;

    let err = sendgrid(&server, Some("sg-key"), Some("bot@example.com"))
        .deliver("not-an-email", &message())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error sending email via SendGrid: Invalid recipient email format 'not-an-email'."
    );
}

#[tokio::test]
async fn test_sendgrid_missing_configuration_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let err = sendgrid(&server, None, Some("bot@example.com"))
        .deliver("cook@example.com", &message())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "SendGrid API key not configured in backend environment."
    );

    let err = sendgrid(&server, Some("sg-key"), None)
        .deliver("cook@example.com", &message())
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::MissingSender);
}

// ============================================================================
// Gemini
// ============================================================================

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash-latest:generateContent"))
        .and(query_param("key", "gem-key"))
        .and(body_partial_json(json!({
            "generationConfig": {"maxOutputTokens": 2048}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "[REASONING TYPE: LOGICAL] Fine."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 8}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(credential("gem-key", "GEMINI_API_KEY"), server.uri());
    let response = provider
        .complete("prompt", &CompletionConfig::default())
        .await
        .unwrap();

    assert_eq!(response.content, "[REASONING TYPE: LOGICAL] Fine.");
    assert_eq!(response.usage.total(), 128);
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
}

#[tokio::test]
async fn test_gemini_blocked_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash-latest:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY", "safetyRatings": []}
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(credential("gem-key", "GEMINI_API_KEY"), server.uri());
    let err = provider
        .complete("prompt", &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::ProviderValidation { .. }));
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("Gemini request blocked due to: SAFETY"));
}

#[tokio::test]
async fn test_gemini_error_body_does_not_leak_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash-latest:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid."}
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(credential("gem-key", "GEMINI_API_KEY"), server.uri());
    let err = provider
        .complete("prompt", &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("LLM analysis failed:"));
    assert!(err.to_string().contains("API key not valid."));
    assert!(!err.to_string().contains("gem-key"));
}
