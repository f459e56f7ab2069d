//! Telegram Bot API delivery.
//!
//! Telegram reports the outcome in the body: a message counts as sent only
//! when `ok` is true, whatever the HTTP status.

use super::{transport_error, DeliveryChannel};
use crate::config::TelegramConfig;
use crate::resilience::RetryPolicy;
use crate::secrets::ApiCredential;
use async_trait::async_trait;
use pantry_core::{DeliveryMethod, GatewayError, GatewayResult, Service, ShoppingListMessage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: Service = Service::ChatDelivery;

/// Telegram bot client.
pub struct TelegramGateway {
    credential: Option<ApiCredential>,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramGateway")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct TelegramReply {
    #[serde(default)]
    ok: bool,
    error_code: Option<u16>,
    description: Option<String>,
}

impl TelegramGateway {
    pub fn new(credential: Option<ApiCredential>, config: &TelegramConfig) -> Self {
        Self {
            credential,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            retry: config.retry,
            client: reqwest::Client::new(),
        }
    }

    async fn send_once(&self, token: &str, chat_id: &str, text: &str) -> GatewayResult<()> {
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        // SECURITY: the token is part of the path; transport_error drops the URL
        let response = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.base_url, token))
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport_error(SERVICE, e))?;

        match serde_json::from_str::<TelegramReply>(&body) {
            Ok(reply) if reply.ok => Ok(()),
            Ok(reply) => Err(classify_failure(chat_id, status, reply)),
            Err(_) if !(200..300).contains(&status) => {
                Err(GatewayError::from_status(SERVICE, status, None, body))
            }
            Err(e) => Err(GatewayError::ResponseParse {
                service: SERVICE,
                detail: e.to_string(),
            }),
        }
    }
}

/// Map a Telegram `ok: false` reply to the taxonomy.
fn classify_failure(chat_id: &str, status: u16, reply: TelegramReply) -> GatewayError {
    let code = reply.error_code.unwrap_or(status);
    let description = reply
        .description
        .unwrap_or_else(|| "Unknown Telegram error".to_string());
    let lowered = description.to_lowercase();

    match code {
        400 if lowered.contains("chat not found") => GatewayError::ProviderValidation {
            service: SERVICE,
            detail: format!("Chat ID '{}' not found or invalid.", chat_id),
        },
        403 if lowered.contains("bot was blocked") => GatewayError::ProviderValidation {
            service: SERVICE,
            detail: "Bot was blocked by the user.".to_string(),
        },
        401 | 403 => GatewayError::Authentication { service: SERVICE },
        429 => GatewayError::RateLimited { service: SERVICE },
        500..=599 => GatewayError::TransientNetwork {
            service: SERVICE,
            detail: description,
        },
        _ => GatewayError::Generic {
            service: SERVICE,
            detail: description,
        },
    }
}

#[async_trait]
impl DeliveryChannel for TelegramGateway {
    async fn deliver(&self, recipient: &str, message: &ShoppingListMessage) -> GatewayResult<()> {
        let token = self
            .credential
            .as_ref()
            .ok_or(GatewayError::MissingCredential { service: SERVICE })?
            .expose();

        tracing::info!(chat_id = recipient, "Sending Telegram message");
        self.retry
            .execute(
                || self.send_once(token, recipient, &message.body),
                GatewayError::is_retryable,
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Telegram delivery failed"))
    }

    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Telegram
    }
}
