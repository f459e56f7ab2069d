//! SendGrid transactional email delivery.
//!
//! SendGrid accepts a message with `202 Accepted`. Every other status is a
//! failure, including other 2xx codes.

use super::{transport_error, DeliveryChannel};
use crate::config::EmailConfig;
use crate::resilience::RetryPolicy;
use crate::secrets::ApiCredential;
use async_trait::async_trait;
use pantry_core::{DeliveryMethod, GatewayError, GatewayResult, Service, ShoppingListMessage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: Service = Service::EmailDelivery;

/// SendGrid v3 mail client.
pub struct SendGridGateway {
    credential: Option<ApiCredential>,
    sender: Option<ApiCredential>,
    sender_name: String,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl std::fmt::Debug for SendGridGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridGateway")
            .field("credential", &self.credential)
            .field("sender", &self.sender)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Sender<'a>,
    subject: &'a str,
    content: Vec<MailContent<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Recipient<'a>>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Sender<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct MailContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorReply {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: String,
}

impl SendGridGateway {
    pub fn new(
        credential: Option<ApiCredential>,
        sender: Option<ApiCredential>,
        config: &EmailConfig,
    ) -> Self {
        Self {
            credential,
            sender,
            sender_name: config.sender_name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            retry: config.retry,
            client: reqwest::Client::new(),
        }
    }

    async fn send_once(
        &self,
        key: &str,
        recipient: &str,
        request: &MailRequest<'_>,
    ) -> GatewayResult<()> {
        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = response.status().as_u16();
        if status == 202 {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let messages: Vec<String> = serde_json::from_str::<ErrorReply>(&body)
            .unwrap_or_default()
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect();

        Err(classify_failure(status, &messages, recipient, request.from.email))
    }
}

/// Map a non-202 reply to the taxonomy.
///
/// Message text is checked before the status class so recipient and sender
/// problems get a specific explanation.
fn classify_failure(status: u16, messages: &[String], recipient: &str, sender: &str) -> GatewayError {
    let lowered: Vec<String> = messages.iter().map(|m| m.to_lowercase()).collect();

    if lowered.iter().any(|m| m.contains("valid email address")) {
        return GatewayError::ProviderValidation {
            service: SERVICE,
            detail: format!("Invalid recipient email format '{}'.", recipient),
        };
    }

    if lowered.iter().any(|m| {
        m.contains("permission") || m.contains("authenticate") || m.contains("verified sender")
    }) {
        return GatewayError::ProviderValidation {
            service: SERVICE,
            detail: format!(
                "Sender email '{}' might not be verified or have sending permissions in SendGrid.",
                sender
            ),
        };
    }

    match status {
        401 | 403 | 429 | 500..=599 => {
            GatewayError::from_status(SERVICE, status, None, messages.join("; "))
        }
        _ if !messages.is_empty() => GatewayError::Generic {
            service: SERVICE,
            detail: format!("SendGrid Error(s): {}", messages.join("; ")),
        },
        _ => GatewayError::Generic {
            service: SERVICE,
            detail: format!("SendGrid returned status {}", status),
        },
    }
}

#[async_trait]
impl DeliveryChannel for SendGridGateway {
    async fn deliver(&self, recipient: &str, message: &ShoppingListMessage) -> GatewayResult<()> {
        let key = self
            .credential
            .as_ref()
            .ok_or(GatewayError::MissingCredential { service: SERVICE })?
            .expose();
        let sender = self
            .sender
            .as_ref()
            .ok_or(GatewayError::MissingSender)?
            .expose();

        let request = MailRequest {
            personalizations: vec![Personalization {
                to: vec![Recipient { email: recipient }],
            }],
            from: Sender {
                email: sender,
                name: &self.sender_name,
            },
            subject: &message.subject,
            content: vec![MailContent {
                content_type: "text/plain",
                value: &message.body,
            }],
        };

        tracing::info!(recipient, "Sending SendGrid email");
        self.retry
            .execute(
                || self.send_once(key, recipient, &request),
                GatewayError::is_retryable,
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "SendGrid delivery failed"))
    }

    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Email
    }
}
