//! Error taxonomy shared by every external gateway.
//!
//! Gateways never raise past their own boundary: each operation returns a
//! [`GatewayResult`]. The `Display` form of a [`GatewayError`] is the
//! user-visible message, already prefixed with the service context.

use std::fmt;
use thiserror::Error;

/// External service a gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Spoonacular recipe search and detail lookup
    RecipeLookup,
    /// Gemini generative-language reasoning
    Reasoning,
    /// Telegram bot messaging
    ChatDelivery,
    /// SendGrid transactional email
    EmailDelivery,
}

impl Service {
    /// Provider name used in credential messages.
    pub fn provider(&self) -> &'static str {
        match self {
            Service::RecipeLookup => "Spoonacular",
            Service::Reasoning => "Gemini",
            Service::ChatDelivery => "Telegram Bot",
            Service::EmailDelivery => "SendGrid",
        }
    }

    /// Prefix for every failure message from this service.
    pub fn failure_context(&self) -> &'static str {
        match self {
            Service::RecipeLookup => "Error communicating with Spoonacular",
            Service::Reasoning => "LLM analysis failed",
            Service::ChatDelivery => "Error sending Telegram message",
            Service::EmailDelivery => "Error sending email via SendGrid",
        }
    }

    fn auth_hint(&self) -> &'static str {
        match self {
            Service::ChatDelivery => "Invalid Bot Token?",
            Service::EmailDelivery => "Invalid API Key or Permissions?",
            Service::RecipeLookup | Service::Reasoning => "Invalid API Key?",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider())
    }
}

/// Uniform failure taxonomy for outbound calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("{} API key not configured in backend environment.", .service.provider())]
    MissingCredential { service: Service },

    #[error("SendGrid sender email not configured in backend environment.")]
    MissingSender,

    #[error("{}: Request failed: {detail}", .service.failure_context())]
    TransientNetwork { service: Service, detail: String },

    #[error("{}: Authentication failed ({})", .service.failure_context(), .service.auth_hint())]
    Authentication { service: Service },

    #[error("{}: API rate limit exceeded", .service.failure_context())]
    RateLimited { service: Service },

    #[error("{}: {resource} not found", .service.failure_context())]
    NotFound { service: Service, resource: String },

    #[error("{}: {detail}", .service.failure_context())]
    ProviderValidation { service: Service, detail: String },

    #[error("{}: Invalid response structure: {detail}", .service.failure_context())]
    ResponseParse { service: Service, detail: String },

    #[error("{}: {detail}", .service.failure_context())]
    Generic { service: Service, detail: String },
}

/// Outcome of a gateway operation: data or a classified error.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Map an HTTP status to the taxonomy.
    ///
    /// `not_found` names the resource for a 404; when `None`, a 404 is generic.
    pub fn from_status(
        service: Service,
        status: u16,
        not_found: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        match status {
            401 | 403 => GatewayError::Authentication { service },
            404 if not_found.is_some() => GatewayError::NotFound {
                service,
                resource: not_found.unwrap_or_default(),
            },
            429 => GatewayError::RateLimited { service },
            500..=599 => GatewayError::TransientNetwork {
                service,
                detail: format!("Status {}: {}", status, detail.into()),
            },
            _ => GatewayError::Generic {
                service,
                detail: format!("Status {}: {}", status, detail.into()),
            },
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::TransientNetwork { .. } | GatewayError::RateLimited { .. }
        )
    }

    /// Whether the call never left the process for lack of configuration.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingCredential { .. } | GatewayError::MissingSender
        )
    }

    /// The service that produced this error.
    pub fn service(&self) -> Service {
        match self {
            GatewayError::MissingSender => Service::EmailDelivery,
            GatewayError::MissingCredential { service }
            | GatewayError::TransientNetwork { service, .. }
            | GatewayError::Authentication { service }
            | GatewayError::RateLimited { service }
            | GatewayError::NotFound { service, .. }
            | GatewayError::ProviderValidation { service, .. }
            | GatewayError::ResponseParse { service, .. }
            | GatewayError::Generic { service, .. } => *service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = GatewayError::MissingCredential {
            service: Service::ChatDelivery,
        };
        assert_eq!(
            err.to_string(),
            "Telegram Bot API key not configured in backend environment."
        );
        assert!(err.is_precondition());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_classification() {
        let s = Service::RecipeLookup;
        assert!(matches!(
            GatewayError::from_status(s, 401, None, ""),
            GatewayError::Authentication { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(s, 403, None, ""),
            GatewayError::Authentication { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(s, 429, None, ""),
            GatewayError::RateLimited { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(s, 503, None, "down"),
            GatewayError::TransientNetwork { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(s, 404, None, "gone"),
            GatewayError::Generic { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(s, 404, Some("Recipe ID 9".into()), ""),
            GatewayError::NotFound { .. }
        ));
    }

    #[test]
    fn test_messages_are_prefixed_per_service() {
        let err = GatewayError::from_status(Service::RecipeLookup, 401, None, "");
        assert_eq!(
            err.to_string(),
            "Error communicating with Spoonacular: Authentication failed (Invalid API Key?)"
        );

        let err = GatewayError::NotFound {
            service: Service::RecipeLookup,
            resource: "Recipe ID 42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error communicating with Spoonacular: Recipe ID 42 not found"
        );

        let err = GatewayError::RateLimited {
            service: Service::EmailDelivery,
        };
        assert!(err.to_string().starts_with("Error sending email via SendGrid"));
    }

    #[test]
    fn test_only_transient_and_rate_limit_retry() {
        let s = Service::Reasoning;
        assert!(GatewayError::from_status(s, 500, None, "").is_retryable());
        assert!(GatewayError::RateLimited { service: s }.is_retryable());
        assert!(!GatewayError::Authentication { service: s }.is_retryable());
        assert!(!GatewayError::ProviderValidation {
            service: s,
            detail: "blocked".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_missing_sender_belongs_to_email() {
        assert_eq!(GatewayError::MissingSender.service(), Service::EmailDelivery);
    }
}
