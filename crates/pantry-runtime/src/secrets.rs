//! Secure credential handling for external services.
//!
//! Every provider credential is wrapped in [`ApiCredential`], which:
//!
//! - Cannot appear in `Debug`/`Display` output
//! - Is zeroed on drop via `secrecy`
//! - Must be explicitly exposed at the point of use
//!
//! Credentials are loaded once at startup into [`Credentials`] and moved into
//! the gateways that need them. A missing credential is not an error here:
//! the gateway reports it when an operation is attempted.
//!
//! ## Usage
//!
//! ```ignore
//! let creds = Credentials::load(&config.credentials);
//! let spoonacular = SpoonacularGateway::new(creds.spoonacular, &config.recipes);
//!
//! // Only at the HTTP call site
//! request.query(&[("apiKey", cred.expose())]);
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

/// Errors from credential loading.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("{0}")]
    NotConfigured(String),
}

/// Where a credential was loaded from.
///
/// Useful for diagnosing configuration without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from the configuration file
    Config,
    /// Loaded from an environment variable (or `.env`)
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a value. It cannot be logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load from JSON config, falling back to an environment variable.
    ///
    /// Blank values count as absent in both places.
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, CredentialError> {
        if let Some(value) = config[config_key].as_str().filter(|v| !v.trim().is_empty()) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        if let Ok(value) = std::env::var(env_var) {
            if !value.trim().is_empty() {
                return Ok(Self::new(value, CredentialSource::Environment, name));
            }
        }

        Err(CredentialError::NotConfigured(format!(
            "{} required: set '{}' in config or {} environment variable",
            name, config_key, env_var
        )))
    }

    /// Expose the value for an API call.
    ///
    /// Call this only where the credential is sent. Never store the result.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

struct CredentialSpec {
    config_key: &'static str,
    env_var: &'static str,
    name: &'static str,
}

const SPOONACULAR: CredentialSpec = CredentialSpec {
    config_key: "spoonacular_api_key",
    env_var: "SPOONACULAR_API_KEY",
    name: "Spoonacular API key",
};

const GEMINI: CredentialSpec = CredentialSpec {
    config_key: "gemini_api_key",
    env_var: "GEMINI_API_KEY",
    name: "Gemini API key",
};

const TELEGRAM: CredentialSpec = CredentialSpec {
    config_key: "telegram_bot_api_key",
    env_var: "TELEGRAM_BOT_API_KEY",
    name: "Telegram Bot API key",
};

const SENDGRID: CredentialSpec = CredentialSpec {
    config_key: "sendgrid_api_key",
    env_var: "SENDGRID_API_KEY",
    name: "SendGrid API key",
};

const SENDGRID_SENDER: CredentialSpec = CredentialSpec {
    config_key: "sendgrid_sender_email",
    env_var: "SENDGRID_SENDER_EMAIL",
    name: "SendGrid sender email",
};

impl CredentialSpec {
    fn load(&self, config: &JsonValue) -> Option<ApiCredential> {
        match ApiCredential::from_config_or_env(config, self.config_key, self.env_var, self.name) {
            Ok(cred) => Some(cred),
            Err(e) => {
                tracing::warn!(credential = self.name, "{}", e);
                None
            }
        }
    }
}

/// Every credential the orchestrator can use, each optional.
#[derive(Debug, Default)]
pub struct Credentials {
    pub spoonacular: Option<ApiCredential>,
    pub gemini: Option<ApiCredential>,
    pub telegram_bot: Option<ApiCredential>,
    pub sendgrid: Option<ApiCredential>,
    /// Verified sender address; not secret, but handled the same way
    pub sendgrid_sender: Option<ApiCredential>,
}

impl Credentials {
    /// Load from the config `credentials` section with environment fallback.
    ///
    /// Absent credentials are logged at `warn` and left as `None`.
    pub fn load(config: &JsonValue) -> Self {
        let creds = Self {
            spoonacular: SPOONACULAR.load(config),
            gemini: GEMINI.load(config),
            telegram_bot: TELEGRAM.load(config),
            sendgrid: SENDGRID.load(config),
            sendgrid_sender: SENDGRID_SENDER.load(config),
        };

        tracing::info!(
            configured = creds.summary().iter().filter(|(_, s)| s.is_some()).count(),
            "Credentials loaded"
        );
        creds
    }

    /// Name and source of each credential, `None` when absent. Values are never included.
    pub fn summary(&self) -> Vec<(&'static str, Option<CredentialSource>)> {
        [
            (SPOONACULAR.env_var, &self.spoonacular),
            (GEMINI.env_var, &self.gemini),
            (TELEGRAM.env_var, &self.telegram_bot),
            (SENDGRID.env_var, &self.sendgrid),
            (SENDGRID_SENDER.env_var, &self.sendgrid_sender),
        ]
        .into_iter()
        .map(|(var, cred)| (var, cred.as_ref().map(ApiCredential::source)))
        .collect()
    }
}
