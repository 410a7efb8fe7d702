//! Chat configuration surface
//!
//! One configuration object supplied by the host, validated before any chat
//! turn is permitted. Selects the completion provider, carries per-provider
//! credentials, and optionally overrides the target API base URL and
//! authentication.

use crate::backend::{CompletionBackend, GeminiBackend, OpenAiBackend, OpenRouterBackend};
use crate::error::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use spec_compiler::AuthConfig;

/// The supported completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    OpenRouter,
}

impl ProviderKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::OpenRouter => "OpenRouter",
        }
    }
}

/// Host-supplied chat configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    pub provider: Option<ProviderKind>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: Option<String>,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    /// Overrides the server's declared base URL when set
    pub api_base_url: Option<String>,
    /// Caller-supplied authentication for outbound API calls
    pub auth_config: Option<AuthConfig>,
}

impl ChatConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider: Some(provider),
            ..Default::default()
        }
    }

    /// Check that the selected provider has the credentials it needs.
    pub fn validate(&self) -> ChatResult<()> {
        let provider = self
            .provider
            .ok_or_else(|| ChatError::Config("no AI provider selected".to_string()))?;

        match provider {
            ProviderKind::OpenAi => {
                if self.openai_api_key.as_deref().unwrap_or("").is_empty() {
                    return Err(ChatError::MissingCredential("OpenAI API Key".to_string()));
                }
            }
            ProviderKind::Gemini => {
                if self.gemini_api_key.as_deref().unwrap_or("").is_empty() {
                    return Err(ChatError::MissingCredential("Gemini API Key".to_string()));
                }
            }
            ProviderKind::OpenRouter => {
                if self.openrouter_api_key.as_deref().unwrap_or("").is_empty() {
                    return Err(ChatError::MissingCredential(
                        "OpenRouter API Key".to_string(),
                    ));
                }
                if self.openrouter_model.as_deref().unwrap_or("").is_empty() {
                    return Err(ChatError::MissingCredential("OpenRouter model".to_string()));
                }
            }
        }

        Ok(())
    }

    /// Construct the configured completion backend. Validates first; an
    /// unconfigured provider never yields a half-built client.
    pub fn create_backend(&self) -> ChatResult<Box<dyn CompletionBackend>> {
        self.validate()?;
        let provider = self
            .provider
            .ok_or_else(|| ChatError::Config("no AI provider selected".to_string()))?;

        // validate() guarantees the credentials below are present
        Ok(match provider {
            ProviderKind::OpenAi => Box::new(OpenAiBackend::new(
                self.openai_api_key.clone().unwrap_or_default(),
            )),
            ProviderKind::Gemini => Box::new(GeminiBackend::new(
                self.gemini_api_key.clone().unwrap_or_default(),
            )),
            ProviderKind::OpenRouter => Box::new(
                OpenRouterBackend::new(
                    self.openrouter_api_key.clone().unwrap_or_default(),
                    self.openrouter_model.clone().unwrap_or_default(),
                )
                .with_site(self.site_url.clone(), self.site_name.clone()),
            ),
        })
    }
}
