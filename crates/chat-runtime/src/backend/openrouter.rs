//! OpenRouter completion backend
//!
//! Wire format matches OpenAI's chat completions; adds the optional
//! attribution headers OpenRouter recognizes and a caller-selected model.

use super::{default_client, CompletionBackend, CompletionRequest, PromptRole};
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter chat-completions client
#[derive(Clone, Debug)]
pub struct OpenRouterBackend {
    api_key: String,
    base_url: String,
    model: String,
    site_url: Option<String>,
    site_name: Option<String>,
    client: Client,
}

impl OpenRouterBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            site_url: None,
            site_name: None,
            client: default_client(),
        }
    }

    pub fn with_site(mut self, url: Option<String>, name: Option<String>) -> Self {
        self.site_url = url;
        self.site_name = name;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(&self, request: CompletionRequest) -> ChatResult<String> {
        let body = WireRequest {
            model: self.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|msg| WireMessage {
                    role: match msg.role {
                        PromptRole::System => "system",
                        PromptRole::User => "user",
                        PromptRole::Assistant => "assistant",
                    }
                    .to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key));

        if let Some(site_url) = &self.site_url {
            builder = builder.header("HTTP-Referer", site_url);
        }
        if let Some(site_name) = &self.site_name {
            builder = builder.header("X-Title", site_name);
        }

        let response = builder.json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                ChatError::Authentication(error_text)
            } else {
                ChatError::Backend(format!("OpenRouter API error {}: {}", status, error_text))
            });
        }

        let envelope: WireResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        envelope
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatError::InvalidResponse("no choices in completion".to_string()))
    }
}

// OpenRouter wire types (OpenAI-shaped)

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PromptMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_sends_attribution_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("HTTP-Referer", "https://example.com"))
            .and(header("X-Title", "api-chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "meta-llama/llama-3.1-8b-instruct"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Routed"}}]
            })))
            .mount(&mock_server)
            .await;

        let backend = OpenRouterBackend::new("key", "meta-llama/llama-3.1-8b-instruct")
            .with_site(
                Some("https://example.com".to_string()),
                Some("api-chat".to_string()),
            )
            .with_base_url(mock_server.uri());

        let reply = backend
            .complete(CompletionRequest::new(vec![PromptMessage::user("Hi")]))
            .await
            .unwrap();
        assert_eq!(reply, "Routed");
    }
}
