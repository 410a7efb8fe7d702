//! Google Gemini completion backend
//!
//! Gemini has no chat-role envelope compatible with the other providers;
//! the request is flattened into a single text context with role prefixes.

use super::{default_client, CompletionBackend, CompletionRequest, PromptRole};
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini generateContent client
#[derive(Clone, Debug)]
pub struct GeminiBackend {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: default_client(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Flatten role-tagged messages into one prompt text. System content
    /// leads, then the conversation with User/Assistant prefixes, ending
    /// with an open assistant turn.
    fn build_context(request: &CompletionRequest) -> String {
        let mut context = String::new();

        for msg in &request.messages {
            if msg.role == PromptRole::System {
                context.push_str(&msg.content);
                context.push_str("\n\n");
            }
        }

        for msg in &request.messages {
            match msg.role {
                PromptRole::System => {}
                PromptRole::User => {
                    context.push_str("User: ");
                    context.push_str(&msg.content);
                    context.push('\n');
                }
                PromptRole::Assistant => {
                    context.push_str("Assistant: ");
                    context.push_str(&msg.content);
                    context.push('\n');
                }
            }
        }

        context.push_str("Assistant: ");
        context
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, request: CompletionRequest) -> ChatResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = WireRequest {
            contents: vec![WireContent {
                parts: vec![WirePart {
                    text: Self::build_context(&request),
                }],
            }],
            generation_config: WireGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        // Gemini authenticates via a query parameter, not a header
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                ChatError::Authentication(error_text)
            } else {
                ChatError::Backend(format!("Gemini API error {}: {}", status, error_text))
            });
        }

        let envelope: WireResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| ChatError::InvalidResponse("no candidates in completion".to_string()))
    }
}

// Gemini wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: WireContent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PromptMessage;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_context_roles() {
        let request = CompletionRequest::new(vec![
            PromptMessage::system("You are helpful"),
            PromptMessage::user("Hello"),
            PromptMessage::assistant("Hi"),
            PromptMessage::user("How are you?"),
        ]);

        let context = GeminiBackend::build_context(&request);
        assert!(context.starts_with("You are helpful\n\n"));
        assert!(context.contains("User: Hello\n"));
        assert!(context.contains("Assistant: Hi\n"));
        assert!(context.ends_with("Assistant: "));
    }

    #[tokio::test]
    async fn test_complete_extracts_first_candidate() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Gemini says hi"}], "role": "model"}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let backend = GeminiBackend::new("test-key").with_base_url(mock_server.uri());
        let reply = backend
            .complete(CompletionRequest::new(vec![PromptMessage::user("Hi")]))
            .await
            .unwrap();
        assert_eq!(reply, "Gemini says hi");
    }
}
