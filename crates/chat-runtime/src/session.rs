//! Chat session orchestration
//!
//! One session per generated server: resolve intent, maybe call the live
//! API, then ask the backend for a conversational reply grounded in the
//! call's outcome. Backend failures become an apologetic reply; the session
//! stays usable for the next turn.

use crate::backend::{CompletionBackend, CompletionRequest, PromptMessage, PromptRole};
use crate::config::ChatConfig;
use crate::error::ChatResult;
use crate::executor::{ApiExecutor, ExecutionResult};
use crate::intent::IntentResolver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spec_compiler::Server;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// How much history is replayed to the backend each turn
const HISTORY_WINDOW: usize = 10;

/// One message in the conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl ChatMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Everything one chat turn produced
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The assistant's conversational reply
    pub reply: String,
    /// The API call outcome, when one was made
    pub api_result: Option<ExecutionResult>,
    /// Name of the endpoint that was called, when one was
    pub executed_call: Option<String>,
}

/// A conversation bound to one generated server
pub struct ChatSession {
    server: Arc<Server>,
    executor: ApiExecutor,
    backend: Box<dyn CompletionBackend>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// Open a session. The config's base-URL and auth overrides are applied
    /// here; the server itself is never mutated.
    pub fn new(server: Arc<Server>, config: &ChatConfig) -> ChatResult<Self> {
        let backend = config.create_backend()?;

        let executor = match &config.api_base_url {
            Some(base_url) => {
                let mut overridden = (*server).clone();
                overridden.set_base_url(base_url.clone());
                ApiExecutor::new(&overridden, config.auth_config.clone())
            }
            None => ApiExecutor::new(&server, config.auth_config.clone()),
        };

        Ok(Self {
            server,
            executor,
            backend,
            history: Vec::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_backend(
        server: Arc<Server>,
        config: &ChatConfig,
        backend: Box<dyn CompletionBackend>,
    ) -> Self {
        let executor = match &config.api_base_url {
            Some(base_url) => {
                let mut overridden = (*server).clone();
                overridden.set_base_url(base_url.clone());
                ApiExecutor::new(&overridden, config.auth_config.clone())
            }
            None => ApiExecutor::new(&server, config.auth_config.clone()),
        };
        Self {
            server,
            executor,
            backend,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Run one chat turn: resolve intent, execute when warranted, then
    /// produce the conversational reply.
    pub async fn chat(&mut self, user_message: &str) -> ChatTurn {
        let resolution =
            IntentResolver::resolve(self.backend.as_ref(), &self.executor, user_message).await;

        let mut api_result = None;
        let mut executed_call = None;
        if resolution.should_execute {
            if let Some(endpoint) = &resolution.endpoint {
                info!(endpoint = %endpoint.name, "executing resolved API call");
                let args: HashMap<String, Value> = resolution.parameters.clone().into_iter().collect();
                let result = self.executor.execute(endpoint, &args).await;
                executed_call = Some(endpoint.name.clone());
                api_result = Some(result);
            }
        }

        let reply = match self.generate_reply(user_message, api_result.as_ref()).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "reply generation failed");
                format!(
                    "I ran into a problem talking to the AI service: {}. Please try again.",
                    err
                )
            }
        };

        self.history
            .push(ChatMessage::new(MessageRole::User, user_message));
        self.history
            .push(ChatMessage::new(MessageRole::Assistant, reply.clone()));

        ChatTurn {
            reply,
            api_result,
            executed_call,
        }
    }

    async fn generate_reply(
        &self,
        user_message: &str,
        api_result: Option<&ExecutionResult>,
    ) -> ChatResult<String> {
        let mut messages = vec![PromptMessage::system(self.system_prompt(api_result))];

        for msg in self.history.iter().rev().take(HISTORY_WINDOW).rev() {
            messages.push(PromptMessage {
                role: match msg.role {
                    MessageRole::User => PromptRole::User,
                    MessageRole::Assistant => PromptRole::Assistant,
                },
                content: msg.content.clone(),
            });
        }
        messages.push(PromptMessage::user(user_message.to_string()));

        self.backend.complete(CompletionRequest::new(messages)).await
    }

    /// System prompt: who the assistant is, the endpoint catalog, and the
    /// latest API outcome when there is one.
    fn system_prompt(&self, api_result: Option<&ExecutionResult>) -> String {
        let mut catalog = String::new();
        for ep in &self.server.endpoints {
            catalog.push_str(&format!(
                "- {} [{} {}]: {}\n",
                ep.name,
                ep.method.as_str(),
                ep.path,
                ep.description
            ));
        }

        let mut prompt = format!(
            "You are a helpful assistant for the \"{}\" API ({}).\n\
             You can call these endpoints on the user's behalf:\n{}\n\
             Answer conversationally. When an API result is provided below, base \
             your answer on it and summarize the data for the user. Never invent \
             data the API did not return.",
            self.server.name, self.server.description, catalog
        );

        if let Some(result) = api_result {
            prompt.push_str("\n\n--- API call result ---\n");
            prompt.push_str(&format!(
                "Endpoint: {} ({})\nSuccess: {}\n",
                result.endpoint, result.method, result.success
            ));
            if let Some(code) = result.status_code {
                prompt.push_str(&format!("Status: {}\n", code));
            }
            if let Some(data) = &result.data {
                prompt.push_str(&format!("Data: {}\n", data));
            }
            if let Some(error) = &result.error {
                prompt.push_str(&format!("Error: {}\n", error));
            }
        }

        prompt
    }
}
