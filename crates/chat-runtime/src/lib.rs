//! Conversational runtime over a compiled API server
//!
//! Binds a normalized endpoint catalog to a completion backend: user
//! messages are resolved to API calls, executed against the live API, and
//! answered conversationally with the call's outcome in context.

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod intent;
pub mod json;
pub mod session;

pub use backend::{
    CompletionBackend, CompletionRequest, GeminiBackend, OpenAiBackend, OpenRouterBackend,
    PromptMessage, PromptRole,
};
pub use config::{ChatConfig, ProviderKind};
pub use error::{ChatError, ChatResult};
pub use executor::{ApiExecutor, ExecutionResult};
pub use intent::{IntentResolution, IntentResolver};
pub use session::{ChatMessage, ChatSession, ChatTurn, MessageRole};
