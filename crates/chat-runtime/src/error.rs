//! Error types for the chat runtime
//!
//! Execution failures against the target API are deliberately absent here:
//! they are data (`ExecutionResult.error`), never `Err`.

use thiserror::Error;

/// Result type alias for chat runtime operations
pub type ChatResult<T> = std::result::Result<T, ChatError>;

/// Chat runtime error types
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Completion backend error: {0}")]
    Backend(String),

    #[error("Invalid response from completion backend: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(err.to_string())
    }
}

impl ChatError {
    /// Whether this error stems from credentials rather than transport
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ChatError::Authentication(_) | ChatError::MissingCredential(_)
        )
    }
}
