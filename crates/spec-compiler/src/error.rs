//! Error types for spec compilation

use thiserror::Error;

/// Result type alias for compiler operations
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Compiler error types
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    #[error("Specification contains no operations")]
    EmptySpecification,

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}
