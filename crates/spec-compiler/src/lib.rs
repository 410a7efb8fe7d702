//! # spec-compiler
//!
//! OpenAPI/Swagger compiler for api-chat.
//! Normalizes a specification document into an ordered catalog of callable
//! endpoints plus server metadata.

mod error;
mod normalizer;
mod params;
mod sanitize;
mod types;

pub use error::{CompileError, CompileResult};
pub use normalizer::{SpecNormalizer, BASE_URL_PLACEHOLDER};
pub use params::ParameterExtractor;
pub use sanitize::sanitize;
pub use types::*;
