//! Type definitions for the normalized endpoint catalog

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP methods recognized in path items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase form, as the verb appears as a path-item key
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a parameter is carried in the HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl Default for ParameterLocation {
    fn default() -> Self {
        ParameterLocation::Query
    }
}

/// One input to an endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Scalar type name ("string", "integer", ...); defaults to "string"
    #[serde(rename = "type")]
    pub param_type: String,
    /// Whether the parameter must be supplied
    pub required: bool,
    /// Human-readable description
    pub description: Option<String>,
    /// Request location; defaults to query
    #[serde(rename = "in", default)]
    pub location: ParameterLocation,
}

/// One callable operation derived from the specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Sanitized unique identifier derived from method + path
    pub id: String,
    /// Sanitized operation name; equals `id` when the spec has no operationId
    pub name: String,
    /// Uppercase HTTP verb
    pub method: HttpMethod,
    /// Original path template, `{param}` placeholders included
    pub path: String,
    /// Summary, falling back to "METHOD path"
    pub description: String,
    /// Path-derived parameters first, then declared parameters
    pub parameters: Vec<Parameter>,
    /// Opaque request body schema fragment, passed through untouched
    pub request_body_schema: Option<serde_json::Value>,
    /// Opaque response schema fragment, passed through untouched
    pub response_schema: Option<serde_json::Value>,
}

/// Target language for generated server code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeTarget {
    Node,
    Python,
}

impl CodeTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeTarget::Node => "node",
            CodeTarget::Python => "python",
        }
    }

    /// Filename of the emitted server source for this target
    pub fn source_filename(&self) -> &'static str {
        match self {
            CodeTarget::Node => "index.js",
            CodeTarget::Python => "server.py",
        }
    }

    pub fn all() -> [CodeTarget; 2] {
        [CodeTarget::Node, CodeTarget::Python]
    }
}

/// Lifecycle of a generated server artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Generating,
    Ready,
    Error,
}

/// Authentication scheme applied to outbound API calls.
///
/// Always caller-supplied; never derived from the specification's declared
/// security schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthConfig {
    None,
    ApiKey {
        key: String,
        header_name: String,
    },
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
}

/// The generated artifact plus metadata: the endpoint catalog, the rendered
/// source per target language, and the lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Sanitized identifier derived from the spec title
    pub id: String,
    /// API title as declared in the spec
    pub name: String,
    /// API description, with a generated fallback
    pub description: String,
    /// First declared server URL, or a placeholder
    pub base_url: String,
    /// Ordered endpoint catalog
    pub endpoints: Vec<Endpoint>,
    /// Lifecycle status
    pub status: ServerStatus,
    /// Generated source text per target language
    pub code: HashMap<CodeTarget, String>,
    /// Caller-supplied authentication, if any
    pub auth_config: Option<AuthConfig>,
}

impl Server {
    /// Confirm the server; only meaningful from the generating state.
    pub fn mark_ready(&mut self) {
        self.status = ServerStatus::Ready;
    }

    /// Record that a downstream consumer failed against this server.
    pub fn mark_error(&mut self) {
        self.status = ServerStatus::Error;
    }

    /// Override the base URL (external configuration surface).
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Attach caller-supplied authentication.
    pub fn set_auth_config(&mut self, auth: AuthConfig) {
        self.auth_config = Some(auth);
    }
}

// --- Raw specification structures for deserialization ---

/// Raw OpenAPI/Swagger document. Only the fields the compiler consumes are
/// modeled; everything else is ignored by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSpec {
    pub info: Option<RawInfo>,
    #[serde(default)]
    pub servers: Vec<RawServer>,
    pub paths: Option<IndexMap<String, RawPathItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServer {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPathItem {
    pub get: Option<RawOperation>,
    pub post: Option<RawOperation>,
    pub put: Option<RawOperation>,
    pub patch: Option<RawOperation>,
    pub delete: Option<RawOperation>,
    pub head: Option<RawOperation>,
    pub options: Option<RawOperation>,
    pub trace: Option<RawOperation>,
}

impl RawPathItem {
    /// Verb/operation pairs present on this path item, in fixed verb order
    pub fn operations(&self) -> Vec<(HttpMethod, &RawOperation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
        .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub request_body: Option<serde_json::Value>,
    pub responses: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
}
