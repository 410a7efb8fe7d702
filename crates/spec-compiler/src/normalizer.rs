//! Spec normalization: raw OpenAPI/Swagger document to endpoint catalog

use crate::error::{CompileError, CompileResult};
use crate::params::ParameterExtractor;
use crate::sanitize::sanitize;
use crate::types::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Placeholder base URL used when the spec declares no servers
pub const BASE_URL_PLACEHOLDER: &str = "https://api.example.com";

/// Walks a raw specification and produces a `Server` with an ordered
/// endpoint catalog. Code generation is layered on top by `server-codegen`.
pub struct SpecNormalizer;

impl SpecNormalizer {
    /// Parse a spec from a string (auto-detects JSON/YAML) and normalize it.
    pub fn parse(content: &str) -> CompileResult<Server> {
        let raw: RawSpec = if content.trim_start().starts_with('{') {
            serde_json::from_str(content)?
        } else {
            serde_yaml::from_str(content)?
        };

        Self::normalize(raw)
    }

    /// Normalize an already-deserialized specification tree.
    pub fn normalize(raw: RawSpec) -> CompileResult<Server> {
        let info = raw
            .info
            .ok_or_else(|| CompileError::InvalidSpecification("missing info".to_string()))?;
        if info.title.is_empty() {
            return Err(CompileError::InvalidSpecification(
                "missing info.title".to_string(),
            ));
        }
        let paths = raw
            .paths
            .ok_or_else(|| CompileError::InvalidSpecification("missing paths".to_string()))?;

        debug!("Normalizing spec: {}", info.title);

        let mut endpoints = Vec::new();
        for (path, path_item) in &paths {
            for (method, operation) in path_item.operations() {
                endpoints.push(Self::build_endpoint(path, method, operation));
            }
        }

        if endpoints.is_empty() {
            return Err(CompileError::EmptySpecification);
        }

        let base_url = raw
            .servers
            .first()
            .map(|s| s.url.clone())
            .unwrap_or_else(|| BASE_URL_PLACEHOLDER.to_string());

        info!(
            "Normalized {} endpoints from spec '{}'",
            endpoints.len(),
            info.title
        );

        Ok(Server {
            id: format!("mcp_{}", sanitize(&info.title)),
            name: info.title.clone(),
            description: info
                .description
                .unwrap_or_else(|| format!("MCP server for {}", info.title)),
            base_url,
            endpoints,
            status: ServerStatus::Generating,
            code: HashMap::new(),
            auth_config: None,
        })
    }

    /// Build one endpoint from a path/verb/operation triple.
    fn build_endpoint(path: &str, method: HttpMethod, operation: &RawOperation) -> Endpoint {
        let id = sanitize(&format!("{}_{}", method.as_lower(), path));
        let name = operation
            .operation_id
            .as_deref()
            .map(sanitize)
            .unwrap_or_else(|| id.clone());

        let description = operation
            .summary
            .clone()
            .or_else(|| operation.description.clone())
            .unwrap_or_else(|| format!("{} {}", method.as_str(), path));

        Endpoint {
            id,
            name,
            method,
            path: path.to_string(),
            description,
            parameters: ParameterExtractor::extract(&operation.parameters, path),
            request_body_schema: operation.request_body.clone(),
            response_schema: operation.responses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SAMPLE_SPEC: &str = r#"
openapi: "3.0.0"
info:
  title: Test API
  version: "1.0.0"
  description: An API for tests
servers:
  - url: https://api.example.com/v1
paths:
  /users:
    get:
      operationId: listUsers
      summary: List all users
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        '200':
          description: A list of users
    post:
      operationId: createUser
      summary: Create a user
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
      responses:
        '201':
          description: User created
  /users/{id}:
    get:
      operationId: getUser
      summary: Get a user by ID
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '200':
          description: A user
"#;

    #[test]
    fn test_normalize_counts_and_metadata() {
        let server = SpecNormalizer::parse(SAMPLE_SPEC).unwrap();

        assert_eq!(server.name, "Test API");
        assert_eq!(server.id, "mcp_Test_API");
        assert_eq!(server.description, "An API for tests");
        assert_eq!(server.base_url, "https://api.example.com/v1");
        assert_eq!(server.endpoints.len(), 3);
        assert_eq!(server.status, ServerStatus::Generating);
        assert!(server.code.is_empty());
    }

    #[test]
    fn test_endpoint_ids_unique() {
        let server = SpecNormalizer::parse(SAMPLE_SPEC).unwrap();
        let ids: HashSet<_> = server.endpoints.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), server.endpoints.len());
    }

    #[test]
    fn test_get_user_endpoint_shape() {
        let server = SpecNormalizer::parse(SAMPLE_SPEC).unwrap();
        let get_user = server
            .endpoints
            .iter()
            .find(|e| e.name == "getUser")
            .unwrap();

        assert_eq!(get_user.id, "get__users__id_");
        assert_eq!(get_user.method, HttpMethod::Get);
        assert_eq!(get_user.path, "/users/{id}");
        assert_eq!(get_user.description, "Get a user by ID");

        // Path-derived entry precedes the declared one; both persist.
        let path_params: Vec<_> = get_user
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path && p.name == "id")
            .collect();
        assert!(!path_params.is_empty());
        assert!(path_params.iter().all(|p| p.required));
        assert_eq!(get_user.parameters[0].location, ParameterLocation::Path);
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let spec = r#"
info:
  title: Anon API
  version: "1.0.0"
paths:
  /ping:
    get:
      responses:
        '200':
          description: pong
"#;
        let server = SpecNormalizer::parse(spec).unwrap();
        assert_eq!(server.endpoints[0].id, "get__ping");
        assert_eq!(server.endpoints[0].name, server.endpoints[0].id);
        assert_eq!(server.endpoints[0].description, "GET /ping");
    }

    #[test]
    fn test_missing_paths_is_invalid() {
        let spec = r#"
info:
  title: Broken API
  version: "1.0.0"
"#;
        let err = SpecNormalizer::parse(spec).unwrap_err();
        assert!(matches!(err, CompileError::InvalidSpecification(_)));
    }

    #[test]
    fn test_missing_info_is_invalid() {
        let spec = r#"
paths:
  /ping:
    get:
      responses:
        '200':
          description: pong
"#;
        let err = SpecNormalizer::parse(spec).unwrap_err();
        assert!(matches!(err, CompileError::InvalidSpecification(_)));
    }

    #[test]
    fn test_zero_operations_is_empty() {
        let spec = r#"
info:
  title: Hollow API
  version: "1.0.0"
paths: {}
"#;
        let err = SpecNormalizer::parse(spec).unwrap_err();
        assert!(matches!(err, CompileError::EmptySpecification));
    }

    #[test]
    fn test_json_autodetect() {
        let spec = r#"{
  "info": {"title": "Json API", "version": "1.0.0"},
  "paths": {
    "/ping": {"get": {"operationId": "ping", "responses": {}}}
  }
}"#;
        let server = SpecNormalizer::parse(spec).unwrap();
        assert_eq!(server.name, "Json API");
        assert_eq!(server.endpoints[0].name, "ping");
    }

    #[test]
    fn test_missing_base_url_placeholder() {
        let spec = r#"
info:
  title: Serverless API
  version: "1.0.0"
paths:
  /ping:
    get:
      responses: {}
"#;
        let server = SpecNormalizer::parse(spec).unwrap();
        assert_eq!(server.base_url, BASE_URL_PLACEHOLDER);
    }

    #[test]
    fn test_schemas_passed_through() {
        let server = SpecNormalizer::parse(SAMPLE_SPEC).unwrap();
        let create = server
            .endpoints
            .iter()
            .find(|e| e.name == "createUser")
            .unwrap();
        assert!(create.request_body_schema.is_some());
        assert!(create.response_schema.is_some());
    }
}
