//! Intermediate representation for the code emitters
//!
//! Both renderers consume the same IR, so adding another target language
//! only means adding another renderer.

use spec_compiler::{Endpoint, ParameterLocation, Server};
use tracing::warn;

/// One parameter of a generated tool declaration
#[derive(Debug, Clone)]
pub struct ParamIr {
    pub name: String,
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

/// One tool: declaration, dispatch entry, and HTTP handler
#[derive(Debug, Clone)]
pub struct ToolIr {
    /// Sanitized identifier used for handler function names
    pub id: String,
    /// Tool name exposed to callers
    pub name: String,
    pub description: String,
    pub method: String,
    pub path: String,
    pub params: Vec<ParamIr>,
    /// Names of path parameters, in declaration order
    pub path_params: Vec<String>,
    /// Names of query parameters, in declaration order
    pub query_params: Vec<String>,
    /// Non-GET handlers attach a JSON body when `args.body` is present
    pub has_body: bool,
}

/// Everything the renderers need about one server
#[derive(Debug, Clone)]
pub struct ServerIr {
    pub server_id: String,
    pub server_name: String,
    pub description: String,
    pub base_url: String,
    pub version: String,
    pub tools: Vec<ToolIr>,
}

impl ServerIr {
    /// Build the IR from a normalized server, dropping endpoints that cannot
    /// be named. Emission itself never fails.
    pub fn build(server: &Server) -> Self {
        let tools = server
            .endpoints
            .iter()
            .filter(|endpoint| {
                if endpoint.id.is_empty() || endpoint.name.is_empty() {
                    warn!(
                        "Skipping unnameable endpoint {} {}",
                        endpoint.method, endpoint.path
                    );
                    return false;
                }
                true
            })
            .map(Self::build_tool)
            .collect();

        Self {
            server_id: server.id.clone(),
            server_name: server.name.clone(),
            description: server.description.clone(),
            base_url: server.base_url.clone(),
            version: "1.0.0".to_string(),
            tools,
        }
    }

    fn build_tool(endpoint: &Endpoint) -> ToolIr {
        let params = endpoint
            .parameters
            .iter()
            .map(|p| ParamIr {
                name: p.name.clone(),
                param_type: p.param_type.clone(),
                description: p
                    .description
                    .clone()
                    .unwrap_or_else(|| p.name.clone()),
                required: p.required,
            })
            .collect();

        let path_params = endpoint
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
            .map(|p| p.name.clone())
            .collect();

        let query_params = endpoint
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
            .map(|p| p.name.clone())
            .collect();

        ToolIr {
            id: endpoint.id.clone(),
            name: endpoint.name.clone(),
            description: endpoint.description.clone(),
            method: endpoint.method.as_str().to_string(),
            path: endpoint.path.clone(),
            params,
            path_params,
            query_params,
            has_body: endpoint.method.as_str() != "GET",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spec_compiler::SpecNormalizer;

    const SPEC: &str = r#"
info:
  title: IR API
  version: "1.0.0"
paths:
  /users/{id}:
    get:
      operationId: getUser
      summary: Get a user
      parameters:
        - name: verbose
          in: query
          schema:
            type: boolean
      responses: {}
    delete:
      operationId: deleteUser
      responses: {}
"#;

    #[test]
    fn test_build_splits_param_locations() {
        let server = SpecNormalizer::parse(SPEC).unwrap();
        let ir = ServerIr::build(&server);

        assert_eq!(ir.tools.len(), 2);
        let get = ir.tools.iter().find(|t| t.name == "getUser").unwrap();
        assert_eq!(get.path_params, vec!["id"]);
        assert_eq!(get.query_params, vec!["verbose"]);
        assert!(!get.has_body);

        let delete = ir.tools.iter().find(|t| t.name == "deleteUser").unwrap();
        assert!(delete.has_body);
        assert_eq!(delete.method, "DELETE");
    }

    #[test]
    fn test_unnameable_endpoints_filtered() {
        let mut server = SpecNormalizer::parse(SPEC).unwrap();
        server.endpoints[0].name = String::new();
        let ir = ServerIr::build(&server);
        assert_eq!(ir.tools.len(), 1);
    }
}
