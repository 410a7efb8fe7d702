//! Live HTTP execution against the described API
//!
//! An executor is built once per server and never mutated. Every call is
//! total: failures of any kind come back as a failed `ExecutionResult`,
//! never as `Err`, so the conversation can always continue.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spec_compiler::{AuthConfig, Endpoint, HttpMethod, ParameterLocation, Server};
use std::collections::HashMap;
use tracing::{debug, warn};

const USER_AGENT: &str = "MCP-Chat-Client/1.0";

/// Outcome of one API call, success or failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    /// Parsed response body on success; raw text is wrapped in a JSON string
    pub data: Option<Value>,
    pub error: Option<String>,
    pub status_code: Option<u16>,
    /// Endpoint name the call was made against
    pub endpoint: String,
    /// Uppercase HTTP verb
    pub method: String,
}

impl ExecutionResult {
    fn failure(endpoint: &Endpoint, error: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            status_code,
            endpoint: endpoint.name.clone(),
            method: endpoint.method.as_str().to_string(),
        }
    }
}

/// Executes endpoint calls against the live API
pub struct ApiExecutor {
    base_url: String,
    endpoints: Vec<Endpoint>,
    auth: Option<AuthConfig>,
    client: Client,
}

impl ApiExecutor {
    /// Build an executor for a server. `auth_override` takes precedence over
    /// the server's own auth configuration.
    pub fn new(server: &Server, auth_override: Option<AuthConfig>) -> Self {
        Self {
            base_url: server.base_url.trim_end_matches('/').to_string(),
            endpoints: server.endpoints.clone(),
            auth: auth_override.or_else(|| server.auth_config.clone()),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// First endpoint whose name or description contains the query,
    /// case-insensitively.
    pub fn find_endpoint_by_name(&self, query: &str) -> Option<&Endpoint> {
        let needle = query.to_lowercase();
        self.endpoints.iter().find(|ep| {
            ep.name.to_lowercase().contains(&needle)
                || ep.description.to_lowercase().contains(&needle)
        })
    }

    /// Up to three endpoints matching any whitespace-separated term of the
    /// intent against name, description, or path.
    pub fn find_endpoints_by_intent(&self, intent: &str) -> Vec<&Endpoint> {
        let terms: Vec<String> = intent
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        self.endpoints
            .iter()
            .filter(|ep| {
                let haystack = format!(
                    "{} {} {}",
                    ep.name.to_lowercase(),
                    ep.description.to_lowercase(),
                    ep.path.to_lowercase()
                );
                terms.iter().any(|term| haystack.contains(term))
            })
            .take(3)
            .collect()
    }

    /// Execute one endpoint with the given arguments. Never fails: transport
    /// errors, missing parameters, and non-2xx statuses all come back as a
    /// failed result.
    pub async fn execute(&self, endpoint: &Endpoint, args: &HashMap<String, Value>) -> ExecutionResult {
        // Required parameters are checked before any URL construction so a
        // missing value can be named instead of leaking a `{placeholder}`.
        for param in endpoint.parameters.iter().filter(|p| p.required) {
            if !args.contains_key(&param.name) {
                warn!(
                    endpoint = %endpoint.name,
                    parameter = %param.name,
                    "missing required parameter"
                );
                return ExecutionResult::failure(
                    endpoint,
                    format!("Missing required parameter: {}", param.name),
                    None,
                );
            }
        }

        let url = self.build_url(endpoint, args);
        debug!(method = %endpoint.method, %url, "executing API call");

        let mut builder = self
            .client
            .request(to_reqwest_method(endpoint.method), &url)
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT);

        builder = self.apply_auth(builder);

        if endpoint.method != HttpMethod::Get {
            if let Some(body) = args.get("body") {
                builder = builder.json(body);
            }
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(endpoint = %endpoint.name, error = %err, "API call failed to send");
                return ExecutionResult::failure(endpoint, err.to_string(), None);
            }
        };

        let status = response.status();
        let status_code = status.as_u16();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            return ExecutionResult::failure(
                endpoint,
                format!("HTTP {}: {}", status_code, reason),
                Some(status_code),
            );
        }

        let text = response.text().await.unwrap_or_default();
        let data = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        };

        ExecutionResult {
            success: true,
            data: Some(data),
            error: None,
            status_code: Some(status_code),
            endpoint: endpoint.name.clone(),
            method: endpoint.method.as_str().to_string(),
        }
    }

    /// Substitute path parameters (percent-encoded) and append query
    /// parameters in declaration order.
    fn build_url(&self, endpoint: &Endpoint, args: &HashMap<String, Value>) -> String {
        let mut path = endpoint.path.clone();
        let mut query_pairs: Vec<(String, String)> = Vec::new();

        for param in &endpoint.parameters {
            let Some(value) = args.get(&param.name) else {
                continue;
            };
            let rendered = render_value(value);
            match param.location {
                ParameterLocation::Path => {
                    let placeholder = format!("{{{}}}", param.name);
                    path = path.replace(&placeholder, &encode_path_segment(&rendered));
                }
                ParameterLocation::Query => {
                    query_pairs.push((param.name.clone(), rendered));
                }
                // Header and cookie parameters are not forwarded
                ParameterLocation::Header | ParameterLocation::Cookie => {}
            }
        }

        let mut url = format!("{}{}", self.base_url, path);
        if !query_pairs.is_empty() {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query_pairs)
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            None | Some(AuthConfig::None) => builder,
            Some(AuthConfig::ApiKey { key, header_name }) => builder.header(header_name, key),
            Some(AuthConfig::Bearer { token }) => {
                builder.header("Authorization", format!("Bearer {}", token))
            }
            Some(AuthConfig::Basic { username, password }) => {
                let credentials = BASE64.encode(format!("{}:{}", username, password));
                builder.header("Authorization", format!("Basic {}", credentials))
            }
        }
    }
}

/// Percent-encode one path segment. form_urlencoded uses '+' for spaces,
/// which is wrong inside a path.
fn encode_path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Render an argument for use in a URL: strings are used bare, everything
/// else through its JSON form.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
        HttpMethod::Trace => reqwest::Method::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spec_compiler::{Parameter, ServerStatus};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn param(name: &str, required: bool, location: ParameterLocation) -> Parameter {
        Parameter {
            name: name.to_string(),
            param_type: "string".to_string(),
            required,
            description: None,
            location,
        }
    }

    fn endpoint(name: &str, method: HttpMethod, path: &str, parameters: Vec<Parameter>) -> Endpoint {
        Endpoint {
            id: name.to_string(),
            name: name.to_string(),
            method,
            path: path.to_string(),
            description: format!("{} {}", method.as_str(), path),
            parameters,
            request_body_schema: None,
            response_schema: None,
        }
    }

    fn server(base_url: &str, endpoints: Vec<Endpoint>) -> Server {
        Server {
            id: "mcp_test".to_string(),
            name: "Test API".to_string(),
            description: "MCP server for Test API".to_string(),
            base_url: base_url.to_string(),
            endpoints,
            status: ServerStatus::Ready,
            code: HashMap::new(),
            auth_config: None,
        }
    }

    fn args(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_execute_substitutes_path_params() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
            .mount(&mock_server)
            .await;

        let ep = endpoint(
            "get_user",
            HttpMethod::Get,
            "/users/{id}",
            vec![param("id", true, ParameterLocation::Path)],
        );
        let executor = ApiExecutor::new(&server(&mock_server.uri(), vec![ep.clone()]), None);

        let result = executor.execute(&ep, &args(&[("id", json!("42"))])).await;
        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.data, Some(json!({"id": 42})));
        assert_eq!(result.method, "GET");
    }

    #[tokio::test]
    async fn test_execute_encodes_path_params() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/hello%20world"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let ep = endpoint(
            "get_file",
            HttpMethod::Get,
            "/files/{name}",
            vec![param("name", true, ParameterLocation::Path)],
        );
        let executor = ApiExecutor::new(&server(&mock_server.uri(), vec![ep.clone()]), None);

        let result = executor
            .execute(&ep, &args(&[("name", json!("hello world"))]))
            .await;
        assert!(result.success, "{:?}", result.error);
        // Non-JSON body is preserved as a string
        assert_eq!(result.data, Some(json!("ok")));
    }

    #[tokio::test]
    async fn test_execute_appends_query_params_for_all_methods() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(query_param("q", "rust"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let ep = endpoint(
            "search",
            HttpMethod::Post,
            "/search",
            vec![
                param("q", true, ParameterLocation::Query),
                param("limit", false, ParameterLocation::Query),
            ],
        );
        let executor = ApiExecutor::new(&server(&mock_server.uri(), vec![ep.clone()]), None);

        let result = executor
            .execute(&ep, &args(&[("q", json!("rust")), ("limit", json!(5))]))
            .await;
        assert!(result.success, "{:?}", result.error);
    }

    #[tokio::test]
    async fn test_execute_sends_body_for_non_get() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({"name": "Ada"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .mount(&mock_server)
            .await;

        let ep = endpoint("create_user", HttpMethod::Post, "/users", vec![]);
        let executor = ApiExecutor::new(&server(&mock_server.uri(), vec![ep.clone()]), None);

        let result = executor
            .execute(&ep, &args(&[("body", json!({"name": "Ada"}))]))
            .await;
        assert!(result.success);
        assert_eq!(result.status_code, Some(201));
    }

    #[tokio::test]
    async fn test_execute_reports_http_failure_as_result() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let ep = endpoint(
            "get_user",
            HttpMethod::Get,
            "/users/{id}",
            vec![param("id", true, ParameterLocation::Path)],
        );
        let executor = ApiExecutor::new(&server(&mock_server.uri(), vec![ep.clone()]), None);

        let result = executor.execute(&ep, &args(&[("id", json!("999"))])).await;
        assert!(!result.success);
        assert_eq!(result.status_code, Some(404));
        assert_eq!(result.error.as_deref(), Some("HTTP 404: Not Found"));
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_required_param() {
        let ep = endpoint(
            "get_user",
            HttpMethod::Get,
            "/users/{id}",
            vec![param("id", true, ParameterLocation::Path)],
        );
        let executor = ApiExecutor::new(&server("http://localhost:1", vec![ep.clone()]), None);

        let result = executor.execute(&ep, &HashMap::new()).await;
        assert!(!result.success);
        assert!(result.status_code.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("Missing required parameter: id")
        );
    }

    #[tokio::test]
    async fn test_execute_reports_transport_failure_as_result() {
        let ep = endpoint("ping", HttpMethod::Get, "/ping", vec![]);
        // Port 1 is never listening
        let executor = ApiExecutor::new(&server("http://127.0.0.1:1", vec![ep.clone()]), None);

        let result = executor.execute(&ep, &HashMap::new()).await;
        assert!(!result.success);
        assert!(result.status_code.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_auth_headers_applied() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let ep = endpoint("me", HttpMethod::Get, "/me", vec![]);
        let executor = ApiExecutor::new(
            &server(&mock_server.uri(), vec![ep.clone()]),
            Some(AuthConfig::Bearer {
                token: "secret-token".to_string(),
            }),
        );

        let result = executor.execute(&ep, &HashMap::new()).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_basic_auth_encodes_credentials() {
        let mock_server = MockServer::start().await;
        // base64("user:pass") = dXNlcjpwYXNz
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("Authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let ep = endpoint("me", HttpMethod::Get, "/me", vec![]);
        let executor = ApiExecutor::new(
            &server(&mock_server.uri(), vec![ep.clone()]),
            Some(AuthConfig::Basic {
                username: "user".to_string(),
                password: "pass".to_string(),
            }),
        );

        let result = executor.execute(&ep, &HashMap::new()).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_auth_override_beats_server_auth() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("X-Api-Key", "override-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let ep = endpoint("me", HttpMethod::Get, "/me", vec![]);
        let mut srv = server(&mock_server.uri(), vec![ep.clone()]);
        srv.set_auth_config(AuthConfig::Bearer {
            token: "server-token".to_string(),
        });

        let executor = ApiExecutor::new(
            &srv,
            Some(AuthConfig::ApiKey {
                key: "override-key".to_string(),
                header_name: "X-Api-Key".to_string(),
            }),
        );

        let result = executor.execute(&ep, &HashMap::new()).await;
        assert!(result.success);
    }

    #[test]
    fn test_find_endpoint_by_name_case_insensitive() {
        let endpoints = vec![
            endpoint("list_users", HttpMethod::Get, "/users", vec![]),
            endpoint("create_user", HttpMethod::Post, "/users", vec![]),
        ];
        let executor = ApiExecutor::new(&server("http://x", endpoints), None);

        let found = executor.find_endpoint_by_name("CREATE_USER").unwrap();
        assert_eq!(found.name, "create_user");
        assert!(executor.find_endpoint_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_find_endpoints_by_intent_caps_at_three() {
        let endpoints = vec![
            endpoint("list_users", HttpMethod::Get, "/users", vec![]),
            endpoint("get_user", HttpMethod::Get, "/users/{id}", vec![]),
            endpoint("create_user", HttpMethod::Post, "/users", vec![]),
            endpoint("delete_user", HttpMethod::Delete, "/users/{id}", vec![]),
            endpoint("list_orders", HttpMethod::Get, "/orders", vec![]),
        ];
        let executor = ApiExecutor::new(&server("http://x", endpoints), None);

        let matches = executor.find_endpoints_by_intent("show me the users");
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].name, "list_users");

        let orders = executor.find_endpoints_by_intent("orders");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].name, "list_orders");
    }
}
