//! Parameter extraction from path templates and declared parameter lists

use crate::types::{Parameter, ParameterLocation, RawParameter};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Derives the normalized parameter list for one operation
pub struct ParameterExtractor;

fn path_param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("path parameter regex is valid"))
}

impl ParameterExtractor {
    /// Extract parameters for an operation: path-template parameters first
    /// (always required, always `in=path`), then declared parameters.
    ///
    /// The two lists are concatenated without de-duplication; a name that
    /// appears in both persists twice. Callers may rely on ordering but not
    /// on name uniqueness.
    pub fn extract(declared: &[RawParameter], path_template: &str) -> Vec<Parameter> {
        let mut parameters = Self::from_path_template(path_template);

        for param in declared {
            // Declared entries without a name or schema are unusable for
            // tool generation; drop them rather than failing the spec.
            let (name, schema) = match (&param.name, &param.schema) {
                (Some(name), Some(schema)) => (name, schema),
                _ => {
                    debug!(
                        "Dropping declared parameter without name or schema on {}",
                        path_template
                    );
                    continue;
                }
            };

            parameters.push(Parameter {
                name: name.clone(),
                param_type: Self::parameter_type(schema),
                required: param.required,
                description: param.description.clone(),
                location: Self::parse_location(param.location.as_deref()),
            });
        }

        parameters
    }

    /// Scan a path template for `{name}` placeholders and synthesize one
    /// required path parameter per distinct name, in path order.
    fn from_path_template(path_template: &str) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = Vec::new();

        for capture in path_param_regex().captures_iter(path_template) {
            let name = &capture[1];
            if parameters.iter().any(|p| p.name == name) {
                continue;
            }
            parameters.push(Parameter {
                name: name.to_string(),
                param_type: "string".to_string(),
                required: true,
                description: Some(format!("Path parameter: {}", name)),
                location: ParameterLocation::Path,
            });
        }

        parameters
    }

    /// Scalar type for a declared parameter: `schema.type` when present,
    /// `"object"` for references, `"string"` otherwise.
    fn parameter_type(schema: &serde_json::Value) -> String {
        if let Some(t) = schema.get("type").and_then(|t| t.as_str()) {
            return t.to_string();
        }
        if schema.get("$ref").is_some() {
            return "object".to_string();
        }
        "string".to_string()
    }

    fn parse_location(location: Option<&str>) -> ParameterLocation {
        match location {
            Some("path") => ParameterLocation::Path,
            Some("query") => ParameterLocation::Query,
            Some("header") => ParameterLocation::Header,
            Some("cookie") => ParameterLocation::Cookie,
            _ => ParameterLocation::Query,
        }
    }
}
