//! Intent resolution
//!
//! Asks the completion backend whether a user message maps to an API call,
//! and with what arguments. The model's answer is advisory: the resolver
//! re-checks required parameters and falls back to "do not execute" on any
//! parse or transport failure, so a bad completion never crashes a turn.

use crate::backend::{CompletionBackend, CompletionRequest, PromptMessage};
use crate::executor::ApiExecutor;
use crate::json::parse_model_json;
use serde::Deserialize;
use serde_json::{Map, Value};
use spec_compiler::Endpoint;
use tracing::{debug, warn};

/// The record the model is asked to produce, verbatim
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentAnalysis {
    should_execute: bool,
    endpoint_name: Option<String>,
    #[serde(default)]
    extracted_parameters: Map<String, Value>,
    #[serde(default)]
    missing_parameters: Vec<String>,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    reasoning: Option<String>,
}

/// What the resolver decided for one user message
#[derive(Debug, Clone)]
pub struct IntentResolution {
    pub should_execute: bool,
    pub endpoint: Option<Endpoint>,
    pub parameters: Map<String, Value>,
    pub confidence: f32,
}

impl IntentResolution {
    /// The safe default: converse, do not call the API.
    pub fn no_call() -> Self {
        Self {
            should_execute: false,
            endpoint: None,
            parameters: Map::new(),
            confidence: 0.0,
        }
    }
}

/// Resolves user messages to endpoint calls via the completion backend
pub struct IntentResolver;

impl IntentResolver {
    /// Decide whether `user_message` should trigger an API call. Total:
    /// every failure path collapses to the no-call resolution.
    pub async fn resolve(
        backend: &dyn CompletionBackend,
        executor: &ApiExecutor,
        user_message: &str,
    ) -> IntentResolution {
        let prompt = Self::build_prompt(executor.endpoints(), user_message);
        let request = CompletionRequest::new(vec![
            PromptMessage::system(prompt),
            PromptMessage::user(user_message.to_string()),
        ])
        .with_temperature(0.3);

        let completion = match backend.complete(request).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "intent completion failed; treating as conversational");
                return IntentResolution::no_call();
            }
        };

        let Some(value) = parse_model_json(&completion) else {
            return IntentResolution::no_call();
        };
        let analysis: IntentAnalysis = match serde_json::from_value(value) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(error = %err, "intent analysis did not match expected shape");
                return IntentResolution::no_call();
            }
        };

        debug!(
            should_execute = analysis.should_execute,
            endpoint = analysis.endpoint_name.as_deref().unwrap_or("-"),
            confidence = analysis.confidence,
            reasoning = analysis.reasoning.as_deref().unwrap_or("-"),
            "intent analysis"
        );

        if !analysis.should_execute {
            return IntentResolution::no_call();
        }

        let Some(endpoint) = analysis
            .endpoint_name
            .as_deref()
            .and_then(|name| executor.find_endpoint_by_name(name))
            .cloned()
        else {
            warn!(
                endpoint = analysis.endpoint_name.as_deref().unwrap_or("-"),
                "model selected an unknown endpoint"
            );
            return IntentResolution::no_call();
        };

        // The model sometimes claims readiness while parameters are absent;
        // required parameters are the ground truth.
        let missing: Vec<&str> = endpoint
            .parameters
            .iter()
            .filter(|p| p.required && !analysis.extracted_parameters.contains_key(&p.name))
            .map(|p| p.name.as_str())
            .collect();
        if !missing.is_empty() || !analysis.missing_parameters.is_empty() {
            debug!(?missing, "required parameters unresolved; not executing");
            return IntentResolution {
                should_execute: false,
                endpoint: Some(endpoint),
                parameters: analysis.extracted_parameters,
                confidence: analysis.confidence,
            };
        }

        IntentResolution {
            should_execute: true,
            endpoint: Some(endpoint),
            parameters: analysis.extracted_parameters,
            confidence: analysis.confidence,
        }
    }

    /// System prompt enumerating the endpoint catalog with parameter
    /// signatures, demanding strict JSON back.
    fn build_prompt(endpoints: &[Endpoint], user_message: &str) -> String {
        let mut catalog = String::new();
        for ep in endpoints {
            let signature: Vec<String> = ep
                .parameters
                .iter()
                .map(|p| {
                    if p.required {
                        format!("{}({}*)", p.name, p.param_type)
                    } else {
                        format!("{}({})", p.name, p.param_type)
                    }
                })
                .collect();
            catalog.push_str(&format!(
                "- {} [{} {}]: {} | parameters: {}\n",
                ep.name,
                ep.method.as_str(),
                ep.path,
                ep.description,
                if signature.is_empty() {
                    "none".to_string()
                } else {
                    signature.join(", ")
                }
            ));
        }

        format!(
            "You are an API intent analyzer. Given a user message, decide whether it \
             should trigger one of the available API endpoints.\n\n\
             Available endpoints (* marks required parameters):\n{catalog}\n\
             User message: \"{user_message}\"\n\n\
             Respond with ONLY a JSON object, no markdown, no prose:\n\
             {{\n\
             \x20 \"shouldExecute\": boolean,\n\
             \x20 \"endpointName\": \"exact endpoint name or null\",\n\
             \x20 \"extractedParameters\": {{\"param\": \"value\"}},\n\
             \x20 \"missingParameters\": [\"names of required parameters you could not extract\"],\n\
             \x20 \"confidence\": number between 0 and 1,\n\
             \x20 \"reasoning\": \"one sentence\"\n\
             }}\n\n\
             Set shouldExecute to true only when the user clearly wants the API called \
             and every required parameter is extracted."
        )
    }
}
