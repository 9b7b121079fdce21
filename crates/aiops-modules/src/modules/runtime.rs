//! Bedrock runtime modules
//!
//! - `bedrock_model_inference` - Run a prompt against a foundation model
//! - `bedrock_invoke_agent` - Send input to a deployed agent alias

use aiops_core::{encode_body, extract_completion, AiOpsError, AiOpsResult, ModuleOutput, ModuleSpec, ParamSpec};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::bedrock::types::{AgentStreamEvent, InvokeAgentRequest, InvokeModelRequest, SessionState};
use crate::module::{Module, ModuleContext};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const JSON_CONTENT: &str = "application/json";

/// Request body for a single user prompt
///
/// Claude models take the Anthropic messages format; everything else gets
/// the Converse-style body understood by Nova and friends.
pub fn inference_body(model_id: &str, prompt: &str, max_tokens: i64) -> Value {
    if model_id.to_lowercase().contains("claude") {
        json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
        })
    } else {
        json!({
            "messages": [{"role": "user", "content": [{"text": prompt}]}],
            "inferenceConfig": {"maxTokens": max_tokens},
        })
    }
}

/// Response bytes as JSON, or as a string when they are not JSON
fn decode_response(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// ============================================================================
// bedrock_model_inference
// ============================================================================

pub struct BedrockModelInferenceModule {
    spec: ModuleSpec,
}

impl BedrockModelInferenceModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("bedrock_model_inference", "Invoke an Amazon Bedrock foundation model")
            .params([
                ParamSpec::str("model_id").required(),
                ParamSpec::str("prompt").required(),
                ParamSpec::str("trace")
                    .choices(&["ENABLED", "DISABLED", "ENABLED_FULL"])
                    .default_value(json!("DISABLED")),
                ParamSpec::str("guardrail_identifier"),
                ParamSpec::str("guardrail_version"),
                ParamSpec::str("performance_config_latency")
                    .choices(&["standard", "optimized"])
                    .default_value(json!("standard")),
                ParamSpec::int("max_tokens").default_value(json!(250)).no_log(),
            ])
            .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockModelInferenceModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockModelInferenceModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let model_id = ctx.required_str("model_id")?;
        let prompt = ctx.required_str("prompt")?;

        let guardrail_identifier = ctx.params.str("guardrail_identifier");
        let guardrail_version = ctx.params.str("guardrail_version");
        if guardrail_identifier.is_some() && guardrail_version.is_none() {
            return Err(AiOpsError::validation(
                "guardrail_version is required when guardrail_identifier is specified.",
            ));
        }

        if ctx.check_mode() {
            return Ok(ModuleOutput::unchanged()
                .with_msg(format!("Check mode: would have invoked model {}.", model_id))
                .with("model_id", model_id)
                .with("prompt", prompt));
        }

        let max_tokens = ctx.params.int("max_tokens").unwrap_or(250);
        let body = inference_body(model_id, prompt, max_tokens);
        let request = InvokeModelRequest {
            model_id: model_id.to_string(),
            body: encode_body(&body)?,
            content_type: JSON_CONTENT.to_string(),
            accept: JSON_CONTENT.to_string(),
            trace: ctx.params.str("trace").filter(|t| *t != "DISABLED").map(str::to_string),
            guardrail_identifier: guardrail_identifier.map(str::to_string),
            guardrail_version: guardrail_version.map(str::to_string),
            performance_config_latency: ctx
                .params
                .str("performance_config_latency")
                .filter(|l| *l != "standard")
                .map(str::to_string),
        };

        let client = ctx.clients.bedrock_runtime().await?;
        let response = client.invoke_model(&request).await?;
        debug!(model_id, bytes = response.len(), "Model responded");

        let raw_response = decode_response(&response);
        let response_text = extract_completion(&raw_response);

        Ok(ModuleOutput::changed()
            .with("model_id", model_id)
            .with("prompt", prompt)
            .with("response_text", response_text)
            .with("raw_response", raw_response))
    }
}

// ============================================================================
// bedrock_invoke_agent
// ============================================================================

pub struct BedrockInvokeAgentModule {
    spec: ModuleSpec,
}

impl BedrockInvokeAgentModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("bedrock_invoke_agent", "Invoke an Amazon Bedrock agent alias")
            .params([
                ParamSpec::str("agent_id").required(),
                ParamSpec::str("agent_alias_id").required(),
                ParamSpec::str("input_text").required(),
                ParamSpec::str("session_id").describe("Conversation to continue; a new one is started when unset"),
                ParamSpec::bool("end_session").default_value(json!(false)),
                ParamSpec::bool("enable_trace").default_value(json!(false)),
                ParamSpec::dict("session_state")
                    .describe("Session state passed to the agent (session_attributes, prompt_session_attributes, ...)"),
            ])
            .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockInvokeAgentModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Answer text assembled from the stream's chunks
fn response_text(events: &[AgentStreamEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            AgentStreamEvent::Chunk(bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl Module for BedrockInvokeAgentModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let session_id = ctx
            .params
            .str("session_id")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if ctx.check_mode() {
            return Ok(ModuleOutput::changed()
                .with_msg("Check mode: Would have invoked the agent.")
                .with("session_id", session_id)
                .with("response_text", "")
                .with("raw_api_response", json!([])));
        }

        let request = InvokeAgentRequest {
            agent_id: ctx.required_str("agent_id")?.to_string(),
            agent_alias_id: ctx.required_str("agent_alias_id")?.to_string(),
            session_id: session_id.clone(),
            input_text: ctx.required_str("input_text")?.to_string(),
            end_session: ctx.params.bool("end_session"),
            enable_trace: ctx.params.bool("enable_trace"),
            session_state: ctx.params.raw("session_state").map(SessionState::from_snake).transpose()?,
        };

        let client = ctx.clients.bedrock_agent_runtime().await?;
        let events = client.invoke_agent(&request).await?;
        info!(agent_id = %request.agent_id, session_id = %session_id, events = events.len(), "Agent invoked");

        let raw: Vec<Value> = events.iter().map(AgentStreamEvent::to_value).collect();
        Ok(ModuleOutput::changed()
            .with("session_id", session_id)
            .with("response_text", response_text(&events))
            .with("raw_api_response", Value::Array(raw)))
    }
}
