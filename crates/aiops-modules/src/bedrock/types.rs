//! Bedrock and Bedrock Agents resource shapes
//!
//! Field names follow the service wire format (camelCase). Fields the
//! modules never inspect are kept in `extra` so outputs stay complete.

use aiops_core::{snake_dict_to_camel_dict, snake_to_camel, AiOpsError, AiOpsResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Draft version of an agent; the only mutable one
pub const DRAFT_VERSION: &str = "DRAFT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub agent_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundation_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_resource_role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestration_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_collaboration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "idleSessionTTLInSeconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub idle_session_ttl_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_override_configuration: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub agent_name: String,
    pub foundation_model: String,
    pub instruction: String,
    pub agent_resource_role_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestration_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "idleSessionTTLInSeconds", skip_serializing_if = "Option::is_none")]
    pub idle_session_ttl_in_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_collaboration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_override_configuration: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

/// UpdateAgent replaces the agent definition, so required fields are
/// always sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    pub agent_id: String,
    pub agent_name: String,
    pub foundation_model: String,
    pub agent_resource_role_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestration_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "idleSessionTTLInSeconds", skip_serializing_if = "Option::is_none")]
    pub idle_session_ttl_in_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_collaboration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_override_configuration: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRouting {
    #[serde(default, alias = "agent_version", skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<String>,
    #[serde(default, alias = "provisioned_throughput", skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAliasSummary {
    pub agent_alias_id: String,
    pub agent_alias_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_alias_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAlias {
    pub agent_alias_id: String,
    pub agent_alias_name: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub agent_alias_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub routing_configuration: Vec<AliasRouting>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentAliasRequest {
    pub agent_id: String,
    pub agent_alias_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routing_configuration: Vec<AliasRouting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentAliasRequest {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub agent_alias_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routing_configuration: Vec<AliasRouting>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupExecutor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_control: Option<String>,
}

impl ActionGroupExecutor {
    pub fn lambda(arn: impl Into<String>) -> Self {
        Self {
            lambda: Some(arn.into()),
            custom_control: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupSummary {
    pub action_group_id: String,
    pub action_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_group_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroup {
    pub action_group_id: String,
    pub action_group_name: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub agent_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_group_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_schema: Option<ApiSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_group_executor: Option<ActionGroupExecutor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionGroupRequest {
    pub agent_id: String,
    pub agent_version: String,
    pub action_group_name: String,
    pub action_group_executor: ActionGroupExecutor,
    pub api_schema: ApiSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_group_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActionGroupRequest {
    pub agent_id: String,
    pub agent_version: String,
    pub action_group_id: String,
    pub action_group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_group_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_group_executor: Option<ActionGroupExecutor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_schema: Option<ApiSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationModelFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_customization_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_output_modality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_inference_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationModel {
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Runtime model invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeModelRequest {
    pub model_id: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub accept: String,
    pub trace: Option<String>,
    pub guardrail_identifier: Option<String>,
    pub guardrail_version: Option<String>,
    pub performance_config_latency: Option<String>,
}

/// Runtime agent invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeAgentRequest {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: String,
    pub input_text: String,
    pub end_session: bool,
    pub enable_trace: bool,
    pub session_state: Option<SessionState>,
}

/// `InvokeAgent` session state; keys without a typed field stay in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<std::collections::HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_session_attributes: Option<std::collections::HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attribute maps whose keys belong to the caller
const VERBATIM_SESSION_KEYS: [&str; 2] = ["sessionAttributes", "promptSessionAttributes"];

impl SessionState {
    /// Session state from the snake_case module argument
    ///
    /// Every key is camel-cased except inside the attribute maps.
    pub fn from_snake(value: &Value) -> AiOpsResult<Self> {
        let Value::Object(map) = value else {
            return Err(AiOpsError::validation("session_state must be a dict"));
        };
        let camel: Map<String, Value> = map
            .iter()
            .map(|(key, val)| {
                let key = snake_to_camel(key, false);
                let val = if VERBATIM_SESSION_KEYS.contains(&key.as_str()) {
                    val.clone()
                } else {
                    snake_dict_to_camel_dict(val, false)
                };
                (key, val)
            })
            .collect();
        serde_json::from_value(Value::Object(camel))
            .map_err(|e| AiOpsError::validation(format!("argument 'session_state' has an unexpected shape: {}", e)))
    }
}

/// One event from an agent's response stream
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStreamEvent {
    /// Part of the answer text
    Chunk(Vec<u8>),
    /// Orchestration trace, rendered as text
    Trace(String),
    /// Any other event type, by name
    Other(String),
}

impl AgentStreamEvent {
    /// JSON view matching the wire event shape
    pub fn to_value(&self) -> Value {
        match self {
            AgentStreamEvent::Chunk(bytes) => serde_json::json!({
                "chunk": { "bytes": String::from_utf8_lossy(bytes) }
            }),
            AgentStreamEvent::Trace(trace) => serde_json::json!({ "trace": { "trace": trace } }),
            AgentStreamEvent::Other(kind) => {
                let mut event = Map::new();
                event.insert(kind.clone(), Value::Object(Map::new()));
                Value::Object(event)
            }
        }
    }
}
