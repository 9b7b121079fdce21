//! Bedrock service APIs
//!
//! Control-plane traits are implemented over the AWS CLI; the runtime
//! traits are implemented over the SDK (see `aws::sdk`).

use aiops_core::{AiOpsError, AiOpsResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::types::*;
use crate::aws::cli::AwsCli;

/// `bedrock` control plane
#[async_trait]
pub trait BedrockApi: Send + Sync {
    async fn list_foundation_models(&self, filter: &FoundationModelFilter) -> AiOpsResult<Vec<FoundationModel>>;
    async fn get_foundation_model(&self, model_id: &str) -> AiOpsResult<FoundationModel>;
}

/// `bedrock-agent` control plane
#[async_trait]
pub trait BedrockAgentApi: Send + Sync {
    async fn list_agents(&self) -> AiOpsResult<Vec<AgentSummary>>;
    async fn get_agent(&self, agent_id: &str) -> AiOpsResult<Agent>;
    async fn create_agent(&self, request: &CreateAgentRequest) -> AiOpsResult<Agent>;
    async fn update_agent(&self, request: &UpdateAgentRequest) -> AiOpsResult<Agent>;
    async fn prepare_agent(&self, agent_id: &str) -> AiOpsResult<()>;
    async fn delete_agent(&self, agent_id: &str) -> AiOpsResult<()>;

    async fn list_agent_aliases(&self, agent_id: &str) -> AiOpsResult<Vec<AgentAliasSummary>>;
    async fn get_agent_alias(&self, agent_id: &str, alias_id: &str) -> AiOpsResult<AgentAlias>;
    async fn create_agent_alias(&self, request: &CreateAgentAliasRequest) -> AiOpsResult<AgentAlias>;
    async fn update_agent_alias(&self, request: &UpdateAgentAliasRequest) -> AiOpsResult<AgentAlias>;
    async fn delete_agent_alias(&self, agent_id: &str, alias_id: &str) -> AiOpsResult<()>;

    async fn list_agent_action_groups(&self, agent_id: &str, agent_version: &str) -> AiOpsResult<Vec<ActionGroupSummary>>;
    async fn get_agent_action_group(
        &self,
        agent_id: &str,
        agent_version: &str,
        action_group_id: &str,
    ) -> AiOpsResult<ActionGroup>;
    async fn create_agent_action_group(&self, request: &CreateActionGroupRequest) -> AiOpsResult<ActionGroup>;
    async fn update_agent_action_group(&self, request: &UpdateActionGroupRequest) -> AiOpsResult<ActionGroup>;
    async fn delete_agent_action_group(&self, agent_id: &str, agent_version: &str, action_group_id: &str)
        -> AiOpsResult<()>;
}

/// `bedrock-runtime`
#[async_trait]
pub trait BedrockRuntimeApi: Send + Sync {
    /// Returns the raw response body
    async fn invoke_model(&self, request: &InvokeModelRequest) -> AiOpsResult<Vec<u8>>;
}

/// `bedrock-agent-runtime`
#[async_trait]
pub trait BedrockAgentRuntimeApi: Send + Sync {
    /// Drains the completion stream
    async fn invoke_agent(&self, request: &InvokeAgentRequest) -> AiOpsResult<Vec<AgentStreamEvent>>;
}

/// Take `key` out of a response and decode it
pub(crate) fn take_field<T: DeserializeOwned>(mut response: Value, operation: &str, key: &str) -> AiOpsResult<T> {
    let value = response
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| AiOpsError::api(operation, "InvalidResponse", format!("response has no '{}'", key)))?;
    serde_json::from_value(value)
        .map_err(|e| AiOpsError::api(operation, "InvalidResponse", format!("unexpected '{}': {}", key, e)))
}

/// Like [`take_field`], with a missing list treated as empty
pub(crate) fn take_list<T: DeserializeOwned>(mut response: Value, operation: &str, key: &str) -> AiOpsResult<Vec<T>> {
    match response.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AiOpsError::api(operation, "InvalidResponse", format!("unexpected '{}': {}", key, e))),
    }
}

pub(crate) fn to_input<T: Serialize>(request: &T) -> AiOpsResult<Value> {
    Ok(serde_json::to_value(request)?)
}

const BEDROCK: &str = "bedrock";
const BEDROCK_AGENT: &str = "bedrock-agent";

/// [`BedrockApi`] over the AWS CLI
pub struct CliBedrock {
    cli: Arc<AwsCli>,
}

impl CliBedrock {
    pub fn new(cli: Arc<AwsCli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl BedrockApi for CliBedrock {
    async fn list_foundation_models(&self, filter: &FoundationModelFilter) -> AiOpsResult<Vec<FoundationModel>> {
        let op = "ListFoundationModels";
        let response = self.cli.call(BEDROCK, op, to_input(filter)?).await?;
        take_list(response, op, "modelSummaries")
    }

    async fn get_foundation_model(&self, model_id: &str) -> AiOpsResult<FoundationModel> {
        let op = "GetFoundationModel";
        let response = self.cli.call(BEDROCK, op, json!({ "modelIdentifier": model_id })).await?;
        take_field(response, op, "modelDetails")
    }
}

/// [`BedrockAgentApi`] over the AWS CLI
pub struct CliBedrockAgent {
    cli: Arc<AwsCli>,
}

impl CliBedrockAgent {
    pub fn new(cli: Arc<AwsCli>) -> Self {
        Self { cli }
    }

    async fn call(&self, operation: &str, input: Value) -> AiOpsResult<Value> {
        self.cli.call(BEDROCK_AGENT, operation, input).await
    }
}

#[async_trait]
impl BedrockAgentApi for CliBedrockAgent {
    async fn list_agents(&self) -> AiOpsResult<Vec<AgentSummary>> {
        let op = "ListAgents";
        take_list(self.call(op, json!({})).await?, op, "agentSummaries")
    }

    async fn get_agent(&self, agent_id: &str) -> AiOpsResult<Agent> {
        let op = "GetAgent";
        take_field(self.call(op, json!({ "agentId": agent_id })).await?, op, "agent")
    }

    async fn create_agent(&self, request: &CreateAgentRequest) -> AiOpsResult<Agent> {
        let op = "CreateAgent";
        take_field(self.call(op, to_input(request)?).await?, op, "agent")
    }

    async fn update_agent(&self, request: &UpdateAgentRequest) -> AiOpsResult<Agent> {
        let op = "UpdateAgent";
        take_field(self.call(op, to_input(request)?).await?, op, "agent")
    }

    async fn prepare_agent(&self, agent_id: &str) -> AiOpsResult<()> {
        self.call("PrepareAgent", json!({ "agentId": agent_id })).await?;
        Ok(())
    }

    async fn delete_agent(&self, agent_id: &str) -> AiOpsResult<()> {
        self.call("DeleteAgent", json!({ "agentId": agent_id })).await?;
        Ok(())
    }

    async fn list_agent_aliases(&self, agent_id: &str) -> AiOpsResult<Vec<AgentAliasSummary>> {
        let op = "ListAgentAliases";
        take_list(self.call(op, json!({ "agentId": agent_id })).await?, op, "agentAliasSummaries")
    }

    async fn get_agent_alias(&self, agent_id: &str, alias_id: &str) -> AiOpsResult<AgentAlias> {
        let op = "GetAgentAlias";
        let input = json!({ "agentId": agent_id, "agentAliasId": alias_id });
        take_field(self.call(op, input).await?, op, "agentAlias")
    }

    async fn create_agent_alias(&self, request: &CreateAgentAliasRequest) -> AiOpsResult<AgentAlias> {
        let op = "CreateAgentAlias";
        take_field(self.call(op, to_input(request)?).await?, op, "agentAlias")
    }

    async fn update_agent_alias(&self, request: &UpdateAgentAliasRequest) -> AiOpsResult<AgentAlias> {
        let op = "UpdateAgentAlias";
        take_field(self.call(op, to_input(request)?).await?, op, "agentAlias")
    }

    async fn delete_agent_alias(&self, agent_id: &str, alias_id: &str) -> AiOpsResult<()> {
        let input = json!({ "agentId": agent_id, "agentAliasId": alias_id });
        self.call("DeleteAgentAlias", input).await?;
        Ok(())
    }

    async fn list_agent_action_groups(&self, agent_id: &str, agent_version: &str) -> AiOpsResult<Vec<ActionGroupSummary>> {
        let op = "ListAgentActionGroups";
        let input = json!({ "agentId": agent_id, "agentVersion": agent_version });
        take_list(self.call(op, input).await?, op, "actionGroupSummaries")
    }

    async fn get_agent_action_group(
        &self,
        agent_id: &str,
        agent_version: &str,
        action_group_id: &str,
    ) -> AiOpsResult<ActionGroup> {
        let op = "GetAgentActionGroup";
        let input = json!({
            "agentId": agent_id,
            "agentVersion": agent_version,
            "actionGroupId": action_group_id
        });
        take_field(self.call(op, input).await?, op, "agentActionGroup")
    }

    async fn create_agent_action_group(&self, request: &CreateActionGroupRequest) -> AiOpsResult<ActionGroup> {
        let op = "CreateAgentActionGroup";
        take_field(self.call(op, to_input(request)?).await?, op, "agentActionGroup")
    }

    async fn update_agent_action_group(&self, request: &UpdateActionGroupRequest) -> AiOpsResult<ActionGroup> {
        let op = "UpdateAgentActionGroup";
        take_field(self.call(op, to_input(request)?).await?, op, "agentActionGroup")
    }

    async fn delete_agent_action_group(
        &self,
        agent_id: &str,
        agent_version: &str,
        action_group_id: &str,
    ) -> AiOpsResult<()> {
        let input = json!({
            "agentId": agent_id,
            "agentVersion": agent_version,
            "actionGroupId": action_group_id
        });
        self.call("DeleteAgentActionGroup", input).await?;
        Ok(())
    }
}
