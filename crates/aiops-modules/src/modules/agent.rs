//! Bedrock agent modules
//!
//! - `bedrock_agent` - Create, update and delete agents
//! - `bedrock_agent_info` - Describe agents

use aiops_core::{AiOpsResult, ModuleOutput, ModuleSpec, ParamSpec};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{json, Value};
use tracing::debug;

use super::{snake, state_param, wait_timeout_param};
use crate::aws::MAX_CONCURRENT_CALLS;
use crate::bedrock::agent::{create_agent, delete_agent, find_agent, find_agent_by_name, update_agent, AgentSettings};
use crate::bedrock::api::BedrockAgentApi;
use crate::bedrock::types::{Agent, DRAFT_VERSION};
use crate::module::{Module, ModuleContext};
use crate::outcome::Outcome;

// ============================================================================
// bedrock_agent
// ============================================================================

/// Manage an agent, addressed by name
pub struct BedrockAgentModule {
    spec: ModuleSpec,
}

impl BedrockAgentModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("bedrock_agent", "Create, update, prepare and delete Amazon Bedrock agents")
            .params([
                state_param(),
                ParamSpec::str("agent_name").required().describe("Name of the agent"),
                ParamSpec::str("new_agent_name").describe("Rename an existing agent"),
                ParamSpec::str("foundation_model").describe("Model the agent orchestrates with"),
                ParamSpec::str("instruction").describe("Instructions that tell the agent what to do"),
                ParamSpec::str("agent_resource_role_arn")
                    .aliases(&["role_arn"])
                    .describe("IAM role the agent assumes"),
                ParamSpec::str("orchestration_type")
                    .choices(&["DEFAULT", "CUSTOM_ORCHESTRATION"])
                    .default_value(json!("DEFAULT")),
                ParamSpec::str("description"),
                ParamSpec::int("idle_session_ttl_in_seconds"),
                ParamSpec::str("agent_collaboration").choices(&["SUPERVISOR", "SUPERVISOR_ROUTER", "DISABLED"]),
                ParamSpec::dict("prompt_override_configuration"),
                ParamSpec::dict("tags"),
                wait_timeout_param(),
            ])
            .with_aws_connection()
            .required_if(
                "state",
                json!("present"),
                &["foundation_model", "instruction", "agent_resource_role_arn"],
            );
        Self { spec }
    }
}

impl Default for BedrockAgentModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockAgentModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let settings: AgentSettings = ctx.params.parse()?;
        let client = ctx.clients.bedrock_agent().await?;
        let api = client.as_ref();
        let waiter = ctx.waiter();
        let check_mode = ctx.check_mode();
        let present = ctx.state_present();

        let existing = find_agent_by_name(api, &settings.agent_name).await?;
        debug!(agent_name = %settings.agent_name, exists = existing.is_some(), present, "Reconciling agent");

        let outcome = match (present, existing) {
            (true, Some(agent)) => update_agent(api, &settings, &agent, &waiter, check_mode).await?,
            (true, None) => create_agent(api, &settings, &waiter, check_mode).await?,
            (false, Some(agent)) => delete_agent(api, &agent, &waiter, check_mode).await?,
            (false, None) => Outcome::unchanged(None, format!("Agent {} does not exist.", settings.agent_name)),
        };

        let agent = match (&outcome.id, present) {
            (Some(id), true) => snake(&api.get_agent(id).await?)?,
            _ => json!({}),
        };

        Ok(ModuleOutput::new(outcome.changed)
            .with_msg(outcome.msg)
            .with("agent", agent))
    }
}

// ============================================================================
// bedrock_agent_info
// ============================================================================

/// Describe one agent by name, or every agent in the account
pub struct BedrockAgentInfoModule {
    spec: ModuleSpec,
}

impl BedrockAgentInfoModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("bedrock_agent_info", "Gather information about Amazon Bedrock agents")
            .params([
                ParamSpec::str("agent_name").describe("Only describe this agent"),
                ParamSpec::bool("list_action_groups")
                    .default_value(json!(false))
                    .describe("Include the DRAFT action groups of each agent"),
                ParamSpec::bool("list_aliases")
                    .default_value(json!(false))
                    .describe("Include the aliases of each agent"),
            ])
            .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockAgentInfoModule {
    fn default() -> Self {
        Self::new()
    }
}

async fn describe_agent(
    api: &dyn BedrockAgentApi,
    agent: &Agent,
    action_groups: bool,
    aliases: bool,
) -> AiOpsResult<Value> {
    let mut info = serde_json::to_value(agent)?;
    if action_groups {
        let groups = api.list_agent_action_groups(&agent.agent_id, DRAFT_VERSION).await?;
        info["actionGroups"] = serde_json::to_value(groups)?;
    }
    if aliases {
        let aliases = api.list_agent_aliases(&agent.agent_id).await?;
        info["aliases"] = serde_json::to_value(aliases)?;
    }
    snake(&info)
}

#[async_trait]
impl Module for BedrockAgentInfoModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.bedrock_agent().await?;
        let api = client.as_ref();
        let action_groups = ctx.params.bool("list_action_groups");
        let aliases = ctx.params.bool("list_aliases");

        let agents = find_agent(api, ctx.params.str("agent_name")).await?;
        let requests: Vec<_> = agents
            .iter()
            .map(|agent| describe_agent(api, agent, action_groups, aliases))
            .collect();
        let described: Vec<Value> = stream::iter(requests)
        .buffered(MAX_CONCURRENT_CALLS)
        .try_collect()
        .await?;

        Ok(ModuleOutput::unchanged().with("agents", Value::Array(described)))
    }
}
