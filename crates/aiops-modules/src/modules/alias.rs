//! Agent alias modules

use aiops_core::{camel_dict_to_snake_dict, AiOpsResult, ModuleOutput, ModuleSpec, ParamKind, ParamSpec};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{json, Value};

use super::{agent_named, state_param, wait_timeout_param};
use crate::aws::MAX_CONCURRENT_CALLS;
use crate::bedrock::alias::{create_alias, delete_alias, find_alias, update_alias, AliasSettings};
use crate::bedrock::types::AgentAlias;
use crate::module::{Module, ModuleContext};
use crate::outcome::Outcome;

/// Alias tags are user data; their keys are returned as given
fn alias_output(alias: &AgentAlias) -> AiOpsResult<Value> {
    Ok(camel_dict_to_snake_dict(&serde_json::to_value(alias)?, &["tags"]))
}

// ============================================================================
// bedrock_agent_alias
// ============================================================================

pub struct BedrockAgentAliasModule {
    spec: ModuleSpec,
}

impl BedrockAgentAliasModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("bedrock_agent_alias", "Create, update and delete Amazon Bedrock agent aliases")
            .params([
                state_param(),
                ParamSpec::str("agent_name").required(),
                ParamSpec::str("alias_name").required(),
                ParamSpec::str("description"),
                ParamSpec::list("routing_configuration", ParamKind::Dict)
                    .describe("Agent versions the alias routes to: agent_version, provisioned_throughput"),
                ParamSpec::dict("tags"),
                wait_timeout_param(),
            ])
            .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockAgentAliasModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockAgentAliasModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let settings: AliasSettings = ctx.params.parse()?;
        let client = ctx.clients.bedrock_agent().await?;
        let api = client.as_ref();
        let waiter = ctx.waiter();
        let check_mode = ctx.check_mode();
        let present = ctx.state_present();

        let agent = agent_named(api, ctx.required_str("agent_name")?).await?;
        let agent_id = agent.agent_id.as_str();
        let found = find_alias(api, agent_id, &settings.alias_name).await?;

        let outcome = match (present, found) {
            (true, Some(summary)) => {
                let existing = api.get_agent_alias(agent_id, &summary.agent_alias_id).await?;
                update_alias(api, &settings, &existing, &waiter, check_mode).await?
            }
            (true, None) => create_alias(api, agent_id, &settings, &waiter, check_mode).await?,
            (false, Some(summary)) => delete_alias(api, agent_id, &summary, &waiter, check_mode).await?,
            (false, None) => Outcome::unchanged(
                None,
                format!("Agent alias {} does not exist.", settings.alias_name),
            ),
        };

        let agent_alias = match (&outcome.id, present) {
            (Some(id), true) => alias_output(&api.get_agent_alias(agent_id, id).await?)?,
            _ => json!({}),
        };

        Ok(ModuleOutput::new(outcome.changed)
            .with_msg(outcome.msg)
            .with("agent_alias", agent_alias))
    }
}

// ============================================================================
// bedrock_agent_alias_info
// ============================================================================

pub struct BedrockAgentAliasInfoModule {
    spec: ModuleSpec,
}

impl BedrockAgentAliasInfoModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("bedrock_agent_alias_info", "Gather information about Amazon Bedrock agent aliases")
            .params([
                ParamSpec::str("agent_name").required(),
                ParamSpec::str("alias_name").describe("Only describe this alias"),
            ])
            .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockAgentAliasInfoModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockAgentAliasInfoModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.bedrock_agent().await?;
        let api = client.as_ref();

        let agent = agent_named(api, ctx.required_str("agent_name")?).await?;
        let agent_id = agent.agent_id.as_str();
        let alias_name = ctx.params.str("alias_name");

        let summaries = api.list_agent_aliases(agent_id).await?;
        let wanted = summaries
            .iter()
            .filter(|alias| alias_name.map_or(true, |name| alias.agent_alias_name == name));
        let requests: Vec<_> = wanted.map(|alias| api.get_agent_alias(agent_id, &alias.agent_alias_id)).collect();
        let aliases: Vec<AgentAlias> = stream::iter(requests)
            .buffered(MAX_CONCURRENT_CALLS)
            .try_collect()
            .await?;

        let rendered = aliases.iter().map(alias_output).collect::<AiOpsResult<Vec<_>>>()?;
        Ok(ModuleOutput::unchanged().with("agent_aliases", Value::Array(rendered)))
    }
}
