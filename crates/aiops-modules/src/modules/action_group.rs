//! Agent action group modules
//!
//! Action groups are managed on the DRAFT version; prepare the agent
//! afterwards to publish them.

use aiops_core::{AiOpsResult, ModuleOutput, ModuleSpec, ParamSpec};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{json, Value};

use super::{agent_named, snake, state_param};
use crate::bedrock::action_group::{
    create_action_group, delete_action_group, find_action_group, update_action_group, ActionGroupSettings,
};
use crate::aws::MAX_CONCURRENT_CALLS;
use crate::bedrock::types::DRAFT_VERSION;
use crate::module::{Module, ModuleContext};
use crate::outcome::Outcome;

// ============================================================================
// bedrock_agent_action_group
// ============================================================================

pub struct BedrockAgentActionGroupModule {
    spec: ModuleSpec,
}

impl BedrockAgentActionGroupModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new(
            "bedrock_agent_action_group",
            "Create, update and delete action groups of an Amazon Bedrock agent",
        )
        .params([
            state_param(),
            ParamSpec::str("agent_name").required(),
            ParamSpec::str("action_group_name").required(),
            ParamSpec::str("new_action_group_name"),
            ParamSpec::str("action_group_state")
                .choices(&["ENABLED", "DISABLED"])
                .default_value(json!("ENABLED")),
            ParamSpec::str("description"),
            ParamSpec::str("lambda_arn").describe("Lambda function that fulfils the actions"),
            ParamSpec::str("api_schema").describe("OpenAPI document as JSON or YAML text"),
        ])
        .with_aws_connection()
        .required_if("state", json!("present"), &["lambda_arn", "api_schema"]);
        Self { spec }
    }
}

impl Default for BedrockAgentActionGroupModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockAgentActionGroupModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let settings: ActionGroupSettings = ctx.params.parse()?;
        let client = ctx.clients.bedrock_agent().await?;
        let api = client.as_ref();
        let check_mode = ctx.check_mode();
        let present = ctx.state_present();

        let agent = agent_named(api, ctx.required_str("agent_name")?).await?;
        let agent_id = agent.agent_id.as_str();
        let existing = find_action_group(api, agent_id, &settings.action_group_name).await?;

        let outcome = match (present, existing) {
            (true, Some(group)) => update_action_group(api, &settings, &group, check_mode).await?,
            (true, None) => create_action_group(api, agent_id, &settings, check_mode).await?,
            (false, Some(group)) => delete_action_group(api, agent_id, &group, check_mode).await?,
            (false, None) => Outcome::unchanged(
                None,
                format!("Action group {} does not exist.", settings.action_group_name),
            ),
        };

        let action_group = match (&outcome.id, present) {
            (Some(id), true) => snake(&api.get_agent_action_group(agent_id, DRAFT_VERSION, id).await?)?,
            _ => json!({}),
        };

        Ok(ModuleOutput::new(outcome.changed)
            .with_msg(outcome.msg)
            .with("action_group", action_group))
    }
}

// ============================================================================
// bedrock_agent_action_group_info
// ============================================================================

pub struct BedrockAgentActionGroupInfoModule {
    spec: ModuleSpec,
}

impl BedrockAgentActionGroupInfoModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new(
            "bedrock_agent_action_group_info",
            "Gather information about the action groups of an Amazon Bedrock agent",
        )
        .params([
            ParamSpec::str("agent_name").required(),
            ParamSpec::str("agent_version").default_value(json!(DRAFT_VERSION)),
            ParamSpec::str("action_group_name").describe("Only describe this action group"),
        ])
        .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockAgentActionGroupInfoModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockAgentActionGroupInfoModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.bedrock_agent().await?;
        let api = client.as_ref();

        let agent = agent_named(api, ctx.required_str("agent_name")?).await?;
        let agent_id = agent.agent_id.as_str();
        let version = ctx.params.str("agent_version").unwrap_or(DRAFT_VERSION);
        let name = ctx.params.str("action_group_name");

        let summaries = api.list_agent_action_groups(agent_id, version).await?;
        let requests: Vec<_> = summaries
            .iter()
            .filter(|group| name.map_or(true, |name| group.action_group_name == name))
            .map(|group| api.get_agent_action_group(agent_id, version, &group.action_group_id))
            .collect();
        let groups: Vec<_> = stream::iter(requests)
        .buffered(MAX_CONCURRENT_CALLS)
        .try_collect()
        .await?;

        let rendered = groups.iter().map(snake).collect::<AiOpsResult<Vec<Value>>>()?;
        Ok(ModuleOutput::unchanged().with("action_groups", Value::Array(rendered)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::run_with;
    use crate::testing::{FakeBedrockAgent, FakeClients};
    use std::sync::Arc;

    const SCHEMA: &str = "openapi: 3.0.0\ninfo:\n  title: Orders\n  version: '1.0'\npaths: {}\n";

    fn clients() -> FakeClients {
        FakeClients {
            bedrock_agent: Arc::new(FakeBedrockAgent::with_agent("A1", "support")),
            ..Default::default()
        }
    }

    fn group_args() -> Value {
        json!({
            "agent_name": "support",
            "action_group_name": "orders",
            "lambda_arn": "arn:aws:lambda:us-east-1:123456789012:function:orders",
            "api_schema": SCHEMA
        })
    }

    #[tokio::test]
    async fn test_create_update_and_list() {
        let clients = clients();
        let module = BedrockAgentActionGroupModule::new();

        let created = run_with(&module, &clients, group_args()).await.unwrap();
        assert!(created.changed);
        let group = created.get("action_group").unwrap();
        assert_eq!(group["action_group_name"], json!("orders"));
        assert_eq!(group["action_group_state"], json!("ENABLED"));

        assert!(!run_with(&module, &clients, group_args()).await.unwrap().changed);

        let mut disable = group_args();
        disable["action_group_state"] = json!("DISABLED");
        let updated = run_with(&module, &clients, disable).await.unwrap();
        assert!(updated.changed);
        assert_eq!(updated.msg.as_deref(), Some("Action group orders updated successfully."));

        let info = run_with(
            &BedrockAgentActionGroupInfoModule::new(),
            &clients,
            json!({"agent_name": "support"}),
        )
        .await
        .unwrap();
        let groups = info.get("action_groups").unwrap().as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["action_group_state"], json!("DISABLED"));
    }

    #[tokio::test]
    async fn test_present_requires_lambda_and_schema() {
        let err = run_with(
            &BedrockAgentActionGroupModule::new(),
            &clients(),
            json!({"agent_name": "support", "action_group_name": "orders"}),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "state is present but all of the following are missing: lambda_arn, api_schema"
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let clients = clients();
        let module = BedrockAgentActionGroupModule::new();
        run_with(&module, &clients, group_args()).await.unwrap();

        let absent = json!({"agent_name": "support", "action_group_name": "orders", "state": "absent"});
        let deleted = run_with(&module, &clients, absent.clone()).await.unwrap();
        assert!(deleted.changed);
        assert_eq!(deleted.get("action_group"), Some(&json!({})));

        let again = run_with(&module, &clients, absent).await.unwrap();
        assert!(!again.changed);
        assert_eq!(again.msg.as_deref(), Some("Action group orders does not exist."));
    }

    #[tokio::test]
    async fn test_info_unknown_agent() {
        let err = run_with(
            &BedrockAgentActionGroupInfoModule::new(),
            &clients(),
            json!({"agent_name": "nobody"}),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Agent with name 'nobody' not found.");
    }
}
