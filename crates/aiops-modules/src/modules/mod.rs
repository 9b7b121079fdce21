//! Built-in modules
//!
//! ## Bedrock Agents
//!
//! - `bedrock_agent` - Create, update and delete agents
//! - `bedrock_agent_info` - List agents with optional aliases and action groups
//! - `bedrock_agent_alias` - Manage agent aliases
//! - `bedrock_agent_alias_info` - Describe agent aliases
//! - `bedrock_agent_action_group` - Manage DRAFT action groups
//! - `bedrock_agent_action_group_info` - Describe action groups
//!
//! ## Bedrock
//!
//! - `bedrock_foundation_models_info` - Query the foundation model catalogue
//! - `bedrock_model_inference` - Run a prompt against a model
//! - `bedrock_invoke_agent` - Send input to a deployed agent
//!
//! ## DevOps Guru
//!
//! - `devopsguru_resource_collection` - Manage analysed resources and notification channels
//! - `devopsguru_resource_collection_info` - Read the resource collection
//! - `devopsguru_insight_info` - Describe or list insights with anomalies and recommendations

pub mod action_group;
pub mod agent;
pub mod alias;
pub mod devopsguru;
pub mod foundation_models;
pub mod runtime;

use aiops_core::{camel_dict_to_snake_dict, AiOpsError, AiOpsResult, ParamSpec};
use serde::Serialize;
use serde_json::{json, Value};

use crate::aws::waiter::DEFAULT_WAIT_TIMEOUT_SECS;
use crate::bedrock::agent::find_agent_by_name;
use crate::bedrock::api::BedrockAgentApi;
use crate::bedrock::types::Agent;
use crate::module::Module;

pub use action_group::{BedrockAgentActionGroupInfoModule, BedrockAgentActionGroupModule};
pub use agent::{BedrockAgentInfoModule, BedrockAgentModule};
pub use alias::{BedrockAgentAliasInfoModule, BedrockAgentAliasModule};
pub use devopsguru::{DevOpsGuruInsightInfoModule, DevOpsGuruResourceCollectionInfoModule, DevOpsGuruResourceCollectionModule};
pub use foundation_models::BedrockFoundationModelsInfoModule;
pub use runtime::{BedrockInvokeAgentModule, BedrockModelInferenceModule};

/// Every built-in module
pub fn all() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(BedrockAgentModule::new()),
        Box::new(BedrockAgentInfoModule::new()),
        Box::new(BedrockAgentAliasModule::new()),
        Box::new(BedrockAgentAliasInfoModule::new()),
        Box::new(BedrockAgentActionGroupModule::new()),
        Box::new(BedrockAgentActionGroupInfoModule::new()),
        Box::new(BedrockFoundationModelsInfoModule::new()),
        Box::new(BedrockModelInferenceModule::new()),
        Box::new(BedrockInvokeAgentModule::new()),
        Box::new(DevOpsGuruResourceCollectionModule::new()),
        Box::new(DevOpsGuruResourceCollectionInfoModule::new()),
        Box::new(DevOpsGuruInsightInfoModule::new()),
    ]
}

fn state_param() -> ParamSpec {
    ParamSpec::str("state")
        .choices(&["present", "absent"])
        .default_value(json!("present"))
}

fn wait_timeout_param() -> ParamSpec {
    ParamSpec::int("wait_timeout")
        .default_value(json!(DEFAULT_WAIT_TIMEOUT_SECS))
        .describe("Seconds to wait for the resource to settle")
}

/// Resource rendered with snake_case keys
fn snake<T: Serialize>(resource: &T) -> AiOpsResult<Value> {
    Ok(camel_dict_to_snake_dict(&serde_json::to_value(resource)?, &[]))
}

/// Agent modules address agents by name
async fn agent_named(api: &dyn BedrockAgentApi, agent_name: &str) -> AiOpsResult<Agent> {
    find_agent_by_name(api, agent_name)
        .await?
        .ok_or_else(|| AiOpsError::not_found(format!("Agent with name '{}' not found.", agent_name)))
}

/// Validate `args` against the module's spec and run it on fakes
#[cfg(test)]
pub(crate) async fn run_with(
    module: &dyn Module,
    clients: &crate::testing::FakeClients,
    args: Value,
) -> AiOpsResult<aiops_core::ModuleOutput> {
    let params = module.spec().validate(&args)?;
    let ctx = crate::module::ModuleContext::new(params, std::sync::Arc::new(clients.clone()));
    module.run(&ctx).await
}
