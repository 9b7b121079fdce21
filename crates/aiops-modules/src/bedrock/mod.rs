//! Amazon Bedrock and Bedrock Agents

pub mod action_group;
pub mod agent;
pub mod alias;
pub mod api;
pub mod foundation_model;
pub mod types;

pub use action_group::{
    create_action_group, delete_action_group, find_action_group, update_action_group, ActionGroupSettings,
};
pub use agent::{
    create_agent, delete_agent, find_agent, find_agent_by_name, prepare_agent, update_agent, wait_for_agent_status,
    AgentSettings,
};
pub use alias::{create_alias, delete_alias, find_alias, update_alias, wait_for_alias_status, AliasSettings};
pub use api::{BedrockAgentApi, BedrockAgentRuntimeApi, BedrockApi, BedrockRuntimeApi, CliBedrock, CliBedrockAgent};
pub use foundation_model::{get_model_details, list_models_with_filters};
