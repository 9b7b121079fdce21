//! Bedrock agent reconciliation

use aiops_core::{snake_dict_to_camel_dict, AiOpsError, AiOpsResult};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::api::BedrockAgentApi;
use super::types::{Agent, CreateAgentRequest, UpdateAgentRequest};
use crate::aws::waiter::{Waiter, DELETED};
use crate::aws::MAX_CONCURRENT_CALLS;
use crate::outcome::Outcome;

pub const PREPARED: &str = "PREPARED";
pub const NOT_PREPARED: &str = "NOT_PREPARED";
pub const DELETING: &str = "DELETING";

/// Desired agent definition, as given to the `bedrock_agent` module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentSettings {
    pub agent_name: String,
    pub new_agent_name: Option<String>,
    pub foundation_model: Option<String>,
    pub instruction: Option<String>,
    pub agent_resource_role_arn: Option<String>,
    pub orchestration_type: Option<String>,
    pub agent_collaboration: Option<String>,
    pub description: Option<String>,
    pub idle_session_ttl_in_seconds: Option<i64>,
    /// snake_case keys
    pub prompt_override_configuration: Option<Value>,
    pub tags: Option<Map<String, Value>>,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> AiOpsResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| AiOpsError::validation(format!("missing required arguments: {}", name)))
}

/// Field differs when a desired value is given and the live one is not equal
fn differs<T: PartialEq>(desired: &Option<T>, live: &Option<T>) -> bool {
    desired.is_some() && desired != live
}

pub async fn wait_for_agent_status(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    target: &str,
    waiter: &Waiter,
) -> AiOpsResult<()> {
    let resource = format!("agent {}", agent_id);
    waiter
        .wait_for(&resource, target, || async move {
            let agent = api.get_agent(agent_id).await?;
            Ok::<_, AiOpsError>(agent.agent_status)
        })
        .await
}

/// Prepare the DRAFT version and wait until it is usable
pub async fn prepare_agent(api: &dyn BedrockAgentApi, agent_id: &str, waiter: &Waiter) -> AiOpsResult<()> {
    api.prepare_agent(agent_id).await?;
    wait_for_agent_status(api, agent_id, PREPARED, waiter).await
}

/// Agents with full details; all of them when `name` is `None`
pub async fn find_agent(api: &dyn BedrockAgentApi, name: Option<&str>) -> AiOpsResult<Vec<Agent>> {
    let summaries = api.list_agents().await?;

    let ids: Vec<&str> = match name {
        Some(name) => summaries
            .iter()
            .find(|s| s.agent_name == name)
            .map(|s| s.agent_id.as_str())
            .into_iter()
            .collect(),
        None => summaries.iter().map(|s| s.agent_id.as_str()).collect(),
    };

    let lookups: Vec<_> = ids.into_iter().map(|id| get_agent_if_exists(api, id)).collect();
    let agents: Vec<Option<Agent>> = stream::iter(lookups)
        .buffered(MAX_CONCURRENT_CALLS)
        .try_collect()
        .await?;
    Ok(agents.into_iter().flatten().collect())
}

pub async fn find_agent_by_name(api: &dyn BedrockAgentApi, name: &str) -> AiOpsResult<Option<Agent>> {
    Ok(find_agent(api, Some(name)).await?.into_iter().next())
}

async fn get_agent_if_exists(api: &dyn BedrockAgentApi, agent_id: &str) -> AiOpsResult<Option<Agent>> {
    match api.get_agent(agent_id).await {
        Ok(agent) => Ok(Some(agent)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create the agent, wait for it to settle, then prepare it
pub async fn create_agent(
    api: &dyn BedrockAgentApi,
    settings: &AgentSettings,
    waiter: &Waiter,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    if check_mode {
        return Ok(Outcome::changed(
            None,
            format!("Check mode: would have created agent {}.", settings.agent_name),
        ));
    }

    let request = CreateAgentRequest {
        agent_name: settings.agent_name.clone(),
        foundation_model: required(&settings.foundation_model, "foundation_model")?.to_string(),
        instruction: required(&settings.instruction, "instruction")?.to_string(),
        agent_resource_role_arn: required(&settings.agent_resource_role_arn, "agent_resource_role_arn")?.to_string(),
        orchestration_type: settings.orchestration_type.clone(),
        description: settings.description.clone(),
        idle_session_ttl_in_seconds: settings.idle_session_ttl_in_seconds,
        agent_collaboration: settings.agent_collaboration.clone(),
        prompt_override_configuration: settings
            .prompt_override_configuration
            .as_ref()
            .map(|c| snake_dict_to_camel_dict(c, false)),
        tags: settings.tags.clone(),
    };

    let agent = api.create_agent(&request).await?;
    info!(agent_id = %agent.agent_id, agent_name = %agent.agent_name, "Created agent");

    wait_for_agent_status(api, &agent.agent_id, NOT_PREPARED, waiter).await?;
    prepare_agent(api, &agent.agent_id, waiter).await?;

    Ok(Outcome::changed(
        Some(agent.agent_id),
        format!("Agent {} created successfully.", settings.agent_name),
    ))
}

/// Build the UpdateAgent request, or `None` when the live agent matches
pub fn plan_agent_update(settings: &AgentSettings, existing: &Agent) -> Option<UpdateAgentRequest> {
    let new_name = settings
        .new_agent_name
        .as_ref()
        .filter(|name| !name.is_empty() && **name != existing.agent_name);
    let prompt_config = settings
        .prompt_override_configuration
        .as_ref()
        .map(|c| snake_dict_to_camel_dict(c, false));

    let needs_update = new_name.is_some()
        || differs(&settings.foundation_model, &existing.foundation_model)
        || differs(&settings.instruction, &existing.instruction)
        || differs(&settings.agent_resource_role_arn, &existing.agent_resource_role_arn)
        || differs(&settings.orchestration_type, &existing.orchestration_type)
        || differs(&settings.agent_collaboration, &existing.agent_collaboration)
        || differs(&settings.description, &existing.description)
        || differs(&settings.idle_session_ttl_in_seconds, &existing.idle_session_ttl_in_seconds)
        || differs(&prompt_config, &existing.prompt_override_configuration);

    if !needs_update {
        return None;
    }

    let pick = |desired: &Option<String>, live: &Option<String>| desired.clone().or_else(|| live.clone());

    Some(UpdateAgentRequest {
        agent_id: existing.agent_id.clone(),
        agent_name: new_name.cloned().unwrap_or_else(|| existing.agent_name.clone()),
        foundation_model: pick(&settings.foundation_model, &existing.foundation_model).unwrap_or_default(),
        agent_resource_role_arn: pick(&settings.agent_resource_role_arn, &existing.agent_resource_role_arn)
            .unwrap_or_default(),
        instruction: pick(&settings.instruction, &existing.instruction),
        orchestration_type: pick(&settings.orchestration_type, &existing.orchestration_type),
        description: pick(&settings.description, &existing.description),
        idle_session_ttl_in_seconds: settings
            .idle_session_ttl_in_seconds
            .or(existing.idle_session_ttl_in_seconds),
        agent_collaboration: pick(&settings.agent_collaboration, &existing.agent_collaboration),
        prompt_override_configuration: prompt_config.or_else(|| existing.prompt_override_configuration.clone()),
    })
}

/// Update the agent when it drifted from `settings`, then re-prepare it
pub async fn update_agent(
    api: &dyn BedrockAgentApi,
    settings: &AgentSettings,
    existing: &Agent,
    waiter: &Waiter,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    let agent_id = Some(existing.agent_id.clone());

    let Some(request) = plan_agent_update(settings, existing) else {
        return Ok(Outcome::unchanged(agent_id, "No updates needed."));
    };

    if check_mode {
        return Ok(Outcome::changed(
            agent_id,
            format!("Check mode: would have updated agent {}.", existing.agent_name),
        ));
    }

    api.update_agent(&request).await?;
    info!(agent_id = %existing.agent_id, "Updated agent");
    prepare_agent(api, &existing.agent_id, waiter).await?;

    Ok(Outcome::changed(
        agent_id,
        format!("Agent {} updated successfully.", existing.agent_name),
    ))
}

pub async fn delete_agent(
    api: &dyn BedrockAgentApi,
    existing: &Agent,
    waiter: &Waiter,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    if check_mode {
        return Ok(Outcome::changed(
            None,
            format!("Check mode: would have deleted agent '{}'.", existing.agent_name),
        ));
    }

    if existing.agent_status == DELETING {
        return Ok(Outcome::unchanged(
            None,
            format!("Agent {} in DELETING state.", existing.agent_name),
        ));
    }

    api.delete_agent(&existing.agent_id).await?;
    info!(agent_id = %existing.agent_id, "Deleting agent");
    wait_for_agent_status(api, &existing.agent_id, DELETED, waiter).await?;

    Ok(Outcome::changed(
        None,
        format!("Agent {} deleted successfully.", existing.agent_name),
    ))
}
