//! Agent alias reconciliation

use aiops_core::{AiOpsError, AiOpsResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::info;

use super::agent::PREPARED;
use super::api::BedrockAgentApi;
use super::types::{AgentAlias, AgentAliasSummary, AliasRouting, CreateAgentAliasRequest, UpdateAgentAliasRequest};
use crate::aws::waiter::{Waiter, DELETED};
use crate::outcome::Outcome;

/// Desired alias, as given to the `bedrock_agent_alias` module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasSettings {
    pub alias_name: String,
    pub description: Option<String>,
    pub routing_configuration: Option<Vec<AliasRouting>>,
    pub tags: Option<Map<String, Value>>,
}

pub async fn wait_for_alias_status(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    alias_id: &str,
    target: &str,
    waiter: &Waiter,
) -> AiOpsResult<()> {
    let resource = format!("alias {} (agent {})", alias_id, agent_id);
    waiter
        .wait_for(&resource, target, || async move {
            let alias = api.get_agent_alias(agent_id, alias_id).await?;
            Ok::<_, AiOpsError>(alias.agent_alias_status)
        })
        .await
}

pub async fn find_alias(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    alias_name: &str,
) -> AiOpsResult<Option<AgentAliasSummary>> {
    let aliases = api.list_agent_aliases(agent_id).await?;
    Ok(aliases.into_iter().find(|alias| alias.agent_alias_name == alias_name))
}

/// Agent versions an alias routes to, order ignored
fn routed_versions(routing: &[AliasRouting]) -> BTreeSet<&str> {
    routing.iter().filter_map(|r| r.agent_version.as_deref()).collect()
}

pub async fn create_alias(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    settings: &AliasSettings,
    waiter: &Waiter,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    if check_mode {
        return Ok(Outcome::changed(
            None,
            format!("Check mode: would have created agent alias {}.", settings.alias_name),
        ));
    }

    let request = CreateAgentAliasRequest {
        agent_id: agent_id.to_string(),
        agent_alias_name: settings.alias_name.clone(),
        description: settings.description.clone().filter(|d| !d.is_empty()),
        routing_configuration: settings.routing_configuration.clone().unwrap_or_default(),
        tags: settings.tags.clone().filter(|t| !t.is_empty()),
    };

    let alias = api.create_agent_alias(&request).await?;
    info!(agent_id, alias_id = %alias.agent_alias_id, "Created agent alias");
    wait_for_alias_status(api, agent_id, &alias.agent_alias_id, PREPARED, waiter).await?;

    Ok(Outcome::changed(
        Some(alias.agent_alias_id),
        format!("Agent alias {} created successfully.", settings.alias_name),
    ))
}

/// Build the UpdateAgentAlias request, or `None` when the alias matches
pub fn plan_alias_update(settings: &AliasSettings, existing: &AgentAlias) -> Option<UpdateAgentAliasRequest> {
    let description_differs = settings
        .description
        .as_ref()
        .is_some_and(|d| existing.description.as_ref() != Some(d));
    let routing_differs = settings.routing_configuration.as_ref().is_some_and(|routing| {
        !routing.is_empty() && routed_versions(routing) != routed_versions(&existing.routing_configuration)
    });

    if !description_differs && !routing_differs {
        return None;
    }

    Some(UpdateAgentAliasRequest {
        agent_id: existing.agent_id.clone(),
        agent_alias_id: existing.agent_alias_id.clone(),
        agent_alias_name: existing.agent_alias_name.clone(),
        description: settings.description.clone().or_else(|| existing.description.clone()),
        routing_configuration: if routing_differs {
            settings.routing_configuration.clone().unwrap_or_default()
        } else {
            existing.routing_configuration.clone()
        },
    })
}

pub async fn update_alias(
    api: &dyn BedrockAgentApi,
    settings: &AliasSettings,
    existing: &AgentAlias,
    waiter: &Waiter,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    let alias_id = Some(existing.agent_alias_id.clone());

    let Some(request) = plan_alias_update(settings, existing) else {
        return Ok(Outcome::unchanged(alias_id, "No updates needed."));
    };

    if check_mode {
        return Ok(Outcome::changed(
            alias_id,
            format!("Check mode: would have updated agent alias {}.", existing.agent_alias_name),
        ));
    }

    api.update_agent_alias(&request).await?;
    info!(agent_id = %existing.agent_id, alias_id = %existing.agent_alias_id, "Updated agent alias");
    wait_for_alias_status(api, &existing.agent_id, &existing.agent_alias_id, PREPARED, waiter).await?;

    Ok(Outcome::changed(
        alias_id,
        format!("Agent alias {} updated successfully.", existing.agent_alias_name),
    ))
}

pub async fn delete_alias(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    existing: &AgentAliasSummary,
    waiter: &Waiter,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    if check_mode {
        return Ok(Outcome::changed(
            None,
            format!("Check mode: would have deleted agent alias '{}'.", existing.agent_alias_name),
        ));
    }

    api.delete_agent_alias(agent_id, &existing.agent_alias_id).await?;
    info!(agent_id, alias_id = %existing.agent_alias_id, "Deleting agent alias");
    wait_for_alias_status(api, agent_id, &existing.agent_alias_id, DELETED, waiter).await?;

    Ok(Outcome::changed(
        None,
        format!("Agent alias {} deleted successfully.", existing.agent_alias_name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBedrockAgent;

    fn routing(versions: &[&str]) -> Vec<AliasRouting> {
        versions
            .iter()
            .map(|v| AliasRouting {
                agent_version: Some(v.to_string()),
                provisioned_throughput: None,
            })
            .collect()
    }

    fn settings() -> AliasSettings {
        AliasSettings {
            alias_name: "live".into(),
            description: Some("Production traffic".into()),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_find_delete() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        let waiter = Waiter::default();

        let created = create_alias(&api, "A1", &settings(), &waiter, false).await.unwrap();
        assert!(created.changed);
        assert_eq!(created.msg, "Agent alias live created successfully.");

        let found = find_alias(&api, "A1", "live").await.unwrap().unwrap();
        assert_eq!(Some(found.agent_alias_id.clone()), created.id);

        let deleted = delete_alias(&api, "A1", &found, &waiter, false).await.unwrap();
        assert_eq!(deleted.msg, "Agent alias live deleted successfully.");
        assert!(find_alias(&api, "A1", "live").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_mode_messages() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        let waiter = Waiter::default();

        let created = create_alias(&api, "A1", &settings(), &waiter, true).await.unwrap();
        assert_eq!(created.msg, "Check mode: would have created agent alias live.");
        assert!(api.list_agent_aliases("A1").await.unwrap().is_empty());

        let summary = AgentAliasSummary {
            agent_alias_id: "AL1".into(),
            agent_alias_name: "live".into(),
            ..Default::default()
        };
        let deleted = delete_alias(&api, "A1", &summary, &waiter, true).await.unwrap();
        assert_eq!(deleted.msg, "Check mode: would have deleted agent alias 'live'.");
    }

    #[test]
    fn test_plan_routing_ignores_order() {
        let existing = AgentAlias {
            agent_alias_id: "AL1".into(),
            agent_alias_name: "live".into(),
            agent_id: "A1".into(),
            description: Some("Production traffic".into()),
            routing_configuration: routing(&["1", "2"]),
            ..Default::default()
        };

        let mut same = settings();
        same.routing_configuration = Some(routing(&["2", "1"]));
        assert!(plan_alias_update(&same, &existing).is_none());

        let mut moved = settings();
        moved.routing_configuration = Some(routing(&["3"]));
        let request = plan_alias_update(&moved, &existing).unwrap();
        assert_eq!(request.routing_configuration, routing(&["3"]));
        assert_eq!(request.description.as_deref(), Some("Production traffic"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_description() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        let waiter = Waiter::default();
        let created = create_alias(&api, "A1", &settings(), &waiter, false).await.unwrap();
        let existing = api.get_agent_alias("A1", created.id.as_deref().unwrap()).await.unwrap();

        let unchanged = update_alias(&api, &settings(), &existing, &waiter, false).await.unwrap();
        assert!(!unchanged.changed);

        let mut desired = settings();
        desired.description = Some("Canary traffic".into());
        let outcome = update_alias(&api, &desired, &existing, &waiter, false).await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.msg, "Agent alias live updated successfully.");

        let updated = api.get_agent_alias("A1", &existing.agent_alias_id).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("Canary traffic"));
    }

    #[test]
    fn test_routing_accepts_module_keys() {
        let settings: AliasSettings = serde_json::from_value(serde_json::json!({
            "alias_name": "live",
            "routing_configuration": [{"agent_version": "1"}]
        }))
        .unwrap();
        assert_eq!(settings.routing_configuration, Some(routing(&["1"])));
    }
}
