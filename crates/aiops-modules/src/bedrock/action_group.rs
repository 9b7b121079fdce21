//! Action group reconciliation (always against the DRAFT agent version)

use aiops_core::{AiOpsError, AiOpsResult};
use serde::Deserialize;
use tracing::{debug, info};

use super::api::BedrockAgentApi;
use super::types::{
    ActionGroup, ActionGroupExecutor, ApiSchema, CreateActionGroupRequest, UpdateActionGroupRequest, DRAFT_VERSION,
};
use crate::outcome::Outcome;

/// Desired action group, as given to the `bedrock_agent_action_group` module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionGroupSettings {
    pub action_group_name: String,
    pub new_action_group_name: Option<String>,
    pub action_group_state: Option<String>,
    pub description: Option<String>,
    pub lambda_arn: Option<String>,
    /// OpenAPI document, JSON or YAML
    pub api_schema: Option<String>,
}

/// Two OpenAPI payloads describe the same document
///
/// Both are parsed as YAML (a superset of JSON); unparsable payloads fall
/// back to a trimmed text comparison.
pub fn same_api_schema(left: &str, right: &str) -> bool {
    match (
        serde_yaml::from_str::<serde_yaml::Value>(left),
        serde_yaml::from_str::<serde_yaml::Value>(right),
    ) {
        (Ok(l), Ok(r)) => l == r,
        _ => left.trim() == right.trim(),
    }
}

/// Full details of the DRAFT action group named `name`
pub async fn find_action_group(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    name: &str,
) -> AiOpsResult<Option<ActionGroup>> {
    let summaries = api.list_agent_action_groups(agent_id, DRAFT_VERSION).await?;
    let Some(summary) = summaries.into_iter().find(|g| g.action_group_name == name) else {
        return Ok(None);
    };

    match api
        .get_agent_action_group(agent_id, DRAFT_VERSION, &summary.action_group_id)
        .await
    {
        Ok(group) => Ok(Some(group)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> AiOpsResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AiOpsError::validation(format!("missing required arguments: {}", name)))
}

pub async fn create_action_group(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    settings: &ActionGroupSettings,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    if check_mode {
        return Ok(Outcome::changed(
            None,
            format!("Check mode: would have created action group {}.", settings.action_group_name),
        ));
    }

    let request = CreateActionGroupRequest {
        agent_id: agent_id.to_string(),
        agent_version: DRAFT_VERSION.to_string(),
        action_group_name: settings.action_group_name.clone(),
        action_group_executor: ActionGroupExecutor::lambda(required(&settings.lambda_arn, "lambda_arn")?),
        api_schema: ApiSchema {
            payload: Some(required(&settings.api_schema, "api_schema")?.to_string()),
            s3: None,
        },
        action_group_state: settings.action_group_state.clone(),
        description: settings.description.clone().filter(|d| !d.is_empty()),
    };

    let group = api.create_agent_action_group(&request).await?;
    info!(agent_id, action_group_id = %group.action_group_id, "Created action group");

    Ok(Outcome::changed(
        Some(group.action_group_id),
        format!("Action group {} created successfully.", settings.action_group_name),
    ))
}

/// Build the UpdateAgentActionGroup request, or `None` when nothing drifted
pub fn plan_action_group_update(settings: &ActionGroupSettings, existing: &ActionGroup) -> Option<UpdateActionGroupRequest> {
    let live_payload = existing.api_schema.as_ref().and_then(|s| s.payload.as_deref());
    let schema_changed = match (settings.api_schema.as_deref(), live_payload) {
        (Some(desired), Some(live)) => !same_api_schema(desired, live),
        (Some(_), None) => true,
        (None, _) => false,
    };

    let state_changed = settings
        .action_group_state
        .as_ref()
        .is_some_and(|state| existing.action_group_state.as_ref() != Some(state));
    let description_changed = settings
        .description
        .as_ref()
        .is_some_and(|d| !d.is_empty() && existing.description.as_ref() != Some(d));
    let new_name = settings
        .new_action_group_name
        .as_ref()
        .filter(|name| !name.is_empty() && **name != existing.action_group_name);
    let live_lambda = existing.action_group_executor.as_ref().and_then(|e| e.lambda.as_ref());
    let lambda_changed = settings
        .lambda_arn
        .as_ref()
        .is_some_and(|arn| live_lambda.is_some_and(|live| live != arn));

    debug!(schema_changed, state_changed, description_changed, lambda_changed, "Compared action group");

    if !(schema_changed || state_changed || description_changed || new_name.is_some() || lambda_changed) {
        return None;
    }

    let api_schema = if schema_changed {
        Some(ApiSchema {
            payload: settings.api_schema.clone(),
            s3: None,
        })
    } else {
        existing.api_schema.clone()
    };

    Some(UpdateActionGroupRequest {
        agent_id: existing.agent_id.clone(),
        agent_version: DRAFT_VERSION.to_string(),
        action_group_id: existing.action_group_id.clone(),
        action_group_name: new_name.cloned().unwrap_or_else(|| existing.action_group_name.clone()),
        action_group_state: settings
            .action_group_state
            .clone()
            .or_else(|| existing.action_group_state.clone()),
        description: if description_changed {
            settings.description.clone()
        } else {
            existing.description.clone()
        },
        action_group_executor: if lambda_changed {
            settings.lambda_arn.as_deref().map(ActionGroupExecutor::lambda)
        } else {
            existing.action_group_executor.clone()
        },
        api_schema,
    })
}

pub async fn update_action_group(
    api: &dyn BedrockAgentApi,
    settings: &ActionGroupSettings,
    existing: &ActionGroup,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    let group_id = Some(existing.action_group_id.clone());

    let Some(request) = plan_action_group_update(settings, existing) else {
        return Ok(Outcome::unchanged(group_id, "No updates needed."));
    };

    if check_mode {
        return Ok(Outcome::changed(
            group_id,
            format!("Check mode: would have updated action group {}.", existing.action_group_name),
        ));
    }

    api.update_agent_action_group(&request).await?;
    info!(action_group_id = %existing.action_group_id, "Updated action group");

    Ok(Outcome::changed(
        group_id,
        format!("Action group {} updated successfully.", existing.action_group_name),
    ))
}

pub async fn delete_action_group(
    api: &dyn BedrockAgentApi,
    agent_id: &str,
    existing: &ActionGroup,
    check_mode: bool,
) -> AiOpsResult<Outcome> {
    if check_mode {
        return Ok(Outcome::changed(
            None,
            format!("Check mode: would have deleted action group '{}'.", existing.action_group_name),
        ));
    }

    api.delete_agent_action_group(agent_id, DRAFT_VERSION, &existing.action_group_id)
        .await?;
    info!(agent_id, action_group_id = %existing.action_group_id, "Deleted action group");

    Ok(Outcome::changed(
        None,
        format!("Action group {} deleted successfully.", existing.action_group_name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBedrockAgent;

    const SCHEMA_JSON: &str = r#"{"openapi": "3.0.0", "info": {"title": "Orders", "version": "1.0"}, "paths": {}}"#;
    const SCHEMA_YAML: &str = "openapi: 3.0.0\ninfo:\n  title: Orders\n  version: '1.0'\npaths: {}\n";

    fn settings() -> ActionGroupSettings {
        ActionGroupSettings {
            action_group_name: "orders".into(),
            action_group_state: Some("ENABLED".into()),
            lambda_arn: Some("arn:aws:lambda:us-east-1:123456789012:function:orders".into()),
            api_schema: Some(SCHEMA_JSON.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_api_schema_across_formats() {
        assert!(same_api_schema(SCHEMA_JSON, SCHEMA_YAML));
        assert!(!same_api_schema(SCHEMA_JSON, "openapi: 3.1.0\npaths: {}\n"));
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        let outcome = create_action_group(&api, "A1", &settings(), false).await.unwrap();
        assert!(outcome.changed);

        let group = find_action_group(&api, "A1", "orders").await.unwrap().unwrap();
        assert_eq!(Some(group.action_group_id.clone()), outcome.id);
        assert_eq!(group.agent_version, DRAFT_VERSION);
        assert!(find_action_group(&api, "A1", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_requires_lambda() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        let mut incomplete = settings();
        incomplete.lambda_arn = None;
        let err = create_action_group(&api, "A1", &incomplete, false).await.unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: lambda_arn");
    }

    #[tokio::test]
    async fn test_update_schema_in_other_format_is_noop() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        create_action_group(&api, "A1", &settings(), false).await.unwrap();
        let existing = find_action_group(&api, "A1", "orders").await.unwrap().unwrap();

        let mut desired = settings();
        desired.api_schema = Some(SCHEMA_YAML.into());
        let outcome = update_action_group(&api, &desired, &existing, false).await.unwrap();
        assert!(!outcome.changed);
        assert_eq!(api.calls("UpdateAgentActionGroup"), 0);
    }

    #[tokio::test]
    async fn test_update_state_keeps_schema() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        create_action_group(&api, "A1", &settings(), false).await.unwrap();
        let existing = find_action_group(&api, "A1", "orders").await.unwrap().unwrap();

        let mut desired = settings();
        desired.action_group_state = Some("DISABLED".into());
        let request = plan_action_group_update(&desired, &existing).unwrap();
        assert_eq!(request.api_schema, existing.api_schema);

        let outcome = update_action_group(&api, &desired, &existing, false).await.unwrap();
        assert!(outcome.changed);
        let updated = find_action_group(&api, "A1", "orders").await.unwrap().unwrap();
        assert_eq!(updated.action_group_state.as_deref(), Some("DISABLED"));
    }

    #[tokio::test]
    async fn test_delete() {
        let api = FakeBedrockAgent::with_agent("A1", "support");
        create_action_group(&api, "A1", &settings(), false).await.unwrap();
        let existing = find_action_group(&api, "A1", "orders").await.unwrap().unwrap();

        let check = delete_action_group(&api, "A1", &existing, true).await.unwrap();
        assert!(check.changed);
        assert!(find_action_group(&api, "A1", "orders").await.unwrap().is_some());

        delete_action_group(&api, "A1", &existing, false).await.unwrap();
        assert!(find_action_group(&api, "A1", "orders").await.unwrap().is_none());
    }
}
