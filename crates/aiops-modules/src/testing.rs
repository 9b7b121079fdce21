//! In-memory service fakes
//!
//! Each fake implements one service API trait with just enough behaviour
//! for the reconciliation helpers and modules to run end to end: resources
//! get generated ids, lifecycle statuses settle immediately, and missing
//! resources fail with `ResourceNotFoundException` like the real services.
//! [`FakeClients`] bundles them behind [`ServiceClients`] and doubles as a
//! [`ClientProvider`].

use aiops_core::{AiOpsError, AiOpsResult, AwsConnection};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bedrock::agent::{NOT_PREPARED, PREPARED};
use crate::bedrock::api::{BedrockAgentApi, BedrockAgentRuntimeApi, BedrockApi, BedrockRuntimeApi};
use crate::bedrock::types::*;
use crate::clients::{ClientProvider, ServiceClients};
use crate::devopsguru::api::DevOpsGuruApi;
use crate::devopsguru::collection::{apply_update, CollectionUpdate};
use crate::devopsguru::types::{
    CollectionAction, NotificationChannel, ResourceCollection, AWS_CLOUD_FORMATION, AWS_TAGS,
};

const NOT_FOUND: &str = "ResourceNotFoundException";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_found(operation: &str, what: impl std::fmt::Display) -> AiOpsError {
    AiOpsError::api(operation, NOT_FOUND, format!("{} not found", what))
}

/// `true` when `model[key]` is a list containing `wanted`
fn lists_value(model: &FoundationModel, key: &str, wanted: &str) -> bool {
    model
        .extra
        .get(key)
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(wanted)))
}

/// Foundation model catalogue
#[derive(Debug, Default)]
pub struct FakeBedrock {
    models: Vec<FoundationModel>,
}

impl FakeBedrock {
    /// Catalogue from wire-shaped model summaries; entries without a
    /// `modelId` are skipped
    pub fn with_models(models: Vec<Value>) -> Self {
        Self {
            models: models
                .into_iter()
                .filter_map(|model| serde_json::from_value(model).ok())
                .collect(),
        }
    }
}

#[async_trait]
impl BedrockApi for FakeBedrock {
    async fn list_foundation_models(&self, filter: &FoundationModelFilter) -> AiOpsResult<Vec<FoundationModel>> {
        let matches = |model: &&FoundationModel| {
            filter
                .by_provider
                .as_ref()
                .map_or(true, |p| model.provider_name.as_ref().is_some_and(|n| n.eq_ignore_ascii_case(p)))
                && filter
                    .by_output_modality
                    .as_ref()
                    .map_or(true, |m| lists_value(model, "outputModalities", m))
                && filter
                    .by_customization_type
                    .as_ref()
                    .map_or(true, |c| lists_value(model, "customizationsSupported", c))
                && filter
                    .by_inference_type
                    .as_ref()
                    .map_or(true, |i| lists_value(model, "inferenceTypesSupported", i))
        };
        Ok(self.models.iter().filter(matches).cloned().collect())
    }

    async fn get_foundation_model(&self, model_id: &str) -> AiOpsResult<FoundationModel> {
        self.models
            .iter()
            .find(|model| model.model_id == model_id)
            .cloned()
            .ok_or_else(|| not_found("GetFoundationModel", format!("Model {}", model_id)))
    }
}

#[derive(Debug, Default)]
struct AgentState {
    agents: BTreeMap<String, Agent>,
    aliases: BTreeMap<String, AgentAlias>,
    action_groups: BTreeMap<String, ActionGroup>,
    calls: Vec<String>,
    next_id: u64,
}

impl AgentState {
    fn record(&mut self, operation: &str) {
        self.calls.push(operation.to_string());
    }

    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:06}", prefix, self.next_id)
    }

    fn agent_mut(&mut self, operation: &str, agent_id: &str) -> AiOpsResult<&mut Agent> {
        self.agents
            .get_mut(agent_id)
            .ok_or_else(|| not_found(operation, format!("Agent {}", agent_id)))
    }

    fn require_agent(&self, operation: &str, agent_id: &str) -> AiOpsResult<()> {
        if self.agents.contains_key(agent_id) {
            Ok(())
        } else {
            Err(not_found(operation, format!("Agent {}", agent_id)))
        }
    }
}

/// `bedrock-agent` control plane
#[derive(Debug, Default)]
pub struct FakeBedrockAgent {
    state: Mutex<AgentState>,
}

impl FakeBedrockAgent {
    /// Fake holding one prepared agent
    pub fn with_agent(agent_id: &str, agent_name: &str) -> Self {
        let fake = Self::default();
        lock(&fake.state).agents.insert(
            agent_id.to_string(),
            Agent {
                agent_id: agent_id.to_string(),
                agent_name: agent_name.to_string(),
                agent_status: PREPARED.to_string(),
                ..Default::default()
            },
        );
        fake
    }

    /// Number of calls made to `operation` (e.g. `PrepareAgent`)
    pub fn calls(&self, operation: &str) -> usize {
        lock(&self.state).calls.iter().filter(|op| *op == operation).count()
    }

    /// Force an agent into `status`
    pub fn set_agent_status(&self, agent_id: &str, status: &str) {
        if let Some(agent) = lock(&self.state).agents.get_mut(agent_id) {
            agent.agent_status = status.to_string();
        }
    }
}

#[async_trait]
impl BedrockAgentApi for FakeBedrockAgent {
    async fn list_agents(&self) -> AiOpsResult<Vec<AgentSummary>> {
        let mut state = lock(&self.state);
        state.record("ListAgents");
        Ok(state
            .agents
            .values()
            .map(|agent| AgentSummary {
                agent_id: agent.agent_id.clone(),
                agent_name: agent.agent_name.clone(),
                agent_status: Some(agent.agent_status.clone()),
                extra: Default::default(),
            })
            .collect())
    }

    async fn get_agent(&self, agent_id: &str) -> AiOpsResult<Agent> {
        let mut state = lock(&self.state);
        state.record("GetAgent");
        state.agent_mut("GetAgent", agent_id).map(|agent| agent.clone())
    }

    async fn create_agent(&self, request: &CreateAgentRequest) -> AiOpsResult<Agent> {
        let mut state = lock(&self.state);
        state.record("CreateAgent");
        if state.agents.values().any(|a| a.agent_name == request.agent_name) {
            return Err(AiOpsError::api(
                "CreateAgent",
                "ConflictException",
                format!("Agent {} already exists", request.agent_name),
            ));
        }

        let agent_id = state.new_id("AGENT");
        let agent = Agent {
            agent_id: agent_id.clone(),
            agent_name: request.agent_name.clone(),
            agent_status: NOT_PREPARED.to_string(),
            foundation_model: Some(request.foundation_model.clone()),
            instruction: Some(request.instruction.clone()),
            agent_resource_role_arn: Some(request.agent_resource_role_arn.clone()),
            orchestration_type: request.orchestration_type.clone(),
            agent_collaboration: request.agent_collaboration.clone(),
            description: request.description.clone(),
            idle_session_ttl_in_seconds: request.idle_session_ttl_in_seconds,
            prompt_override_configuration: request.prompt_override_configuration.clone(),
            extra: Default::default(),
        };
        state.agents.insert(agent_id, agent.clone());
        Ok(agent)
    }

    async fn update_agent(&self, request: &UpdateAgentRequest) -> AiOpsResult<Agent> {
        let mut state = lock(&self.state);
        state.record("UpdateAgent");
        let agent = state.agent_mut("UpdateAgent", &request.agent_id)?;
        agent.agent_name = request.agent_name.clone();
        agent.foundation_model = Some(request.foundation_model.clone());
        agent.agent_resource_role_arn = Some(request.agent_resource_role_arn.clone());
        agent.instruction = request.instruction.clone();
        agent.orchestration_type = request.orchestration_type.clone();
        agent.description = request.description.clone();
        agent.idle_session_ttl_in_seconds = request.idle_session_ttl_in_seconds;
        agent.agent_collaboration = request.agent_collaboration.clone();
        agent.prompt_override_configuration = request.prompt_override_configuration.clone();
        agent.agent_status = NOT_PREPARED.to_string();
        Ok(agent.clone())
    }

    async fn prepare_agent(&self, agent_id: &str) -> AiOpsResult<()> {
        let mut state = lock(&self.state);
        state.record("PrepareAgent");
        state.agent_mut("PrepareAgent", agent_id)?.agent_status = PREPARED.to_string();
        Ok(())
    }

    async fn delete_agent(&self, agent_id: &str) -> AiOpsResult<()> {
        let mut state = lock(&self.state);
        state.record("DeleteAgent");
        state.require_agent("DeleteAgent", agent_id)?;
        state.agents.remove(agent_id);
        state.aliases.retain(|_, alias| alias.agent_id != agent_id);
        state.action_groups.retain(|_, group| group.agent_id != agent_id);
        Ok(())
    }

    async fn list_agent_aliases(&self, agent_id: &str) -> AiOpsResult<Vec<AgentAliasSummary>> {
        let mut state = lock(&self.state);
        state.record("ListAgentAliases");
        state.require_agent("ListAgentAliases", agent_id)?;
        Ok(state
            .aliases
            .values()
            .filter(|alias| alias.agent_id == agent_id)
            .map(|alias| AgentAliasSummary {
                agent_alias_id: alias.agent_alias_id.clone(),
                agent_alias_name: alias.agent_alias_name.clone(),
                agent_alias_status: Some(alias.agent_alias_status.clone()),
                extra: Default::default(),
            })
            .collect())
    }

    async fn get_agent_alias(&self, agent_id: &str, alias_id: &str) -> AiOpsResult<AgentAlias> {
        let mut state = lock(&self.state);
        state.record("GetAgentAlias");
        state
            .aliases
            .get(alias_id)
            .filter(|alias| alias.agent_id == agent_id)
            .cloned()
            .ok_or_else(|| not_found("GetAgentAlias", format!("Alias {}", alias_id)))
    }

    async fn create_agent_alias(&self, request: &CreateAgentAliasRequest) -> AiOpsResult<AgentAlias> {
        let mut state = lock(&self.state);
        state.record("CreateAgentAlias");
        state.require_agent("CreateAgentAlias", &request.agent_id)?;

        let alias_id = state.new_id("ALIAS");
        let mut extra = serde_json::Map::new();
        if let Some(tags) = &request.tags {
            extra.insert("tags".into(), Value::Object(tags.clone()));
        }
        let alias = AgentAlias {
            agent_alias_id: alias_id.clone(),
            agent_alias_name: request.agent_alias_name.clone(),
            agent_id: request.agent_id.clone(),
            agent_alias_status: PREPARED.to_string(),
            description: request.description.clone(),
            routing_configuration: request.routing_configuration.clone(),
            extra,
        };
        state.aliases.insert(alias_id, alias.clone());
        Ok(alias)
    }

    async fn update_agent_alias(&self, request: &UpdateAgentAliasRequest) -> AiOpsResult<AgentAlias> {
        let mut state = lock(&self.state);
        state.record("UpdateAgentAlias");
        let alias = state
            .aliases
            .get_mut(&request.agent_alias_id)
            .filter(|alias| alias.agent_id == request.agent_id)
            .ok_or_else(|| not_found("UpdateAgentAlias", format!("Alias {}", request.agent_alias_id)))?;
        alias.agent_alias_name = request.agent_alias_name.clone();
        alias.description = request.description.clone();
        alias.routing_configuration = request.routing_configuration.clone();
        Ok(alias.clone())
    }

    async fn delete_agent_alias(&self, agent_id: &str, alias_id: &str) -> AiOpsResult<()> {
        let mut state = lock(&self.state);
        state.record("DeleteAgentAlias");
        match state.aliases.get(alias_id) {
            Some(alias) if alias.agent_id == agent_id => {
                state.aliases.remove(alias_id);
                Ok(())
            }
            _ => Err(not_found("DeleteAgentAlias", format!("Alias {}", alias_id))),
        }
    }

    async fn list_agent_action_groups(&self, agent_id: &str, agent_version: &str) -> AiOpsResult<Vec<ActionGroupSummary>> {
        let mut state = lock(&self.state);
        state.record("ListAgentActionGroups");
        state.require_agent("ListAgentActionGroups", agent_id)?;
        Ok(state
            .action_groups
            .values()
            .filter(|group| group.agent_id == agent_id && group.agent_version == agent_version)
            .map(|group| ActionGroupSummary {
                action_group_id: group.action_group_id.clone(),
                action_group_name: group.action_group_name.clone(),
                action_group_state: group.action_group_state.clone(),
                extra: Default::default(),
            })
            .collect())
    }

    async fn get_agent_action_group(
        &self,
        agent_id: &str,
        agent_version: &str,
        action_group_id: &str,
    ) -> AiOpsResult<ActionGroup> {
        let mut state = lock(&self.state);
        state.record("GetAgentActionGroup");
        state
            .action_groups
            .get(action_group_id)
            .filter(|group| group.agent_id == agent_id && group.agent_version == agent_version)
            .cloned()
            .ok_or_else(|| not_found("GetAgentActionGroup", format!("Action group {}", action_group_id)))
    }

    async fn create_agent_action_group(&self, request: &CreateActionGroupRequest) -> AiOpsResult<ActionGroup> {
        let mut state = lock(&self.state);
        state.record("CreateAgentActionGroup");
        state.require_agent("CreateAgentActionGroup", &request.agent_id)?;

        let group_id = state.new_id("GROUP");
        let group = ActionGroup {
            action_group_id: group_id.clone(),
            action_group_name: request.action_group_name.clone(),
            agent_id: request.agent_id.clone(),
            agent_version: request.agent_version.clone(),
            action_group_state: Some(request.action_group_state.clone().unwrap_or_else(|| "ENABLED".into())),
            description: request.description.clone(),
            api_schema: Some(request.api_schema.clone()),
            action_group_executor: Some(request.action_group_executor.clone()),
            extra: Default::default(),
        };
        state.action_groups.insert(group_id, group.clone());
        Ok(group)
    }

    async fn update_agent_action_group(&self, request: &UpdateActionGroupRequest) -> AiOpsResult<ActionGroup> {
        let mut state = lock(&self.state);
        state.record("UpdateAgentActionGroup");
        let group = state
            .action_groups
            .get_mut(&request.action_group_id)
            .filter(|group| group.agent_id == request.agent_id)
            .ok_or_else(|| not_found("UpdateAgentActionGroup", format!("Action group {}", request.action_group_id)))?;
        group.action_group_name = request.action_group_name.clone();
        group.action_group_state = request.action_group_state.clone();
        group.description = request.description.clone();
        group.action_group_executor = request.action_group_executor.clone();
        group.api_schema = request.api_schema.clone();
        Ok(group.clone())
    }

    async fn delete_agent_action_group(
        &self,
        agent_id: &str,
        _agent_version: &str,
        action_group_id: &str,
    ) -> AiOpsResult<()> {
        let mut state = lock(&self.state);
        state.record("DeleteAgentActionGroup");
        match state.action_groups.get(action_group_id) {
            Some(group) if group.agent_id == agent_id => {
                state.action_groups.remove(action_group_id);
                Ok(())
            }
            _ => Err(not_found("DeleteAgentActionGroup", format!("Action group {}", action_group_id))),
        }
    }
}

/// `bedrock-runtime` answering every model with one canned body
#[derive(Debug, Default)]
pub struct FakeBedrockRuntime {
    response: Option<Value>,
    requests: Mutex<Vec<InvokeModelRequest>>,
}

impl FakeBedrockRuntime {
    pub fn with_response(body: Value) -> Self {
        Self {
            response: Some(body),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<InvokeModelRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl BedrockRuntimeApi for FakeBedrockRuntime {
    async fn invoke_model(&self, request: &InvokeModelRequest) -> AiOpsResult<Vec<u8>> {
        lock(&self.requests).push(request.clone());
        let body = self.response.as_ref().ok_or_else(|| {
            AiOpsError::api("InvokeModel", "ValidationException", format!("No response for {}", request.model_id))
        })?;
        Ok(serde_json::to_vec(body)?)
    }
}

/// `bedrock-agent-runtime` replaying a fixed event stream
#[derive(Debug, Default)]
pub struct FakeBedrockAgentRuntime {
    events: Vec<AgentStreamEvent>,
    requests: Mutex<Vec<InvokeAgentRequest>>,
}

impl FakeBedrockAgentRuntime {
    pub fn with_events(events: Vec<AgentStreamEvent>) -> Self {
        Self {
            events,
            requests: Mutex::default(),
        }
    }

    /// Stream that delivers `parts` as consecutive chunks
    pub fn with_answer(parts: &[&str]) -> Self {
        Self::with_events(
            parts
                .iter()
                .map(|part| AgentStreamEvent::Chunk(part.as_bytes().to_vec()))
                .collect(),
        )
    }

    pub fn requests(&self) -> Vec<InvokeAgentRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl BedrockAgentRuntimeApi for FakeBedrockAgentRuntime {
    async fn invoke_agent(&self, request: &InvokeAgentRequest) -> AiOpsResult<Vec<AgentStreamEvent>> {
        lock(&self.requests).push(request.clone());
        Ok(self.events.clone())
    }
}

#[derive(Debug, Default)]
struct GuruState {
    collection: ResourceCollection,
    channels: Vec<NotificationChannel>,
    insights: BTreeMap<String, (String, Value)>,
    anomalies: HashMap<String, Value>,
    recommendations: HashMap<String, Value>,
    requests: Vec<(String, Value)>,
    next_id: u64,
}

impl GuruState {
    fn record(&mut self, operation: &str, request: Value) {
        self.requests.push((operation.to_string(), request));
    }
}

/// `devops-guru` with one account-wide resource collection
#[derive(Debug, Default)]
pub struct FakeDevOpsGuru {
    state: Mutex<GuruState>,
}

impl FakeDevOpsGuru {
    pub fn with_collection(collection: ResourceCollection) -> Self {
        let fake = Self::default();
        lock(&fake.state).collection = collection;
        fake
    }

    pub fn collection(&self) -> ResourceCollection {
        lock(&self.state).collection.clone()
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        lock(&self.state).channels.clone()
    }

    /// Register an insight under `insight_type` (`ProactiveInsight` or
    /// `ReactiveInsight`); it must carry an `Id`
    pub fn add_insight(&self, insight_type: &str, insight: Value) {
        let id = insight.get("Id").and_then(Value::as_str).unwrap_or_default().to_string();
        lock(&self.state).insights.insert(id, (insight_type.to_string(), insight));
    }

    pub fn set_anomalies(&self, insight_id: &str, response: Value) {
        lock(&self.state).anomalies.insert(insight_id.to_string(), response);
    }

    pub fn set_recommendations(&self, insight_id: &str, response: Value) {
        lock(&self.state).recommendations.insert(insight_id.to_string(), response);
    }

    /// Request payloads sent to `operation`, oldest first
    pub fn requests(&self, operation: &str) -> Vec<Value> {
        lock(&self.state)
            .requests
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, request)| request.clone())
            .collect()
    }
}

/// Status the `ListInsights` filter key selects; `None` selects any
fn status_for_filter(status_filter: &Value) -> Option<&'static str> {
    if status_filter.get("Ongoing").is_some() {
        Some("ONGOING")
    } else if status_filter.get("Closed").is_some() {
        Some("CLOSED")
    } else {
        None
    }
}

#[async_trait]
impl DevOpsGuruApi for FakeDevOpsGuru {
    async fn get_resource_collection(&self, collection_type: &str) -> AiOpsResult<ResourceCollection> {
        let mut state = lock(&self.state);
        state.record("GetResourceCollection", json!({ "ResourceCollectionType": collection_type }));

        let view = match collection_type {
            AWS_CLOUD_FORMATION if !state.collection.stack_names().is_empty() => {
                ResourceCollection::stacks(state.collection.stack_names().to_vec())
            }
            AWS_TAGS if !state.collection.tag_list().is_empty() => {
                ResourceCollection::tags(state.collection.tag_list().to_vec())
            }
            _ => return Err(not_found("GetResourceCollection", "Resource collection")),
        };
        Ok(view)
    }

    async fn update_resource_collection(
        &self,
        action: CollectionAction,
        collection: &ResourceCollection,
    ) -> AiOpsResult<()> {
        let update = CollectionUpdate {
            action,
            resource_collection: collection.clone(),
        };
        let mut state = lock(&self.state);
        state.record("UpdateResourceCollection", serde_json::to_value(&update)?);
        let updated = apply_update(&state.collection, &update);
        state.collection = updated;
        Ok(())
    }

    async fn list_notification_channels(&self) -> AiOpsResult<Vec<NotificationChannel>> {
        let mut state = lock(&self.state);
        state.record("ListNotificationChannels", json!({}));
        Ok(state.channels.clone())
    }

    async fn add_notification_channel(&self, config: &Value) -> AiOpsResult<String> {
        let mut state = lock(&self.state);
        state.record("AddNotificationChannel", json!({ "Config": config }));
        state.next_id += 1;
        let id = format!("channel-{:04}", state.next_id);
        state.channels.push(NotificationChannel {
            id: id.clone(),
            config: config.clone(),
        });
        Ok(id)
    }

    async fn remove_notification_channel(&self, channel_id: &str) -> AiOpsResult<()> {
        let mut state = lock(&self.state);
        state.record("RemoveNotificationChannel", json!({ "Id": channel_id }));
        let before = state.channels.len();
        state.channels.retain(|channel| channel.id != channel_id);
        if state.channels.len() == before {
            return Err(not_found("RemoveNotificationChannel", format!("Channel {}", channel_id)));
        }
        Ok(())
    }

    async fn describe_insight(&self, insight_id: &str, account_id: Option<&str>) -> AiOpsResult<Value> {
        let mut state = lock(&self.state);
        state.record("DescribeInsight", json!({ "Id": insight_id, "AccountId": account_id }));
        let (insight_type, insight) = state
            .insights
            .get(insight_id)
            .ok_or_else(|| not_found("DescribeInsight", format!("Insight {}", insight_id)))?;
        Ok(json!({ insight_type.as_str(): insight }))
    }

    async fn list_insights(&self, status_filter: &Value) -> AiOpsResult<Value> {
        let mut state = lock(&self.state);
        state.record("ListInsights", json!({ "StatusFilter": status_filter }));

        let wanted = status_for_filter(status_filter);
        let mut proactive = Vec::new();
        let mut reactive = Vec::new();
        for (insight_type, insight) in state.insights.values() {
            let status = insight.get("Status").and_then(Value::as_str);
            if wanted.is_some_and(|w| status != Some(w)) {
                continue;
            }
            match insight_type.as_str() {
                "ReactiveInsight" => reactive.push(insight.clone()),
                _ => proactive.push(insight.clone()),
            }
        }
        Ok(json!({ "ProactiveInsights": proactive, "ReactiveInsights": reactive }))
    }

    async fn list_anomalies_for_insight(&self, request: &Value) -> AiOpsResult<Value> {
        let mut state = lock(&self.state);
        state.record("ListAnomaliesForInsight", request.clone());
        let insight_id = request.get("InsightId").and_then(Value::as_str).unwrap_or_default();
        Ok(state
            .anomalies
            .get(insight_id)
            .cloned()
            .unwrap_or_else(|| json!({ "ProactiveAnomalies": [], "ReactiveAnomalies": [] })))
    }

    async fn list_recommendations(&self, request: &Value) -> AiOpsResult<Value> {
        let mut state = lock(&self.state);
        state.record("ListRecommendations", request.clone());
        let insight_id = request.get("InsightId").and_then(Value::as_str).unwrap_or_default();
        Ok(state
            .recommendations
            .get(insight_id)
            .cloned()
            .unwrap_or_else(|| json!({ "Recommendations": [] })))
    }
}

/// All fakes behind [`ServiceClients`]
///
/// Cloning shares the underlying fakes, so a test can keep a handle while
/// the executor owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeClients {
    pub bedrock: Arc<FakeBedrock>,
    pub bedrock_agent: Arc<FakeBedrockAgent>,
    pub bedrock_runtime: Arc<FakeBedrockRuntime>,
    pub bedrock_agent_runtime: Arc<FakeBedrockAgentRuntime>,
    pub devops_guru: Arc<FakeDevOpsGuru>,
    pub connections: Arc<Mutex<Vec<AwsConnection>>>,
}

impl FakeClients {
    /// Connections handed to [`ClientProvider::connect`], oldest first
    pub fn connections(&self) -> Vec<AwsConnection> {
        lock(&self.connections).clone()
    }
}

#[async_trait]
impl ServiceClients for FakeClients {
    async fn bedrock(&self) -> AiOpsResult<Arc<dyn BedrockApi>> {
        Ok(self.bedrock.clone())
    }

    async fn bedrock_agent(&self) -> AiOpsResult<Arc<dyn BedrockAgentApi>> {
        Ok(self.bedrock_agent.clone())
    }

    async fn bedrock_runtime(&self) -> AiOpsResult<Arc<dyn BedrockRuntimeApi>> {
        Ok(self.bedrock_runtime.clone())
    }

    async fn bedrock_agent_runtime(&self) -> AiOpsResult<Arc<dyn BedrockAgentRuntimeApi>> {
        Ok(self.bedrock_agent_runtime.clone())
    }

    async fn devops_guru(&self) -> AiOpsResult<Arc<dyn DevOpsGuruApi>> {
        Ok(self.devops_guru.clone())
    }
}

impl ClientProvider for FakeClients {
    fn connect(&self, connection: AwsConnection) -> Arc<dyn ServiceClients> {
        lock(&self.connections).push(connection);
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devopsguru::types::TagCollection;

    #[tokio::test]
    async fn test_collection_views_by_type() {
        let guru = FakeDevOpsGuru::default();
        let err = guru.get_resource_collection(AWS_CLOUD_FORMATION).await.unwrap_err();
        assert!(err.is_not_found());

        guru.update_resource_collection(CollectionAction::Add, &ResourceCollection::stacks(vec!["S1".into()]))
            .await
            .unwrap();
        let tags = vec![TagCollection {
            app_boundary_key: "devops-guru-app".into(),
            tag_values: vec!["prod".into()],
        }];
        guru.update_resource_collection(CollectionAction::Add, &ResourceCollection::tags(tags))
            .await
            .unwrap();

        let stacks = guru.get_resource_collection(AWS_CLOUD_FORMATION).await.unwrap();
        assert_eq!(stacks.stack_names(), ["S1".to_string()]);
        assert!(stacks.tags.is_none());
        let tagged = guru.get_resource_collection(AWS_TAGS).await.unwrap();
        assert_eq!(tagged.tag_list()[0].tag_values, vec!["prod"]);
        assert_eq!(guru.requests("UpdateResourceCollection").len(), 2);
    }

    #[tokio::test]
    async fn test_list_insights_by_status() {
        let guru = FakeDevOpsGuru::default();
        guru.add_insight("ProactiveInsight", json!({"Id": "p-1", "Status": "ONGOING"}));
        guru.add_insight("ReactiveInsight", json!({"Id": "r-1", "Status": "CLOSED"}));

        let ongoing = guru.list_insights(&json!({"Ongoing": {"Type": "PROACTIVE"}})).await.unwrap();
        assert_eq!(ongoing["ProactiveInsights"].as_array().unwrap().len(), 1);
        assert_eq!(ongoing["ReactiveInsights"], json!([]));

        let described = guru.describe_insight("r-1", None).await.unwrap();
        assert_eq!(described["ReactiveInsight"]["Id"], json!("r-1"));
    }

    #[tokio::test]
    async fn test_provider_records_connections() {
        let fakes = FakeClients::default();
        let connection = AwsConnection {
            region: Some("us-west-2".into()),
            ..Default::default()
        };
        let clients = fakes.connect(connection);
        assert!(clients.devops_guru().await.is_ok());
        assert_eq!(fakes.connections()[0].region.as_deref(), Some("us-west-2"));
    }
}
