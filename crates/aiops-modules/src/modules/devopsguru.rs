//! DevOps Guru modules
//!
//! - `devopsguru_resource_collection` - Manage analysed resources and notification channels
//! - `devopsguru_resource_collection_info` - Read the resource collection
//! - `devopsguru_insight_info` - Describe or list insights

use aiops_core::{
    camel_dict_to_snake_dict, convert_time_ranges, snake_dict_to_camel_dict, AiOpsResult, ModuleOutput, ModuleSpec,
    ParamKind, ParamSpec,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{snake, state_param};
use crate::devopsguru::api::DevOpsGuruApi;
use crate::devopsguru::channel::{ensure_notification_channel, remove_matching_channel, remove_notification_channel};
use crate::devopsguru::collection::{apply_update, plan_stack_update, plan_tag_update, CollectionUpdate};
use crate::devopsguru::insight::{anomaly_request, enrich_insights, recommendation_request, Enrichment};
use crate::devopsguru::types::{ResourceCollection, TagCollection, AWS_CLOUD_FORMATION, AWS_SERVICE, AWS_TAGS};
use crate::module::{Module, ModuleContext};
use crate::outcome::Outcome;

/// One view of the resource collection; `None` when nothing is configured
async fn collection_view(api: &dyn DevOpsGuruApi, collection_type: &str) -> AiOpsResult<Option<ResourceCollection>> {
    match api.get_resource_collection(collection_type).await {
        Ok(collection) => Ok(Some(collection)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Stack and tag membership combined
async fn live_collection(api: &dyn DevOpsGuruApi) -> AiOpsResult<ResourceCollection> {
    let stacks = collection_view(api, AWS_CLOUD_FORMATION).await?;
    let tags = collection_view(api, AWS_TAGS).await?;
    Ok(ResourceCollection {
        cloud_formation: stacks.and_then(|c| c.cloud_formation),
        tags: tags.and_then(|c| c.tags),
        ..Default::default()
    })
}

// ============================================================================
// devopsguru_resource_collection
// ============================================================================

pub struct DevOpsGuruResourceCollectionModule {
    spec: ModuleSpec,
}

impl DevOpsGuruResourceCollectionModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new(
            "devopsguru_resource_collection",
            "Manage the Amazon DevOps Guru resource collection and notification channels",
        )
        .params([
            state_param(),
            ParamSpec::list("cloudformation_stack_names", ParamKind::Str).aliases(&["stack_names"]),
            ParamSpec::list("tags", ParamKind::Dict).describe("Entries of app_boundary_key and tag_values"),
            ParamSpec::dict("notification_channel_config").describe("SNS topic and optional filters"),
            ParamSpec::str("notification_channel_id").describe("Channel to remove when state is absent"),
        ])
        .with_aws_connection()
        .required_one_of(&[
            "cloudformation_stack_names",
            "tags",
            "notification_channel_config",
            "notification_channel_id",
        ]);
        Self { spec }
    }
}

impl Default for DevOpsGuruResourceCollectionModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for DevOpsGuruResourceCollectionModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.devops_guru().await?;
        let api = client.as_ref();
        let check_mode = ctx.check_mode();
        let present = ctx.state_present();

        let stack_names: Option<Vec<String>> = ctx.params.get_opt("cloudformation_stack_names")?;
        let tags: Option<Vec<TagCollection>> = ctx.params.get_opt("tags")?;

        let mut collection = live_collection(api).await?;
        let updates: Vec<CollectionUpdate> = [
            stack_names.and_then(|names| plan_stack_update(&collection, &names, present)),
            tags.and_then(|tags| plan_tag_update(&collection, &tags, present)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut messages = Vec::new();
        for update in &updates {
            if !check_mode {
                api.update_resource_collection(update.action, &update.resource_collection)
                    .await?;
                info!(action = ?update.action, "Updated resource collection");
            }
            collection = apply_update(&collection, update);
        }
        if !updates.is_empty() {
            messages.push(if check_mode {
                "Check mode: would have updated the resource collection.".to_string()
            } else {
                "Resource collection updated.".to_string()
            });
        }

        let channel_config = ctx.params.raw("notification_channel_config");
        let channel_id = ctx.params.str("notification_channel_id");
        let channel = match (present, channel_config, channel_id) {
            (true, Some(config), _) => Some(ensure_notification_channel(api, config, check_mode).await?),
            (false, _, Some(id)) => Some(remove_notification_channel(api, id, check_mode).await?),
            (false, Some(config), None) => Some(remove_matching_channel(api, config, check_mode).await?),
            _ => None,
        };
        debug!(updates = updates.len(), channel = channel.is_some(), "Reconciled resource collection");

        let channel_changed = channel.as_ref().is_some_and(|c| c.changed);
        let channel_id = channel.as_ref().and_then(|c| c.id.clone());
        if let Some(Outcome { msg, .. }) = channel {
            messages.push(msg);
        }
        if messages.is_empty() {
            messages.push("No changes needed.".to_string());
        }

        Ok(ModuleOutput::new(!updates.is_empty() || channel_changed)
            .with_msg(messages.join(" "))
            .with("resource_collection", snake(&collection)?)
            .with("notification_channel_id", channel_id))
    }
}

// ============================================================================
// devopsguru_resource_collection_info
// ============================================================================

pub struct DevOpsGuruResourceCollectionInfoModule {
    spec: ModuleSpec,
}

impl DevOpsGuruResourceCollectionInfoModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new(
            "devopsguru_resource_collection_info",
            "Gather information about the Amazon DevOps Guru resource collection",
        )
        .param(
            ParamSpec::str("resource_collection_type")
                .required()
                .choices(&[AWS_CLOUD_FORMATION, AWS_SERVICE, AWS_TAGS]),
        )
        .with_aws_connection();
        Self { spec }
    }
}

impl Default for DevOpsGuruResourceCollectionInfoModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for DevOpsGuruResourceCollectionInfoModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.devops_guru().await?;
        let collection_type = ctx.required_str("resource_collection_type")?;

        let resource_collection = match collection_view(client.as_ref(), collection_type).await? {
            Some(collection) => snake(&collection)?,
            None => json!({}),
        };
        Ok(ModuleOutput::unchanged().with("resource_collection", resource_collection))
    }
}

// ============================================================================
// devopsguru_insight_info
// ============================================================================

/// Describe one insight or list insights by status, optionally with their
/// anomalies and recommendations
pub struct DevOpsGuruInsightInfoModule {
    spec: ModuleSpec,
}

impl DevOpsGuruInsightInfoModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new("devopsguru_insight_info", "Gather information about Amazon DevOps Guru insights")
            .params([
                ParamSpec::dict("status_filter")
                    .aliases(&["filter"])
                    .describe("One of ongoing, closed or any, with type and time ranges"),
                ParamSpec::str("account_id"),
                ParamSpec::str("insight_id"),
                ParamSpec::dict("include_anomalies").describe("Attach anomalies; accepts filters and start_time_range"),
                ParamSpec::dict("include_recommendations").describe("Attach recommendations; accepts locale"),
            ])
            .with_aws_connection()
            .required_one_of(&["status_filter", "insight_id"]);
        Self { spec }
    }
}

impl Default for DevOpsGuruInsightInfoModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for DevOpsGuruInsightInfoModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.devops_guru().await?;
        let api = client.as_ref();
        let account_id = ctx.params.str("account_id");

        let mut insights = match ctx.params.str("insight_id") {
            Some(insight_id) => api.describe_insight(insight_id, account_id).await?,
            None => {
                let raw = ctx.params.raw("status_filter").cloned().unwrap_or_else(|| json!({}));
                let status_filter = convert_time_ranges(snake_dict_to_camel_dict(&raw, true))?;
                api.list_insights(&status_filter).await?
            }
        };

        let enrichment = Enrichment {
            anomalies: ctx
                .params
                .raw("include_anomalies")
                .map(|include| anomaly_request(include, account_id))
                .transpose()?,
            recommendations: ctx
                .params
                .raw("include_recommendations")
                .map(|include| recommendation_request(include, account_id)),
        };
        if !enrichment.is_empty() {
            enrich_insights(api, &mut insights, &enrichment).await?;
        }

        let mut output = ModuleOutput::unchanged();
        if let Value::Object(fields) = camel_dict_to_snake_dict(&insights, &[]) {
            for (key, value) in fields {
                output.insert(&key, value);
            }
        }
        Ok(output)
    }
}
