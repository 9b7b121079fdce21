use aiops_core::AiOpsResult;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::types::{CollectionAction, NotificationChannel, ResourceCollection};
use crate::aws::cli::AwsCli;
use crate::bedrock::api::{take_field, take_list};

/// `devops-guru` API
///
/// Insight and anomaly payloads are deep and version-dependent; they are
/// passed through as JSON.
#[async_trait]
pub trait DevOpsGuruApi: Send + Sync {
    /// Fails with `ResourceNotFoundException` when nothing is configured
    async fn get_resource_collection(&self, collection_type: &str) -> AiOpsResult<ResourceCollection>;
    async fn update_resource_collection(
        &self,
        action: CollectionAction,
        collection: &ResourceCollection,
    ) -> AiOpsResult<()>;

    async fn list_notification_channels(&self) -> AiOpsResult<Vec<NotificationChannel>>;
    /// Returns the new channel id
    async fn add_notification_channel(&self, config: &Value) -> AiOpsResult<String>;
    async fn remove_notification_channel(&self, channel_id: &str) -> AiOpsResult<()>;

    async fn describe_insight(&self, insight_id: &str, account_id: Option<&str>) -> AiOpsResult<Value>;
    async fn list_insights(&self, status_filter: &Value) -> AiOpsResult<Value>;
    async fn list_anomalies_for_insight(&self, request: &Value) -> AiOpsResult<Value>;
    async fn list_recommendations(&self, request: &Value) -> AiOpsResult<Value>;
}

const DEVOPS_GURU: &str = "devops-guru";

/// Drop pagination bookkeeping from a merged response
fn strip_token(mut response: Value) -> Value {
    if let Some(map) = response.as_object_mut() {
        map.remove("NextToken");
    }
    response
}

/// [`DevOpsGuruApi`] over the AWS CLI
pub struct CliDevOpsGuru {
    cli: Arc<AwsCli>,
}

impl CliDevOpsGuru {
    pub fn new(cli: Arc<AwsCli>) -> Self {
        Self { cli }
    }

    async fn call(&self, operation: &str, input: Value) -> AiOpsResult<Value> {
        self.cli.call(DEVOPS_GURU, operation, input).await
    }
}

#[async_trait]
impl DevOpsGuruApi for CliDevOpsGuru {
    async fn get_resource_collection(&self, collection_type: &str) -> AiOpsResult<ResourceCollection> {
        let op = "GetResourceCollection";
        let response = self.call(op, json!({ "ResourceCollectionType": collection_type })).await?;
        take_field(response, op, "ResourceCollection")
    }

    async fn update_resource_collection(
        &self,
        action: CollectionAction,
        collection: &ResourceCollection,
    ) -> AiOpsResult<()> {
        let input = json!({ "Action": action, "ResourceCollection": collection });
        self.call("UpdateResourceCollection", input).await?;
        Ok(())
    }

    async fn list_notification_channels(&self) -> AiOpsResult<Vec<NotificationChannel>> {
        let op = "ListNotificationChannels";
        take_list(self.call(op, json!({})).await?, op, "Channels")
    }

    async fn add_notification_channel(&self, config: &Value) -> AiOpsResult<String> {
        let op = "AddNotificationChannel";
        take_field(self.call(op, json!({ "Config": config })).await?, op, "Id")
    }

    async fn remove_notification_channel(&self, channel_id: &str) -> AiOpsResult<()> {
        self.call("RemoveNotificationChannel", json!({ "Id": channel_id })).await?;
        Ok(())
    }

    async fn describe_insight(&self, insight_id: &str, account_id: Option<&str>) -> AiOpsResult<Value> {
        let mut input = json!({ "Id": insight_id });
        if let Some(account_id) = account_id {
            input["AccountId"] = json!(account_id);
        }
        self.call("DescribeInsight", input).await
    }

    async fn list_insights(&self, status_filter: &Value) -> AiOpsResult<Value> {
        let response = self.call("ListInsights", json!({ "StatusFilter": status_filter })).await?;
        Ok(strip_token(response))
    }

    async fn list_anomalies_for_insight(&self, request: &Value) -> AiOpsResult<Value> {
        let response = self.call("ListAnomaliesForInsight", request.clone()).await?;
        Ok(strip_token(response))
    }

    async fn list_recommendations(&self, request: &Value) -> AiOpsResult<Value> {
        let response = self.call("ListRecommendations", request.clone()).await?;
        Ok(strip_token(response))
    }
}
