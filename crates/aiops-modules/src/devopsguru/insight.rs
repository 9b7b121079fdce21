//! Insight lookup and anomaly/recommendation enrichment

use aiops_core::{convert_time_ranges, merge_data, snake_dict_to_camel_dict, AiOpsResult};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::api::DevOpsGuruApi;
use crate::aws::MAX_CONCURRENT_CALLS;

/// Response keys that hold insights, single (describe) or listed
const INSIGHT_KEYS: [&str; 4] = ["ProactiveInsight", "ReactiveInsight", "ProactiveInsights", "ReactiveInsights"];

/// First insight key present in a describe/list response
pub fn get_insight_type(data: &Value) -> Option<&'static str> {
    INSIGHT_KEYS.into_iter().find(|key| data.get(*key).is_some())
}

/// `ListAnomaliesForInsight` request template, without `InsightId`
///
/// `include` holds the module's `include_anomalies` option.
pub fn anomaly_request(include: &Value, account_id: Option<&str>) -> AiOpsResult<Value> {
    let mut request = Map::new();
    if let Some(account_id) = account_id {
        request.insert("AccountId".into(), json!(account_id));
    }

    if let Some(service_names) = include.pointer("/filters/service_collection/service_names") {
        request.insert(
            "Filters".into(),
            json!({ "ServiceCollection": { "ServiceNames": service_names } }),
        );
    }

    if let Some(range) = include.get("start_time_range").filter(|r| !r.is_null()) {
        let wrapped = json!({ "Anomalies": { "StartTimeRange": snake_dict_to_camel_dict(range, true) } });
        let converted = convert_time_ranges(wrapped)?;
        request.insert("StartTimeRange".into(), converted["Anomalies"]["StartTimeRange"].clone());
    }

    Ok(Value::Object(request))
}

/// `ListRecommendations` request template, without `InsightId`
pub fn recommendation_request(include: &Value, account_id: Option<&str>) -> Value {
    let mut request = Map::new();
    if let Some(account_id) = account_id {
        request.insert("AccountId".into(), json!(account_id));
    }
    if let Some(locale) = include.get("locale").and_then(Value::as_str) {
        request.insert("Locale".into(), json!(locale));
    }
    Value::Object(request)
}

/// Which extra data to attach to each insight
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub anomalies: Option<Value>,
    pub recommendations: Option<Value>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_none() && self.recommendations.is_none()
    }
}

#[derive(Clone, Copy)]
enum Extra {
    Anomalies,
    Recommendations,
}

async fn fetch_extra(api: &dyn DevOpsGuruApi, kind: Extra, template: &Value, insight_id: &str) -> AiOpsResult<Value> {
    let mut request = template.clone();
    request["InsightId"] = json!(insight_id);
    match kind {
        Extra::Anomalies => api.list_anomalies_for_insight(&request).await,
        Extra::Recommendations => api.list_recommendations(&request).await,
    }
}

/// Merge anomalies and/or recommendations into every insight in `info`
///
/// Both proactive and reactive insights are covered. At most
/// [`MAX_CONCURRENT_CALLS`] lookups run at once; the responses are merged
/// into each insight object as-is (`ProactiveAnomalies`, `Recommendations`,
/// ...). Insights without an `Id` are left untouched.
pub async fn enrich_insights(api: &dyn DevOpsGuruApi, info: &mut Value, enrichment: &Enrichment) -> AiOpsResult<()> {
    let extras: Vec<(Extra, &Value)> = [
        (Extra::Anomalies, enrichment.anomalies.as_ref()),
        (Extra::Recommendations, enrichment.recommendations.as_ref()),
    ]
    .into_iter()
    .filter_map(|(kind, template)| template.map(|t| (kind, t)))
    .collect();

    let Some(fields) = info.as_object_mut() else {
        return Ok(());
    };
    if extras.is_empty() {
        return Ok(());
    }

    let mut insights: Vec<&mut Value> = Vec::new();
    for (key, value) in fields.iter_mut() {
        if !INSIGHT_KEYS.contains(&key.as_str()) {
            continue;
        }
        if value.is_array() {
            if let Value::Array(items) = value {
                insights.extend(items.iter_mut().filter(|i| i.is_object()));
            }
        } else if value.is_object() {
            insights.push(value);
        }
    }

    let mut targets: Vec<(&mut Value, String)> = Vec::with_capacity(insights.len());
    for insight in insights {
        let id = insight
            .get("Id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        match id {
            Some(id) => targets.push((insight, id)),
            None => warn!("Skipping insight without an Id"),
        }
    }

    for (kind, template) in extras {
        debug!(count = targets.len(), "Fetching insight details");
        let requests: Vec<_> = targets.iter().map(|(_, id)| fetch_extra(api, kind, template, id)).collect();
        let fetched: Vec<Value> = stream::iter(requests)
            .buffered(MAX_CONCURRENT_CALLS)
            .try_collect()
            .await?;
        for ((insight, _), data) in targets.iter_mut().zip(fetched) {
            if let Value::Object(data) = data {
                merge_data(insight, &data);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devopsguru::types::{CollectionAction, NotificationChannel, ResourceCollection};
    use crate::testing::FakeDevOpsGuru;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts how many anomaly lookups overlap
    #[derive(Default)]
    struct SlowGuru {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DevOpsGuruApi for SlowGuru {
        async fn get_resource_collection(&self, _: &str) -> AiOpsResult<ResourceCollection> {
            unimplemented!()
        }
        async fn update_resource_collection(&self, _: CollectionAction, _: &ResourceCollection) -> AiOpsResult<()> {
            unimplemented!()
        }
        async fn list_notification_channels(&self) -> AiOpsResult<Vec<NotificationChannel>> {
            unimplemented!()
        }
        async fn add_notification_channel(&self, _: &Value) -> AiOpsResult<String> {
            unimplemented!()
        }
        async fn remove_notification_channel(&self, _: &str) -> AiOpsResult<()> {
            unimplemented!()
        }
        async fn describe_insight(&self, _: &str, _: Option<&str>) -> AiOpsResult<Value> {
            unimplemented!()
        }
        async fn list_insights(&self, _: &Value) -> AiOpsResult<Value> {
            unimplemented!()
        }
        async fn list_anomalies_for_insight(&self, request: &Value) -> AiOpsResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(json!({"ProactiveAnomalies": [{"InsightId": request["InsightId"]}]}))
        }
        async fn list_recommendations(&self, _: &Value) -> AiOpsResult<Value> {
            unimplemented!()
        }
    }

    #[test]
    fn test_get_insight_type() {
        assert_eq!(get_insight_type(&json!({"ProactiveInsight": {}})), Some("ProactiveInsight"));
        assert_eq!(get_insight_type(&json!({"ReactiveInsights": []})), Some("ReactiveInsights"));
        assert_eq!(get_insight_type(&json!({"Other": 1})), None);
    }

    #[test]
    fn test_anomaly_request() {
        let include = json!({
            "filters": {"service_collection": {"service_names": ["LAMBDA"]}},
            "start_time_range": {"from_time": "2025-02-10"}
        });
        let request = anomaly_request(&include, Some("123456789012")).unwrap();
        assert_eq!(
            request,
            json!({
                "AccountId": "123456789012",
                "Filters": {"ServiceCollection": {"ServiceNames": ["LAMBDA"]}},
                "StartTimeRange": {"FromTime": "2025-02-10T00:00:00Z"}
            })
        );

        assert_eq!(anomaly_request(&json!({}), None).unwrap(), json!({}));
    }

    #[test]
    fn test_recommendation_request() {
        assert_eq!(
            recommendation_request(&json!({"locale": "EN_US"}), None),
            json!({"Locale": "EN_US"})
        );
    }

    #[tokio::test]
    async fn test_enrich_list_and_single() {
        let api = FakeDevOpsGuru::default();
        api.set_anomalies("i-1", json!({"ProactiveAnomalies": [{"Id": "a-1"}]}));
        api.set_recommendations("i-1", json!({"Recommendations": [{"Name": "r"}]}));

        let enrichment = Enrichment {
            anomalies: Some(json!({})),
            recommendations: Some(json!({"Locale": "EN_US"})),
        };

        let mut listed = json!({"ProactiveInsights": [{"Id": "i-1"}, {"Id": "i-2"}]});
        enrich_insights(&api, &mut listed, &enrichment).await.unwrap();
        assert_eq!(listed["ProactiveInsights"][0]["ProactiveAnomalies"][0]["Id"], json!("a-1"));
        assert_eq!(listed["ProactiveInsights"][0]["Recommendations"][0]["Name"], json!("r"));
        assert_eq!(listed["ProactiveInsights"][1]["ProactiveAnomalies"], json!([]));

        let mut single = json!({"ReactiveInsight": {"Id": "i-1"}});
        enrich_insights(&api, &mut single, &enrichment).await.unwrap();
        assert_eq!(single["ReactiveInsight"]["Recommendations"][0]["Name"], json!("r"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrich_bounds_concurrent_lookups() {
        let api = SlowGuru::default();
        let insights: Vec<Value> = (0..300).map(|i| json!({"Id": format!("i-{}", i)})).collect();
        let mut listed = json!({ "ProactiveInsights": insights });
        let enrichment = Enrichment {
            anomalies: Some(json!({})),
            recommendations: None,
        };

        enrich_insights(&api, &mut listed, &enrichment).await.unwrap();

        assert_eq!(api.calls.load(Ordering::SeqCst), 300);
        assert!(api.max_in_flight.load(Ordering::SeqCst) <= MAX_CONCURRENT_CALLS);
        assert_eq!(listed["ProactiveInsights"][299]["ProactiveAnomalies"][0]["InsightId"], json!("i-299"));
    }

    #[tokio::test]
    async fn test_enrich_skips_insights_without_id() {
        let api = FakeDevOpsGuru::default();
        let enrichment = Enrichment {
            anomalies: Some(json!({})),
            recommendations: None,
        };

        let mut listed = json!({"ReactiveInsights": [{"Name": "no id"}, {"Id": ""}, {"Id": "i-1"}]});
        enrich_insights(&api, &mut listed, &enrichment).await.unwrap();

        let requests = api.requests("ListAnomaliesForInsight");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["InsightId"], json!("i-1"));
        assert!(listed["ReactiveInsights"][0].get("ProactiveAnomalies").is_none());
        assert_eq!(listed["ReactiveInsights"][2]["ProactiveAnomalies"], json!([]));
    }
}
